//! Memoized rule validation

use std::time::{Duration, Instant};

use configurator_cache::{fetch_json, store_json, SharedCache};
use configurator_common::{key::rules_key, CallContext, Result, Selection, ValidationResult, Violation};
use tracing::{debug, instrument};

use crate::constraints::{builtin, Constraint};

/// Evaluates an ordered constraint set against selections
pub struct RuleEngine {
    constraints: Vec<Constraint>,
    cache: Option<SharedCache>,
    ttl: Duration,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Engine with the built-in constraints and no memoization
    pub fn new() -> Self {
        Self::with_constraints(builtin())
    }

    pub fn with_constraints(constraints: Vec<Constraint>) -> Self {
        Self {
            constraints,
            cache: None,
            ttl: Duration::ZERO,
        }
    }

    /// Memoize reports in `cache` for `ttl`
    pub fn with_cache(mut self, cache: SharedCache, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Validate a selection, serving from the cache when possible
    #[instrument(
        skip(self, ctx, selection),
        fields(module = %selection.module, layout = %selection.layout)
    )]
    pub async fn validate(&self, ctx: &CallContext, mut selection: Selection) -> Result<ValidationResult> {
        selection.validate_for_rules()?;
        selection.ensure_configuration_id();

        let start = Instant::now();
        let key = rules_key(&selection);

        if let Some(cache) = &self.cache {
            if let Some(mut cached) = fetch_json::<ValidationResult>(cache.as_ref(), ctx, &key).await {
                cached.latency_micros = elapsed_micros(start);
                cached.cached = true;
                return Ok(cached);
            }
        }

        let mut result = ValidationResult::new(selection.configuration_id.clone(), self.evaluate(&selection));
        result.latency_micros = elapsed_micros(start);

        if let Some(cache) = &self.cache {
            if !self.ttl.is_zero() {
                store_json(cache.as_ref(), ctx, &key, &result, self.ttl).await;
            }
        }

        debug!(
            configuration_id = %result.configuration_id,
            violations = result.violations.len(),
            blocking = result.blocking,
            "Validated selection"
        );
        Ok(result)
    }

    /// Run every constraint in order, without touching the cache
    pub fn evaluate(&self, selection: &Selection) -> Vec<Violation> {
        self.constraints
            .iter()
            .filter_map(|constraint| constraint.evaluate(selection))
            .collect()
    }
}

fn elapsed_micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
