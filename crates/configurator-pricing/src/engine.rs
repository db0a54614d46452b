//! Memoized estimate engine
//!
//! Estimates are a pure function of the selection and the price matrix. The
//! engine wraps that function in a fail-open cache: a hit is returned with
//! `cached = true`, a miss or any cache trouble falls through to a fresh
//! computation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use configurator_cache::{fetch_json, store_json, SharedCache};
use configurator_common::{
    key::pricing_key, Adjustment, CallContext, EstimateResult, PricingError, Result, Selection,
    DEFAULT_CURRENCY, MONEY_SCALE,
};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, instrument};

use crate::matrix::PriceMatrix;

/// Estimate engine over a shared price matrix
pub struct PricingEngine {
    /// Shared price tables
    matrix: Arc<PriceMatrix>,
    /// Optional memoization store
    cache: Option<SharedCache>,
    /// TTL for memoized estimates, zero disables writes
    ttl: Duration,
}

impl PricingEngine {
    /// Create an engine without memoization
    pub fn new(matrix: Arc<PriceMatrix>) -> Self {
        Self {
            matrix,
            cache: None,
            ttl: Duration::ZERO,
        }
    }

    /// Memoize estimates in `cache` for `ttl`
    pub fn with_cache(mut self, cache: SharedCache, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    pub fn matrix(&self) -> &Arc<PriceMatrix> {
        &self.matrix
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Price a selection, serving from the cache when possible
    #[instrument(
        skip(self, ctx, selection),
        fields(module = %selection.module, options = selection.options.len())
    )]
    pub async fn estimate(&self, ctx: &CallContext, mut selection: Selection) -> Result<EstimateResult> {
        if selection.currency.is_empty() {
            selection.currency = DEFAULT_CURRENCY.to_string();
        }
        selection.validate_for_pricing()?;
        selection.ensure_configuration_id();

        let start = Instant::now();
        let key = pricing_key(&selection);

        if let Some(cache) = &self.cache {
            if let Some(mut cached) = fetch_json::<EstimateResult>(cache.as_ref(), ctx, &key).await {
                cached.latency_micros = elapsed_micros(start);
                cached.cached = true;
                return Ok(cached);
            }
        }

        let mut result = self.price(&selection)?;
        result.latency_micros = elapsed_micros(start);

        if let Some(cache) = &self.cache {
            if !self.ttl.is_zero() {
                store_json(cache.as_ref(), ctx, &key, &result, self.ttl).await;
            }
        }

        debug!(
            configuration_id = %result.configuration_id,
            subtotal = %result.subtotal,
            total = %result.total,
            "Computed estimate"
        );
        Ok(result)
    }

    /// Compute an estimate without touching the cache
    ///
    /// Expects a selection that already passed `validate_for_pricing`.
    pub fn price(&self, selection: &Selection) -> std::result::Result<EstimateResult, PricingError> {
        let matrix = self.matrix.snapshot();

        let mut subtotal = matrix.module_base(&selection.module);
        for opt in &selection.options {
            let line = matrix
                .option_adder(&opt.id)
                .checked_mul(Decimal::from(opt.billable_quantity()))
                .ok_or(PricingError::Overflow)?;
            subtotal = subtotal.checked_add(line).ok_or(PricingError::Overflow)?;
        }

        let mut running = RunningTotal::new(subtotal);

        if !selection.layout.is_empty() {
            let multiplier = matrix.layout_multiplier(&selection.layout);
            running.apply(subtotal, multiplier, || format!("layout:{}", selection.layout))?;
        }

        if !selection.finish.is_empty() {
            let multiplier = matrix.finish_multiplier(&selection.finish);
            running.apply(running.total, multiplier, || format!("finish:{}", selection.finish))?;
        }
        drop(matrix);

        let count = selection.options.len();
        running.apply(running.total, volume_multiplier(count), || {
            format!("bundle:{}-options", count)
        })?;

        Ok(EstimateResult {
            configuration_id: selection.configuration_id.clone(),
            currency: selection.currency.clone(),
            subtotal: round_cents(subtotal),
            adjustments: running.adjustments,
            total: round_cents(running.total),
            latency_micros: 0,
            cached: false,
        })
    }
}

/// Volume discount multiplier for the number of selected options
pub fn volume_multiplier(option_count: usize) -> Decimal {
    match option_count {
        n if n >= 8 => dec!(0.94),
        n if n >= 5 => dec!(0.97),
        _ => Decimal::ONE,
    }
}

/// Running total with the adjustments applied so far
struct RunningTotal {
    total: Decimal,
    adjustments: Vec<Adjustment>,
}

impl RunningTotal {
    fn new(subtotal: Decimal) -> Self {
        Self {
            total: subtotal,
            adjustments: Vec::with_capacity(3),
        }
    }

    /// Add `base × (multiplier − 1)`; a multiplier of exactly 1 records nothing
    fn apply<F>(&mut self, base: Decimal, multiplier: Decimal, reason: F) -> std::result::Result<(), PricingError>
    where
        F: FnOnce() -> String,
    {
        if multiplier == Decimal::ONE {
            return Ok(());
        }

        let delta = base
            .checked_mul(multiplier - Decimal::ONE)
            .ok_or(PricingError::Overflow)?;
        self.total = self.total.checked_add(delta).ok_or(PricingError::Overflow)?;
        self.adjustments.push(Adjustment::new(reason(), round_cents(delta)));
        Ok(())
    }
}

/// Round to cents, half away from zero
fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn elapsed_micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
