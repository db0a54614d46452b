//! Configurator configuration

use std::collections::HashMap;
use std::time::Duration;

use configurator_cache::{DEFAULT_KEY_PREFIX, DEFAULT_MAX_ENTRIES};
use configurator_common::{ConfiguratorError, Result};
use configurator_pricing::{default_module_prices, default_option_prices};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configurator service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    /// Cache configuration
    pub cache: CacheSettings,
    /// Price table overrides
    pub prices: PriceSettings,
    /// Deadline applied to each request, in milliseconds
    pub request_timeout_ms: u64,
}

impl ConfiguratorConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self {
            request_timeout_ms: crate::DEFAULT_REQUEST_TIMEOUT_MS,
            ..Self::default()
        };

        // Cache settings
        if let Some(url) = lookup("REDIS_URL").filter(|url| !url.trim().is_empty()) {
            cfg.cache.redis_url = Some(url);
        }
        if let Some(prefix) = lookup("CACHE_KEY_PREFIX") {
            cfg.cache.key_prefix = prefix;
        }
        parse_into(&lookup, "CACHE_TTL_SECS", &mut cfg.cache.pricing_ttl_secs);
        parse_into(&lookup, "RULES_CACHE_TTL_SECS", &mut cfg.cache.rules_ttl_secs);
        parse_into(&lookup, "CACHE_MAX_ENTRIES", &mut cfg.cache.max_entries);

        // Price tables
        if let Some(raw) = lookup("MODULE_PRICES") {
            cfg.prices.module_prices = Some(parse_price_table("MODULE_PRICES", &raw)?);
        }
        if let Some(raw) = lookup("OPTION_PRICES") {
            cfg.prices.option_prices = Some(parse_price_table("OPTION_PRICES", &raw)?);
        }

        parse_into(&lookup, "REQUEST_TIMEOUT_MS", &mut cfg.request_timeout_ms);

        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Memoization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Redis URL; absent means a process-local cache
    pub redis_url: Option<String>,
    /// Namespace for Redis keys
    pub key_prefix: String,
    /// TTL for memoized estimates
    pub pricing_ttl_secs: u64,
    /// TTL for memoized validation reports
    pub rules_ttl_secs: u64,
    /// Capacity of the in-memory backend
    pub max_entries: usize,
}

impl CacheSettings {
    pub fn pricing_ttl(&self) -> Duration {
        Duration::from_secs(self.pricing_ttl_secs)
    }

    pub fn rules_ttl(&self) -> Duration {
        Duration::from_secs(self.rules_ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            pricing_ttl_secs: crate::DEFAULT_PRICING_TTL_SECS,
            rules_ttl_secs: crate::DEFAULT_RULES_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Seed price tables; `None` falls back to the built-in tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSettings {
    pub module_prices: Option<HashMap<String, Decimal>>,
    pub option_prices: Option<HashMap<String, Decimal>>,
}

impl PriceSettings {
    pub fn module_prices(&self) -> HashMap<String, Decimal> {
        self.module_prices.clone().unwrap_or_else(default_module_prices)
    }

    pub fn option_prices(&self) -> HashMap<String, Decimal> {
        self.option_prices.clone().unwrap_or_else(default_option_prices)
    }
}

fn parse_into<F, T>(lookup: &F, name: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(name) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(variable = name, value = %raw, "Ignoring unparsable setting"),
        }
    }
}

/// Parse a JSON object of id -> price, rejecting negative prices
fn parse_price_table(name: &str, raw: &str) -> Result<HashMap<String, Decimal>> {
    let table: HashMap<String, Decimal> = serde_json::from_str(raw)
        .map_err(|e| ConfiguratorError::Config(format!("{name} is not a JSON price table: {e}")))?;

    if let Some((id, price)) = table.iter().find(|(_, price)| price.is_sign_negative()) {
        return Err(ConfiguratorError::Config(format!(
            "{name} has negative price {price} for {id}"
        )));
    }
    Ok(table)
}
