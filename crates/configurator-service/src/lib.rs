//! # Configurator Service
//!
//! Wires the pricing and rules engines to a memoization backend:
//! - [`config::ConfiguratorConfig`]: environment-driven settings
//! - [`services::Services`]: cache, price matrix and engines shared across tasks

pub mod config;
pub mod services;

pub use config::{CacheSettings, ConfiguratorConfig, PriceSettings};
pub use services::Services;

/// Default TTL for memoized estimates
pub const DEFAULT_PRICING_TTL_SECS: u64 = 300;

/// Default TTL for memoized validation reports
pub const DEFAULT_RULES_TTL_SECS: u64 = 120;

/// Default per-request deadline
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;
