//! # Configurator Common
//!
//! Shared types, errors, and canonicalization helpers for the kitchen
//! configurator pricing and rules engines.
//!
//! ## Core Types
//!
//! - [`Selection`]: the configuration payload submitted for pricing or validation
//! - [`EstimateResult`]/[`Adjustment`]: priced estimate with its adjustment trail
//! - [`ValidationResult`]/[`Violation`]: rule-compliance report
//! - [`CallContext`]: deadline carried through every cache call
//!
//! ## Cache Keys
//!
//! - [`key::pricing_key`]: content address of a selection for estimates
//! - [`key::rules_key`]: content address of a selection for rule validation
//!
//! Both keys ignore the order of the selected options.

pub mod context;
pub mod error;
pub mod key;
pub mod types;

// Re-export commonly used types at crate root
pub use context::{CallContext, DeadlineExceeded};
pub use error::{CacheError, ConfiguratorError, PricingError, Result, ValidationError};
pub use types::{
    estimate::{Adjustment, EstimateResult},
    selection::{Dimensions, Selection, SelectionOption},
    validation::{Severity, ValidationResult, Violation},
};

/// Configurator core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Currency applied when an estimate request leaves it blank
pub const DEFAULT_CURRENCY: &str = "USD";

/// Number of decimal places kept on monetary figures
pub const MONEY_SCALE: u32 = 2;
