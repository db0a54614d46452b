//! Error types for the configurator core
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::context::DeadlineExceeded;

/// Result type alias using ConfiguratorError
pub type Result<T> = std::result::Result<T, ConfiguratorError>;

/// Unified error type for configurator operations
#[derive(Debug, Error)]
pub enum ConfiguratorError {
    // Malformed selection, surfaced to the caller
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Cache backend errors (recovered inside the engines)
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    // Pricing computation errors
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConfiguratorError {
    /// Whether the error was caused by the caller's input rather than by the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConfiguratorError::Validation(_))
    }
}

/// Structural problems with a selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("module is required")]
    MissingModule,

    #[error("layout is required")]
    MissingLayout,

    #[error("currency is required")]
    MissingCurrency,

    #[error("option id is required")]
    MissingOptionId,

    #[error("option quantity must be >= 0 (option {id}: {quantity})")]
    NegativeQuantity { id: String, quantity: i64 },
}

/// Cache backend failures
///
/// Engines never propagate these: a failed read is a miss, a failed write is dropped.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),

    #[error("cache call abandoned: {0}")]
    Deadline(#[from] DeadlineExceeded),

    #[error("cache payload codec failure: {0}")]
    Codec(String),
}

/// Pricing matrix and computation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("invalid price for {id}: {price} (must not be negative)")]
    InvalidPrice { id: String, price: String },

    #[error("Pricing calculation overflow")]
    Overflow,
}

impl From<serde_json::Error> for ConfiguratorError {
    fn from(err: serde_json::Error) -> Self {
        ConfiguratorError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for ConfiguratorError {
    fn from(err: anyhow::Error) -> Self {
        ConfiguratorError::Internal(err.to_string())
    }
}
