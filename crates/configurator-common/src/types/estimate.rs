//! Estimate types - Total = Subtotal + Layout + Finish + Bundle
//!
//! Monetary figures are exact decimals rounded to cents. They travel as JSON
//! numbers; a decimal with at most two fractional digits survives the
//! float round trip unchanged, so cached and fresh estimates compare equal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Labeled delta applied on top of the running total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    /// e.g. "layout:l-shape", "finish:gloss", "bundle:5-options"
    pub reason: String,

    /// Signed amount, negative for discounts
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl Adjustment {
    pub fn new(reason: impl Into<String>, amount: Decimal) -> Self {
        Self {
            reason: reason.into(),
            amount,
        }
    }
}

/// Priced estimate returned to the configurator shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    pub configuration_id: String,

    pub currency: String,

    /// Module base plus option add-ons
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Adjustments in the order they were applied
    pub adjustments: Vec<Adjustment>,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Wall-clock latency of the call that produced this value
    pub latency_micros: u64,

    /// Served from the cache
    pub cached: bool,
}

impl EstimateResult {
    /// Sum of all adjustment amounts
    pub fn adjustment_total(&self) -> Decimal {
        self.adjustments.iter().map(|adj| adj.amount).sum()
    }

    /// Find an adjustment by its reason prefix ("layout", "finish", "bundle")
    pub fn adjustment(&self, kind: &str) -> Option<&Adjustment> {
        self.adjustments
            .iter()
            .find(|adj| adj.reason.split(':').next() == Some(kind))
    }
}
