//! Selection - the configuration payload from the configurator shell
//!
//! One selection shape serves both engines: pricing ignores the dimensions,
//! rule validation ignores the currency.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A single option id + quantity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOption {
    pub id: String,
    #[serde(default)]
    pub quantity: i64,
}

impl SelectionOption {
    pub fn new(id: impl Into<String>, quantity: i64) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }

    /// Quantity used for billing: anything non-positive counts as one unit
    pub fn billable_quantity(&self) -> i64 {
        if self.quantity <= 0 {
            1
        } else {
            self.quantity
        }
    }
}

/// Room dimensions in millimeters (0 = unspecified)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default)]
    pub length_mm: u32,
    #[serde(default)]
    pub height_mm: u32,
}

/// Kitchen configuration submitted for pricing or rule validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Caller-assigned id, generated when absent
    #[serde(default)]
    pub configuration_id: String,

    /// Base cabinet family (e.g. "galley")
    pub module: String,

    #[serde(default)]
    pub layout: String,

    #[serde(default)]
    pub finish: String,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub options: Vec<SelectionOption>,

    #[serde(default)]
    pub dimensions: Dimensions,
}

impl Selection {
    /// Create a selection for a module
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn with_configuration_id(mut self, id: impl Into<String>) -> Self {
        self.configuration_id = id.into();
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_finish(mut self, finish: impl Into<String>) -> Self {
        self.finish = finish.into();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Append an option
    pub fn with_option(mut self, id: impl Into<String>, quantity: i64) -> Self {
        self.options.push(SelectionOption::new(id, quantity));
        self
    }

    pub fn with_dimensions(mut self, length_mm: u32, height_mm: u32) -> Self {
        self.dimensions = Dimensions {
            length_mm,
            height_mm,
        };
        self
    }

    /// Assign a fresh configuration id when the caller left it blank
    pub fn ensure_configuration_id(&mut self) {
        if self.configuration_id.is_empty() {
            self.configuration_id = Uuid::now_v7().to_string();
        }
    }

    pub fn has_option(&self, id: &str) -> bool {
        self.options.iter().any(|opt| opt.id == id)
    }

    /// Options ordered by (id, quantity), independent of submission order
    pub fn sorted_options(&self) -> Vec<&SelectionOption> {
        let mut options: Vec<&SelectionOption> = self.options.iter().collect();
        options.sort();
        options
    }

    /// Structural checks for an estimate request
    pub fn validate_for_pricing(&self) -> Result<(), ValidationError> {
        if self.module.is_empty() {
            return Err(ValidationError::MissingModule);
        }
        if self.currency.is_empty() {
            return Err(ValidationError::MissingCurrency);
        }
        self.validate_options()
    }

    /// Structural checks for a rule validation request
    pub fn validate_for_rules(&self) -> Result<(), ValidationError> {
        if self.module.is_empty() {
            return Err(ValidationError::MissingModule);
        }
        if self.layout.is_empty() {
            return Err(ValidationError::MissingLayout);
        }
        self.validate_options()
    }

    fn validate_options(&self) -> Result<(), ValidationError> {
        for opt in &self.options {
            if opt.id.is_empty() {
                return Err(ValidationError::MissingOptionId);
            }
            if opt.quantity < 0 {
                return Err(ValidationError::NegativeQuantity {
                    id: opt.id.clone(),
                    quantity: opt.quantity,
                });
            }
        }
        Ok(())
    }
}
