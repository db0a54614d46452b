//! # Configurator Pricing
//!
//! Price estimation for kitchen configurations.
//!
//! ## Pricing Formula
//!
//! ```text
//! Subtotal = Base(module) + Σ Adder(option) × quantity
//! Total    = Subtotal × Layout × Finish × Bundle
//! ```
//!
//! Where:
//! - Layout: multiplier for the room layout, applied to the subtotal
//! - Finish: multiplier for the cabinet finish, applied after the layout
//! - Bundle: volume discount (3% from 5 options, 6% from 8 options)
//!
//! Each multiplier other than 1 is reported as a separate adjustment.

pub mod engine;
pub mod matrix;
pub mod seed;

pub use engine::{volume_multiplier, PricingEngine};
pub use matrix::{MatrixView, PriceMatrix};
pub use seed::{
    default_finish_multipliers, default_layout_multipliers, default_module_prices,
    default_option_prices,
};
