//! Core configurator types

pub mod estimate;
pub mod selection;
pub mod validation;
