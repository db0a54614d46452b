//! Built-in price tables
//!
//! Used when the environment does not supply its own module or option prices.
//! Layout and finish multipliers are not configurable.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn table(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
    entries
        .iter()
        .map(|(id, value)| (id.to_string(), *value))
        .collect()
}

/// Base price per module family
pub fn default_module_prices() -> HashMap<String, Decimal> {
    table(&[
        ("galley", dec!(5200)),
        ("luxe", dec!(7800)),
        ("island", dec!(9400)),
        ("compact", dec!(3900)),
        ("pantry", dec!(3100)),
        ("wall-run", dec!(4600)),
    ])
}

/// Add-on price per option unit
pub fn default_option_prices() -> HashMap<String, Decimal> {
    table(&[
        ("appliance-panel", dec!(850)),
        ("waterfall-edge", dec!(1200)),
        ("glass-cabinet", dec!(560)),
        ("drawer-lighting", dec!(240)),
        ("pull-out-pantry", dec!(380)),
        ("corner-carousel", dec!(420)),
        ("drawer-organizer", dec!(180)),
        ("range-upgrade", dec!(2100)),
        ("cooktop-induction", dec!(980)),
        ("backsplash", dec!(300)),
    ])
}

pub fn default_layout_multipliers() -> HashMap<String, Decimal> {
    table(&[
        ("linear", dec!(1.0)),
        ("l-shape", dec!(1.08)),
        ("u-shape", dec!(1.11)),
        ("island", dec!(1.16)),
    ])
}

pub fn default_finish_multipliers() -> HashMap<String, Decimal> {
    table(&[
        ("matte", dec!(1.0)),
        ("gloss", dec!(1.04)),
        ("stainless", dec!(1.08)),
        ("wood-grain", dec!(1.02)),
    ])
}
