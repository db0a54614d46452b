//! Built-in configuration constraints
//!
//! Each constraint is an independent, pure check over a selection. The set is
//! closed; evaluation order only decides the order of reported violations.

use std::collections::BTreeSet;

use configurator_common::{Selection, Violation};

/// Options counted against the appliance cap
pub const APPLIANCE_OPTIONS: &[&str] = &["appliance-panel", "range-upgrade", "cooktop-induction"];

/// Maximum combined appliance quantity before a warning
pub const APPLIANCE_LIMIT: i64 = 3;

/// A single configuration rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `option` is only allowed with `layout`
    RequireLayoutForOption {
        option: &'static str,
        layout: &'static str,
    },
    /// `layout` does not accept any of `options`
    ForbidOptionsForLayout {
        layout: &'static str,
        options: &'static [&'static str],
    },
    /// `option` requires one of `finishes`
    FinishCompatibility {
        option: &'static str,
        finishes: &'static [&'static str],
    },
    /// `layout` requires a room length within `[min_mm, max_mm]`
    DimensionBand {
        layout: &'static str,
        min_mm: u32,
        max_mm: u32,
    },
    /// Combined quantity of `options` must not exceed `limit`
    ApplianceCap {
        options: &'static [&'static str],
        limit: i64,
    },
}

impl Constraint {
    /// Check the selection, returning a violation when the rule fails
    pub fn evaluate(&self, selection: &Selection) -> Option<Violation> {
        match *self {
            Constraint::RequireLayoutForOption { option, layout } => {
                (selection.has_option(option) && selection.layout != layout).then(|| {
                    Violation::error(
                        format!("layout.{option}"),
                        format!("{option} requires {layout} layout"),
                    )
                })
            }

            Constraint::ForbidOptionsForLayout { layout, options } => {
                if selection.layout != layout {
                    return None;
                }
                // Sorted so the message does not depend on submission order
                let blocked: BTreeSet<&str> = selection
                    .options
                    .iter()
                    .map(|opt| opt.id.as_str())
                    .filter(|id| options.contains(id))
                    .collect();
                if blocked.is_empty() {
                    return None;
                }
                let ids = blocked.into_iter().collect::<Vec<_>>();
                let message = match ids.as_slice() {
                    [single] => format!("option {single} is invalid for {layout} layout"),
                    many => format!("options {} are invalid for {layout} layout", many.join(", ")),
                };
                Some(Violation::error("layout.blocked", message))
            }

            Constraint::FinishCompatibility { option, finishes } => {
                (selection.has_option(option) && !finishes.contains(&selection.finish.as_str()))
                    .then(|| {
                        Violation::error(
                            format!("finish.{option}"),
                            format!("{option} only supports {} finishes", finishes.join(", ")),
                        )
                    })
            }

            Constraint::DimensionBand {
                layout,
                min_mm,
                max_mm,
            } => {
                let length = selection.dimensions.length_mm;
                // Zero means the caller has not measured the room yet
                if selection.layout != layout || length == 0 {
                    return None;
                }
                (!(min_mm..=max_mm).contains(&length)).then(|| {
                    Violation::error(
                        format!("dimension.{layout}"),
                        format!("layout {layout} requires length between {min_mm}mm and {max_mm}mm"),
                    )
                })
            }

            Constraint::ApplianceCap { options, limit } => {
                let requested = selection
                    .options
                    .iter()
                    .filter(|opt| options.contains(&opt.id.as_str()))
                    .fold(0i64, |sum, opt| sum.saturating_add(opt.quantity));
                (requested > limit).then(|| {
                    Violation::warning(
                        "appliance.limit",
                        format!("appliance upgrades limited to {limit} (requested {requested})"),
                    )
                })
            }
        }
    }
}

/// The standard rule set, in evaluation order
pub fn builtin() -> Vec<Constraint> {
    vec![
        Constraint::RequireLayoutForOption {
            option: "island-counter",
            layout: "island",
        },
        Constraint::ForbidOptionsForLayout {
            layout: "linear",
            options: &["corner-carousel", "pull-out-pantry"],
        },
        Constraint::FinishCompatibility {
            option: "glass-cabinet",
            finishes: &["gloss", "stainless"],
        },
        Constraint::DimensionBand {
            layout: "u-shape",
            min_mm: 3600,
            max_mm: 9600,
        },
        Constraint::DimensionBand {
            layout: "island",
            min_mm: 4200,
            max_mm: 12000,
        },
        Constraint::ApplianceCap {
            options: APPLIANCE_OPTIONS,
            limit: APPLIANCE_LIMIT,
        },
    ]
}
