//! # Configurator Rules
//!
//! Rule-compliance checks for kitchen configurations.
//!
//! The engine runs a fixed, ordered list of independent constraints and
//! collects every violation. A result is blocking when at least one violation
//! has error severity; warnings are reported but never block.
//!
//! | Code                    | Severity | Rule                                          |
//! |-------------------------|----------|-----------------------------------------------|
//! | `layout.island-counter` | error    | island counter needs the island layout        |
//! | `layout.blocked`        | error    | linear layout rejects corner/pantry pull-outs |
//! | `finish.glass-cabinet`  | error    | glass cabinets need gloss or stainless        |
//! | `dimension.u-shape`     | error    | u-shape length within 3600–9600 mm            |
//! | `dimension.island`      | error    | island length within 4200–12000 mm            |
//! | `appliance.limit`       | warning  | at most 3 appliance upgrades                  |

pub mod constraints;
pub mod engine;

pub use constraints::{builtin, Constraint, APPLIANCE_LIMIT, APPLIANCE_OPTIONS};
pub use engine::RuleEngine;
