//! Price matrix
//!
//! Read-mostly lookup tables shared by every estimate. Readers take a shared
//! lock; the price-sync path takes the exclusive lock for a single insert, so
//! nobody can observe a half-written entry.

use std::collections::HashMap;

use configurator_common::PricingError;
use parking_lot::{RwLock, RwLockReadGuard};
use rust_decimal::Decimal;
use tracing::info;

use crate::seed::{default_finish_multipliers, default_layout_multipliers};

#[derive(Debug)]
struct Tables {
    module_base: HashMap<String, Decimal>,
    option_adders: HashMap<String, Decimal>,
    layout_multipliers: HashMap<String, Decimal>,
    finish_multipliers: HashMap<String, Decimal>,
}

/// Concurrently readable price tables
#[derive(Debug)]
pub struct PriceMatrix {
    tables: RwLock<Tables>,
}

impl PriceMatrix {
    /// Base price of a module missing from the table
    pub const DEFAULT_MODULE_BASE: Decimal = Decimal::from_parts(4200, 0, 0, false, 0);

    /// Build a matrix from seed tables, with the standard layout and finish multipliers
    pub fn new(
        module_base: HashMap<String, Decimal>,
        option_adders: HashMap<String, Decimal>,
    ) -> Self {
        Self {
            tables: RwLock::new(Tables {
                module_base,
                option_adders,
                layout_multipliers: default_layout_multipliers(),
                finish_multipliers: default_finish_multipliers(),
            }),
        }
    }

    /// Override (or add) a layout multiplier
    pub fn with_layout_multiplier(self, layout: impl Into<String>, multiplier: Decimal) -> Self {
        self.tables
            .write()
            .layout_multipliers
            .insert(layout.into(), multiplier);
        self
    }

    /// Override (or add) a finish multiplier
    pub fn with_finish_multiplier(self, finish: impl Into<String>, multiplier: Decimal) -> Self {
        self.tables
            .write()
            .finish_multipliers
            .insert(finish.into(), multiplier);
        self
    }

    /// Consistent view over all four tables for the duration of one computation
    pub fn snapshot(&self) -> MatrixView<'_> {
        MatrixView {
            tables: self.tables.read(),
        }
    }

    pub fn module_base(&self, module: &str) -> Decimal {
        self.snapshot().module_base(module)
    }

    pub fn option_adder(&self, id: &str) -> Decimal {
        self.snapshot().option_adder(id)
    }

    pub fn layout_multiplier(&self, layout: &str) -> Decimal {
        self.snapshot().layout_multiplier(layout)
    }

    pub fn finish_multiplier(&self, finish: &str) -> Decimal {
        self.snapshot().finish_multiplier(finish)
    }

    /// Atomically replace one option's add-on price
    pub fn update_option(&self, id: impl Into<String>, price: Decimal) -> Result<(), PricingError> {
        let id = id.into();
        if price < Decimal::ZERO {
            return Err(PricingError::InvalidPrice {
                id,
                price: price.to_string(),
            });
        }

        let previous = self.tables.write().option_adders.insert(id.clone(), price);
        info!(option = %id, %price, ?previous, "Updated option price");
        Ok(())
    }

    pub fn option_count(&self) -> usize {
        self.tables.read().option_adders.len()
    }
}

/// Read guard over the price tables
///
/// Holds the shared lock; keep it for one computation and drop it.
pub struct MatrixView<'a> {
    tables: RwLockReadGuard<'a, Tables>,
}

impl MatrixView<'_> {
    pub fn module_base(&self, module: &str) -> Decimal {
        self.tables
            .module_base
            .get(module)
            .copied()
            .unwrap_or(PriceMatrix::DEFAULT_MODULE_BASE)
    }

    pub fn option_adder(&self, id: &str) -> Decimal {
        self.tables
            .option_adders
            .get(id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn layout_multiplier(&self, layout: &str) -> Decimal {
        self.tables
            .layout_multipliers
            .get(layout)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    pub fn finish_multiplier(&self, finish: &str) -> Decimal {
        self.tables
            .finish_multipliers
            .get(finish)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn matrix() -> PriceMatrix {
        PriceMatrix::new(
            HashMap::from([("galley".to_string(), dec!(5000))]),
            HashMap::from([("island-counter".to_string(), dec!(1200))]),
        )
    }

    #[test]
    fn test_lookups_fall_back_to_defaults() {
        let matrix = matrix();

        assert_eq!(matrix.module_base("galley"), dec!(5000));
        assert_eq!(matrix.module_base("unknown"), dec!(4200));
        assert_eq!(matrix.option_adder("island-counter"), dec!(1200));
        assert_eq!(matrix.option_adder("unknown"), Decimal::ZERO);
        assert_eq!(matrix.layout_multiplier("l-shape"), dec!(1.08));
        assert_eq!(matrix.layout_multiplier("unknown"), Decimal::ONE);
        assert_eq!(matrix.finish_multiplier("stainless"), dec!(1.08));
        assert_eq!(matrix.finish_multiplier("unknown"), Decimal::ONE);
    }

    #[test]
    fn test_update_option() {
        let matrix = matrix();

        matrix.update_option("island-counter", dec!(1350)).unwrap();
        matrix.update_option("drawer-light", dec!(200)).unwrap();

        assert_eq!(matrix.option_adder("island-counter"), dec!(1350));
        assert_eq!(matrix.option_adder("drawer-light"), dec!(200));
        assert_eq!(matrix.option_count(), 2);
    }

    #[test]
    fn test_update_option_rejects_negative_price() {
        let matrix = matrix();

        let err = matrix.update_option("island-counter", dec!(-1)).unwrap_err();
        assert!(matches!(err, PricingError::InvalidPrice { .. }));
        assert_eq!(matrix.option_adder("island-counter"), dec!(1200));
    }

    #[test]
    fn test_builder_overrides_multipliers() {
        let matrix = matrix()
            .with_layout_multiplier("galley-wall", dec!(1.2))
            .with_finish_multiplier("gloss", Decimal::ONE);

        assert_eq!(matrix.layout_multiplier("galley-wall"), dec!(1.2));
        assert_eq!(matrix.finish_multiplier("gloss"), Decimal::ONE);
    }

    #[test]
    fn test_concurrent_reads_during_updates() {
        let matrix = Arc::new(matrix());
        let prices = [dec!(100), dec!(200), dec!(300)];

        let writer = {
            let matrix = matrix.clone();
            std::thread::spawn(move || {
                for i in 0..1_000 {
                    matrix
                        .update_option("island-counter", prices[i % prices.len()])
                        .unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let matrix = matrix.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let price = matrix.option_adder("island-counter");
                        // Either the seed or one of the complete writes
                        assert!(price == dec!(1200) || prices.contains(&price));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(matrix.option_adder("island-counter"), dec!(100));
    }
}
