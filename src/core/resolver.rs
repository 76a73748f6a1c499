//! Merges the static catalog with live override rows

use crate::core::catalog::{PriceCatalog, PriceEntry, PriceMatrix};
use crate::core::overrides::{OverrideRow, PriceOverride};
use crate::core::plan::Cell;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// Where the effective price of a cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PriceSource {
    Default,
    Override,
    Promotion { ends_at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePrice {
    pub entry: PriceEntry,
    pub source: PriceSource,
}

pub type EffectivePriceMatrix = PriceMatrix<EffectivePrice>;

impl EffectivePriceMatrix {
    /// The payment-provider price identifier for the given cell.
    pub fn checkout_ref(&self, cell: Cell) -> &str {
        &self.get(cell).entry.external_ref
    }
}

pub struct PriceResolver {
    catalog: PriceCatalog,
}

impl PriceResolver {
    pub fn new(catalog: PriceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    /// Computes the price in effect for every cell at `now`.
    ///
    /// Active rows replace the catalog entry of their cell. A promotional row
    /// applies only while `now` lies within its window, bounds included. When
    /// several rows target the same cell the last one wins. Malformed rows are
    /// logged and skipped.
    pub fn resolve(&self, overrides: &[OverrideRow], now: DateTime<Utc>) -> EffectivePriceMatrix {
        let mut matrix = self.catalog.map(|_, entry| EffectivePrice {
            entry: entry.clone(),
            source: PriceSource::Default,
        });

        let mut applied = 0usize;
        for row in overrides.iter().filter(|row| row.is_active) {
            let valid = match row.validate() {
                Ok(valid) => valid,
                Err(warning) => {
                    warn!(
                        %warning,
                        external_ref = %row.external_ref,
                        "Skipping malformed price override"
                    );
                    continue;
                }
            };

            if let Some(source) = eligibility(&valid, now) {
                if matrix.get(valid.cell).source != PriceSource::Default {
                    debug!(cell = %valid.cell, "Replacing an earlier override for the same cell");
                }
                matrix.set(
                    valid.cell,
                    EffectivePrice {
                        entry: valid.entry,
                        source,
                    },
                );
                applied += 1;
            }
        }

        debug!(
            rows = overrides.len(),
            applied, "Resolved effective price matrix"
        );
        matrix
    }
}

impl Default for PriceResolver {
    fn default() -> Self {
        Self::new(PriceCatalog::defaults())
    }
}

fn eligibility(valid: &PriceOverride, now: DateTime<Utc>) -> Option<PriceSource> {
    match &valid.promotion {
        None => Some(PriceSource::Override),
        Some(window) if window.contains(now) => window
            .end
            .map(|ends_at| PriceSource::Promotion { ends_at }),
        Some(window) => {
            debug!(cell = %valid.cell, ?window, %now, "Promotion not running");
            None
        }
    }
}
