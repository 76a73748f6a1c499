//! Core pricing types and resolution

pub mod cache;
pub mod catalog;
pub mod config;
pub mod format;
pub mod log;
pub mod overrides;
pub mod plan;
pub mod resolver;

// Re-export main types for cleaner imports
pub use catalog::{PriceCatalog, PriceEntry, PriceMatrix};
pub use overrides::{DataQualityWarning, OverrideRow, OverrideSource};
pub use plan::{BillingPeriod, Cell, Currency, PlanTier};
pub use resolver::{EffectivePrice, EffectivePriceMatrix, PriceResolver, PriceSource};
