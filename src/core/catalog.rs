//! Static price catalog and the total matrix type shared with resolution output

use crate::core::plan::{BillingPeriod, Cell, Currency, PlanTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount together with the payment-provider price identifier used at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub amount: Decimal,
    pub external_ref: String,
}

impl PriceEntry {
    pub fn new(amount: Decimal, external_ref: impl Into<String>) -> Self {
        Self {
            amount,
            external_ref: external_ref.into(),
        }
    }
}

/// One value per [`Cell`]. Lookups cannot miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMatrix<T> {
    cells: [T; Cell::COUNT],
}

impl<T> PriceMatrix<T> {
    pub fn from_fn(mut f: impl FnMut(Cell) -> T) -> Self {
        Self {
            cells: std::array::from_fn(|i| f(Cell::ALL[i])),
        }
    }

    pub fn get(&self, cell: Cell) -> &T {
        &self.cells[cell.index()]
    }

    pub fn set(&mut self, cell: Cell, value: T) {
        self.cells[cell.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        Cell::ALL.into_iter().zip(self.cells.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Cell, &T) -> U) -> PriceMatrix<U> {
        PriceMatrix::from_fn(|cell| f(cell, self.get(cell)))
    }
}

pub type PriceCatalog = PriceMatrix<PriceEntry>;

impl PriceCatalog {
    /// The compiled-in price list, used whenever no override applies.
    pub fn defaults() -> Self {
        Self::from_fn(|cell| {
            let cents = match (cell.currency, cell.tier, cell.period) {
                (Currency::Primary, PlanTier::Base, BillingPeriod::Monthly) => 990,
                (Currency::Primary, PlanTier::Base, BillingPeriod::Yearly) => 9990,
                (Currency::Primary, PlanTier::Plus, BillingPeriod::Monthly) => 1990,
                (Currency::Primary, PlanTier::Plus, BillingPeriod::Yearly) => 19990,
                (Currency::Secondary, PlanTier::Base, BillingPeriod::Monthly) => 499,
                (Currency::Secondary, PlanTier::Base, BillingPeriod::Yearly) => 4999,
                (Currency::Secondary, PlanTier::Plus, BillingPeriod::Monthly) => 999,
                (Currency::Secondary, PlanTier::Plus, BillingPeriod::Yearly) => 9999,
            };
            PriceEntry::new(Decimal::new(cents, 2), default_external_ref(cell))
        })
    }
}

fn default_external_ref(cell: Cell) -> String {
    format!(
        "price_{}_{}_{}",
        cell.tier,
        cell.period,
        cell.currency.code().to_lowercase()
    )
}
