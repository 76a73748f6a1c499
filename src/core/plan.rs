//! Plan dimensions that address a single price cell

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Brazilian real, the home market currency.
    Primary,
    /// US dollar.
    Secondary,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Primary, Currency::Secondary];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Primary => "BRL",
            Currency::Secondary => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Primary => "R$",
            Currency::Secondary => "$",
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Currency::Primary => ',',
            Currency::Secondary => '.',
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "brl" => Ok(Currency::Primary),
            "secondary" | "usd" => Ok(Currency::Secondary),
            _ => Err(anyhow!("Invalid currency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Base,
    Plus,
}

impl PlanTier {
    pub const ALL: [PlanTier; 2] = [PlanTier::Base, PlanTier::Plus];
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PlanTier::Base => "base",
                PlanTier::Plus => "plus",
            }
        )
    }
}

impl FromStr for PlanTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older store rows still call the upper tier "premium".
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(PlanTier::Base),
            "plus" | "premium" => Ok(PlanTier::Plus),
            _ => Err(anyhow!("Invalid plan tier: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub const ALL: [BillingPeriod; 2] = [BillingPeriod::Monthly, BillingPeriod::Yearly];
}

impl Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BillingPeriod::Monthly => "monthly",
                BillingPeriod::Yearly => "yearly",
            }
        )
    }
}

impl FromStr for BillingPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(BillingPeriod::Monthly),
            "yearly" | "year" | "annual" => Ok(BillingPeriod::Yearly),
            _ => Err(anyhow!("Invalid billing period: {}", s)),
        }
    }
}

/// A unique `(currency, tier, period)` combination in the price matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Cell {
    pub currency: Currency,
    pub tier: PlanTier,
    pub period: BillingPeriod,
}

impl Cell {
    pub const COUNT: usize = 8;

    /// Every cell, in matrix storage order.
    pub const ALL: [Cell; Cell::COUNT] = [
        Cell::new(Currency::Primary, PlanTier::Base, BillingPeriod::Monthly),
        Cell::new(Currency::Primary, PlanTier::Base, BillingPeriod::Yearly),
        Cell::new(Currency::Primary, PlanTier::Plus, BillingPeriod::Monthly),
        Cell::new(Currency::Primary, PlanTier::Plus, BillingPeriod::Yearly),
        Cell::new(Currency::Secondary, PlanTier::Base, BillingPeriod::Monthly),
        Cell::new(Currency::Secondary, PlanTier::Base, BillingPeriod::Yearly),
        Cell::new(Currency::Secondary, PlanTier::Plus, BillingPeriod::Monthly),
        Cell::new(Currency::Secondary, PlanTier::Plus, BillingPeriod::Yearly),
    ];

    pub const fn new(currency: Currency, tier: PlanTier, period: BillingPeriod) -> Self {
        Self {
            currency,
            tier,
            period,
        }
    }

    pub(crate) const fn index(&self) -> usize {
        (self.currency as usize) * 4 + (self.tier as usize) * 2 + (self.period as usize)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.tier, self.period, self.currency)
    }
}
