//! Override rows as read from the external price store

use crate::core::catalog::PriceEntry;
use crate::core::plan::{BillingPeriod, Cell, Currency, PlanTier};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A price row as stored upstream.
///
/// Enum-valued fields and timestamps are kept as text so that a bad value
/// only disqualifies its own row. Use [`OverrideRow::validate`] to obtain a
/// typed [`PriceOverride`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRow {
    #[serde(alias = "planTier", alias = "plan_type", alias = "planType")]
    pub plan_tier: String,
    pub currency: String,
    #[serde(alias = "billingPeriod")]
    pub billing_period: String,
    pub amount: Decimal,
    #[serde(alias = "externalRef")]
    pub external_ref: String,
    #[serde(default = "default_true", alias = "isActive")]
    pub is_active: bool,
    #[serde(default, alias = "isPromotion")]
    pub is_promotion: bool,
    #[serde(default, alias = "promotionStart")]
    pub promotion_start: Option<String>,
    #[serde(default, alias = "promotionEnd")]
    pub promotion_end: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Problems with an upstream row. These are logged and the row is skipped;
/// they never fail a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataQualityWarning {
    #[error("unknown currency '{0}'")]
    UnknownCurrency(String),
    #[error("unknown plan tier '{0}'")]
    UnknownTier(String),
    #[error("unknown billing period '{0}'")]
    UnknownPeriod(String),
    #[error("invalid {field} timestamp '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("negative amount {0}")]
    NegativeAmount(Decimal),
    #[error("missing external ref")]
    MissingExternalRef,
    #[error("promotion starts at {start} after it ends at {end}")]
    InvertedPromotionWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("undecodable row: {0}")]
    Undecodable(String),
}

/// The time window of a promotional override. A bound is `None` when the
/// store left it null, which makes the promotion ineligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl PromotionWindow {
    /// Both bounds inclusive.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

/// A validated override row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceOverride {
    pub cell: Cell,
    pub entry: PriceEntry,
    pub promotion: Option<PromotionWindow>,
}

impl OverrideRow {
    pub fn validate(&self) -> Result<PriceOverride, DataQualityWarning> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|_| DataQualityWarning::UnknownCurrency(self.currency.clone()))?;
        let tier: PlanTier = self
            .plan_tier
            .parse()
            .map_err(|_| DataQualityWarning::UnknownTier(self.plan_tier.clone()))?;
        let period: BillingPeriod = self
            .billing_period
            .parse()
            .map_err(|_| DataQualityWarning::UnknownPeriod(self.billing_period.clone()))?;

        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(DataQualityWarning::NegativeAmount(self.amount));
        }
        if self.external_ref.trim().is_empty() {
            return Err(DataQualityWarning::MissingExternalRef);
        }

        let promotion = if self.is_promotion {
            let start = parse_bound("promotion_start", self.promotion_start.as_deref())?;
            let end = parse_bound("promotion_end", self.promotion_end.as_deref())?;
            if let (Some(start), Some(end)) = (start, end)
                && start > end
            {
                return Err(DataQualityWarning::InvertedPromotionWindow { start, end });
            }
            Some(PromotionWindow { start, end })
        } else {
            None
        };

        Ok(PriceOverride {
            cell: Cell::new(currency, tier, period),
            entry: PriceEntry::new(self.amount, self.external_ref.trim()),
            promotion,
        })
    }
}

fn parse_bound(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, DataQualityWarning> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| DataQualityWarning::InvalidTimestamp {
                field,
                value: raw.to_string(),
            }),
    }
}

/// Parses an RFC 3339 timestamp. Timestamps without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Decodes a list of loosely typed store rows, skipping those that cannot be
/// read as an [`OverrideRow`].
pub fn decode_rows(values: Vec<serde_json::Value>) -> Vec<OverrideRow> {
    let total = values.len();
    let rows: Vec<OverrideRow> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value.clone()) {
            Ok(row) => Some(row),
            Err(e) if is_marked_inactive(&value) => {
                debug!(index, "Ignoring undecodable inactive override: {}", e);
                None
            }
            Err(e) => {
                let warning = DataQualityWarning::Undecodable(e.to_string());
                warn!(%warning, index, "Skipping malformed price override");
                None
            }
        })
        .collect();
    debug!("Decoded {} of {} override rows", rows.len(), total);
    rows
}

fn is_marked_inactive(value: &serde_json::Value) -> bool {
    ["is_active", "isActive"]
        .iter()
        .any(|key| value.get(key) == Some(&serde_json::Value::Bool(false)))
}

/// Supplies the current list of override rows.
#[async_trait]
pub trait OverrideSource: Send + Sync {
    async fn fetch_overrides(&self) -> Result<Vec<OverrideRow>>;
}
