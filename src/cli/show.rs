use super::ui;
use crate::PriceSnapshot;
use crate::core::format::format_price;
use crate::core::plan::{BillingPeriod, Cell, Currency, PlanTier};
use crate::core::resolver::{EffectivePriceMatrix, PriceSource};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A flattened matrix cell for machine-readable output.
#[derive(Debug, Serialize)]
pub struct MatrixRow {
    pub currency: Currency,
    pub tier: PlanTier,
    pub period: BillingPeriod,
    pub amount: Decimal,
    pub display: String,
    pub external_ref: String,
    pub source: PriceSource,
}

#[derive(Debug, Serialize)]
struct MatrixDocument {
    resolved_at: DateTime<Utc>,
    outdated: bool,
    prices: Vec<MatrixRow>,
}

pub fn matrix_rows(matrix: &EffectivePriceMatrix) -> Vec<MatrixRow> {
    matrix
        .iter()
        .map(|(cell, price)| MatrixRow {
            currency: cell.currency,
            tier: cell.tier,
            period: cell.period,
            amount: price.entry.amount,
            display: format_price(price.entry.amount, cell.currency),
            external_ref: price.entry.external_ref.clone(),
            source: price.source,
        })
        .collect()
}

pub fn source_label(source: &PriceSource) -> String {
    match source {
        PriceSource::Default => "default".to_string(),
        PriceSource::Override => "override".to_string(),
        PriceSource::Promotion { ends_at } => {
            format!("promotion until {}", ends_at.format("%Y-%m-%d %H:%M UTC"))
        }
    }
}

fn display_table(matrix: &EffectivePriceMatrix, currency: Currency) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Plan"),
        ui::header_cell("Period"),
        ui::header_cell(&format!("Price ({currency})")),
        ui::header_cell("Source"),
        ui::header_cell("Checkout ref"),
    ]);

    for tier in PlanTier::ALL {
        for period in BillingPeriod::ALL {
            let price = matrix.get(Cell::new(currency, tier, period));
            let promotional = matches!(price.source, PriceSource::Promotion { .. });
            table.add_row(vec![
                comfy_table::Cell::new(tier.to_string()),
                comfy_table::Cell::new(period.to_string()),
                ui::price_cell(&format_price(price.entry.amount, currency), promotional),
                comfy_table::Cell::new(source_label(&price.source)),
                ui::subtle_cell(&price.entry.external_ref),
            ]);
        }
    }

    table.to_string()
}

pub fn render(snapshot: &PriceSnapshot, json: bool) -> Result<String> {
    if json {
        let document = MatrixDocument {
            resolved_at: snapshot.resolved_at,
            outdated: snapshot.outdated,
            prices: matrix_rows(&snapshot.matrix),
        };
        return serde_json::to_string_pretty(&document).context("Failed to serialize price matrix");
    }

    let mut output = format!(
        "Prices at {}\n",
        ui::style_text(
            &snapshot.resolved_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            ui::StyleType::Title
        )
    );
    for currency in Currency::ALL {
        output.push('\n');
        output.push_str(&display_table(&snapshot.matrix, currency));
        output.push('\n');
    }
    if snapshot.outdated {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("Prices may be outdated.", ui::StyleType::Warning)
        ));
    }
    Ok(output)
}

pub fn run(snapshot: &PriceSnapshot, json: bool) -> Result<()> {
    println!("{}", render(snapshot, json)?);
    Ok(())
}
