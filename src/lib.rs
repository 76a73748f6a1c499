pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::plan::{BillingPeriod, Cell, Currency, PlanTier};
use crate::core::resolver::{EffectivePriceMatrix, PriceResolver};
use crate::providers::ConfiguredSource;
use crate::providers::caching::{CachingOverrideSource, Freshness};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Show {
        json: bool,
    },
    Quote {
        tier: PlanTier,
        period: BillingPeriod,
        currency: Option<Currency>,
    },
    CacheClear,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Resolve prices at this instant instead of now.
    pub at: Option<DateTime<Utc>>,
    /// Skip the cached override rows.
    pub refresh: bool,
}

/// The resolved matrix together with how it was obtained.
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    pub matrix: EffectivePriceMatrix,
    pub resolved_at: DateTime<Utc>,
    /// Set when live override rows could not be fetched.
    pub outdated: bool,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    options: &RunOptions,
) -> Result<()> {
    info!("pricematrix starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Show { json } => {
            let snapshot = load_prices(&config, options).await?;
            cli::show::run(&snapshot, json)
        }
        AppCommand::Quote {
            tier,
            period,
            currency,
        } => {
            let snapshot = load_prices(&config, options).await?;
            let cell = Cell::new(currency.unwrap_or(config.currency), tier, period);
            cli::quote::run(&snapshot, cell);
            Ok(())
        }
        AppCommand::CacheClear => {
            caching_source(&config)?.clear().await;
            info!("Cleared cached price overrides");
            Ok(())
        }
    }
}

fn caching_source(config: &AppConfig) -> Result<CachingOverrideSource<ConfiguredSource>> {
    let source = ConfiguredSource::from_config(config.source.as_ref())?;
    let data_path = config
        .data_path()
        .inspect_err(|e| debug!("No data directory available: {}", e))
        .ok();
    let collection =
        store::open_collection("overrides", data_path.as_deref(), config.cache.persist);
    let key = config
        .source
        .as_ref()
        .map_or_else(|| "static".to_string(), |source| source.cache_key());
    Ok(CachingOverrideSource::new(
        source,
        collection,
        Duration::from_secs(config.cache.ttl_secs),
        &key,
    ))
}

/// Fetches override rows and resolves the price matrix.
///
/// A failed fetch is not an error: the last cached rows are used if there
/// are any, otherwise the static catalog, and the snapshot is marked outdated.
pub async fn load_prices(config: &AppConfig, options: &RunOptions) -> Result<PriceSnapshot> {
    let resolved_at = options.at.unwrap_or_else(Utc::now);

    let (rows, outdated) = if config.source.is_none() {
        debug!("No override source configured, using catalog prices");
        (Vec::new(), false)
    } else {
        let source = caching_source(config)?;
        let pb = cli::ui::new_spinner("Fetching prices...");
        let outcome = source.fetch(options.refresh).await;
        pb.finish_and_clear();

        match outcome {
            Ok(outcome) => {
                debug!(
                    rows = outcome.rows.len(),
                    freshness = ?outcome.freshness,
                    "Loaded price overrides"
                );
                (outcome.rows, outcome.freshness == Freshness::Stale)
            }
            Err(e) => {
                warn!(error = %e, "Could not load price overrides, using catalog prices");
                (Vec::new(), true)
            }
        }
    };

    let matrix = PriceResolver::default().resolve(&rows, resolved_at);
    Ok(PriceSnapshot {
        matrix,
        resolved_at,
        outdated,
    })
}
