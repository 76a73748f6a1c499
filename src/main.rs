use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Args, CommandFactory, Parser, Subcommand};
use pricematrix::core::log::init_logging;
use pricematrix::core::overrides::parse_timestamp;
use pricematrix::core::plan::{BillingPeriod, Currency, PlanTier};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ResolveArgs {
    /// Resolve prices at this time (RFC 3339) instead of now
    #[arg(long, value_parser = parse_at)]
    at: Option<DateTime<Utc>>,

    /// Ignore cached override rows and query the store
    #[arg(long)]
    refresh: bool,
}

impl From<&ResolveArgs> for pricematrix::RunOptions {
    fn from(args: &ResolveArgs) -> Self {
        pricematrix::RunOptions {
            at: args.at,
            refresh: args.refresh,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the effective price matrix
    Show {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Display the price and checkout reference of one plan
    Quote {
        /// Plan tier: base or plus
        tier: PlanTier,
        /// Billing period: monthly or yearly
        period: BillingPeriod,
        /// Currency: primary (BRL) or secondary (USD)
        #[arg(long)]
        currency: Option<Currency>,

        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Remove cached override rows
    CacheClear,
}

fn parse_at(raw: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).ok_or_else(|| anyhow!("Invalid timestamp: {raw}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => pricematrix::cli::setup::setup(),
        Some(Commands::Show { json, resolve }) => {
            pricematrix::run_command(
                pricematrix::AppCommand::Show { json },
                config_path,
                &(&resolve).into(),
            )
            .await
        }
        Some(Commands::Quote {
            tier,
            period,
            currency,
            resolve,
        }) => {
            pricematrix::run_command(
                pricematrix::AppCommand::Quote {
                    tier,
                    period,
                    currency,
                },
                config_path,
                &(&resolve).into(),
            )
            .await
        }
        Some(Commands::CacheClear) => {
            pricematrix::run_command(
                pricematrix::AppCommand::CacheClear,
                config_path,
                &pricematrix::RunOptions::default(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
