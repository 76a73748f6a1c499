use chrono::{TimeZone, Utc};
use pricematrix::core::config::AppConfig;
use pricematrix::core::plan::{BillingPeriod, Cell, Currency, PlanTier};
use pricematrix::core::resolver::PriceSource;
use pricematrix::{AppCommand, RunOptions};
use rust_decimal::Decimal;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};

    pub async fn create_flaky_store_server(body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/plan_prices"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/plan_prices"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        mock_server
    }
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_store_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/plan_prices"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, source: &str) -> std::path::PathBuf {
        write_config_with_cache(dir, source, false)
    }

    pub fn write_config_with_cache(
        dir: &std::path::Path,
        source: &str,
        persist: bool,
    ) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let content = format!(
            r#"
{source}
currency: primary
cache:
  ttl_secs: 60
  persist: {persist}
data_path: "{}"
"#,
            dir.join("data").display()
        );
        std::fs::write(&config_path, content).expect("Failed to write config file");
        config_path
    }
}

const STORE_ROWS: &str = r#"[
    {
        "plan_tier": "premium",
        "currency": "BRL",
        "billing_period": "monthly",
        "amount": 14.90,
        "external_ref": "price_launch_week",
        "is_active": true,
        "is_promotion": true,
        "promotion_start": "2025-06-01T00:00:00+00:00",
        "promotion_end": "2025-06-08T00:00:00+00:00"
    },
    {
        "plan_tier": "base",
        "currency": "USD",
        "billing_period": "yearly",
        "amount": "39.99",
        "external_ref": "price_base_yearly_usd_v2",
        "is_active": true,
        "is_promotion": false
    },
    {
        "plan_tier": "gold",
        "currency": "USD",
        "billing_period": "monthly",
        "amount": 1.00,
        "external_ref": "price_bogus",
        "is_active": true,
        "is_promotion": false
    }
]"#;

fn plus_monthly_brl() -> Cell {
    Cell::new(Currency::Primary, PlanTier::Plus, BillingPeriod::Monthly)
}

#[test_log::test(tokio::test)]
async fn test_load_prices_from_rest_store() {
    let mock_server = test_utils::create_store_server(200, STORE_ROWS).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        &format!("source:\n  rest:\n    base_url: \"{}\"", mock_server.uri()),
    );
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let during = RunOptions {
        at: Some(Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap()),
        refresh: false,
    };
    let snapshot = pricematrix::load_prices(&config, &during).await.unwrap();
    info!(outdated = snapshot.outdated, "Resolved prices during promotion");

    assert!(!snapshot.outdated);
    let promo = snapshot.matrix.get(plus_monthly_brl());
    assert_eq!(promo.entry.amount, Decimal::new(1490, 2));
    assert!(matches!(promo.source, PriceSource::Promotion { .. }));
    assert_eq!(
        snapshot
            .matrix
            .checkout_ref(Cell::new(Currency::Secondary, PlanTier::Base, BillingPeriod::Yearly)),
        "price_base_yearly_usd_v2"
    );
    assert_eq!(
        snapshot
            .matrix
            .get(Cell::new(Currency::Secondary, PlanTier::Plus, BillingPeriod::Monthly))
            .source,
        PriceSource::Default
    );

    let after = RunOptions {
        at: Some(Utc.with_ymd_and_hms(2025, 6, 9, 0, 0, 0).unwrap()),
        refresh: false,
    };
    let snapshot = pricematrix::load_prices(&config, &after).await.unwrap();
    assert_eq!(
        snapshot.matrix.get(plus_monthly_brl()).entry.amount,
        Decimal::new(1990, 2)
    );
}

#[test_log::test(tokio::test)]
async fn test_store_failure_falls_back_to_catalog() {
    let mock_server = test_utils::create_store_server(503, "unavailable").await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        &format!("source:\n  rest:\n    base_url: \"{}\"", mock_server.uri()),
    );
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let snapshot = pricematrix::load_prices(&config, &RunOptions::default())
        .await
        .unwrap();

    assert!(snapshot.outdated);
    for (_, price) in snapshot.matrix.iter() {
        assert_eq!(price.source, PriceSource::Default);
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_file_source() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let overrides_path = dir.path().join("overrides.json");
    fs::write(&overrides_path, STORE_ROWS).expect("Failed to write overrides file");
    let config_path = test_utils::write_config(
        dir.path(),
        &format!("source:\n  file:\n    path: \"{}\"", overrides_path.display()),
    );
    let config_path = config_path.to_str().unwrap();

    let options = RunOptions {
        at: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        refresh: true,
    };

    let result =
        pricematrix::run_command(AppCommand::Show { json: true }, Some(config_path), &options)
            .await;
    assert!(result.is_ok(), "Show failed with: {:?}", result.err());

    let result = pricematrix::run_command(
        AppCommand::Quote {
            tier: PlanTier::Plus,
            period: BillingPeriod::Monthly,
            currency: None,
        },
        Some(config_path),
        &options,
    )
    .await;
    assert!(result.is_ok(), "Quote failed with: {:?}", result.err());

    let result =
        pricematrix::run_command(AppCommand::CacheClear, Some(config_path), &options).await;
    assert!(result.is_ok(), "Cache clear failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_is_an_error() {
    let result = pricematrix::run_command(
        AppCommand::Show { json: false },
        Some("/nonexistent/pricematrix/config.yaml"),
        &RunOptions::default(),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_no_source_uses_catalog() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), "");
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let snapshot = pricematrix::load_prices(&config, &RunOptions::default())
        .await
        .unwrap();
    assert!(!snapshot.outdated);
    assert_eq!(
        snapshot.matrix.get(plus_monthly_brl()).entry.amount,
        Decimal::new(1990, 2)
    );
}

#[test_log::test(tokio::test)]
async fn test_store_outage_after_success_serves_last_rows() {
    let mock_server = test_utils::create_flaky_store_server(STORE_ROWS).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config_with_cache(
        dir.path(),
        &format!("source:\n  rest:\n    base_url: \"{}\"", mock_server.uri()),
        true,
    );
    let config = AppConfig::load_from_path(&config_path).unwrap();
    let at = Some(Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap());

    let live = pricematrix::load_prices(&config, &RunOptions { at, refresh: false })
        .await
        .unwrap();
    assert!(!live.outdated);
    assert_eq!(live.matrix.checkout_ref(plus_monthly_brl()), "price_launch_week");

    let stale = pricematrix::load_prices(&config, &RunOptions { at, refresh: true })
        .await
        .unwrap();
    assert!(stale.outdated);
    let promo = stale.matrix.get(plus_monthly_brl());
    assert_eq!(promo.entry.amount, Decimal::new(1490, 2));
    assert!(matches!(promo.source, PriceSource::Promotion { .. }));
}

#[test_log::test(tokio::test)]
async fn test_switching_source_does_not_reuse_cached_rows() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let first_path = dir.path().join("first.json");
    let second_path = dir.path().join("second.json");
    fs::write(&first_path, STORE_ROWS).expect("Failed to write overrides file");
    fs::write(&second_path, "[]").expect("Failed to write overrides file");
    let missing_path = dir.path().join("missing.json");
    let at = Some(Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap());

    let load = |overrides: std::path::PathBuf, refresh: bool| {
        let config_path = test_utils::write_config_with_cache(
            dir.path(),
            &format!("source:\n  file:\n    path: \"{}\"", overrides.display()),
            true,
        );
        async move {
            let config = AppConfig::load_from_path(&config_path).unwrap();
            pricematrix::load_prices(&config, &RunOptions { at, refresh })
                .await
                .unwrap()
        }
    };

    let first = load(first_path, false).await;
    assert_eq!(first.matrix.checkout_ref(plus_monthly_brl()), "price_launch_week");

    let second = load(second_path, false).await;
    assert!(!second.outdated);
    assert_eq!(second.matrix.get(plus_monthly_brl()).source, PriceSource::Default);

    let missing = load(missing_path, true).await;
    assert!(missing.outdated);
    for (_, price) in missing.matrix.iter() {
        assert_eq!(price.source, PriceSource::Default);
    }
}
