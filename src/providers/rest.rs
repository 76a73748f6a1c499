use crate::core::config::RestSourceConfig;
use crate::core::overrides::{OverrideRow, OverrideSource, decode_rows};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

/// Reads override rows from a PostgREST-style table endpoint.
pub struct RestOverrideSource {
    base_url: String,
    table: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RestOverrideSource {
    pub fn new(base_url: &str, table: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("pricematrix/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            api_key,
            client,
        })
    }

    pub fn from_config(config: &RestSourceConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.table, config.resolved_api_key())
    }

    fn url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select=*&is_active=eq.true",
            self.base_url, self.table
        )
    }
}

#[async_trait]
impl OverrideSource for RestOverrideSource {
    async fn fetch_overrides(&self) -> Result<Vec<OverrideRow>> {
        let url = self.url();
        debug!("Requesting price overrides from {}", url);

        let client = &self.client;
        let api_key = self.api_key.as_deref();
        let url = url.as_str();
        let response = with_retry(
            || async move {
                let mut request = client.get(url).header("Accept", "application/json");
                if let Some(key) = api_key {
                    request = request.header("apikey", key).bearer_auth(key);
                }
                request.send().await?.error_for_status()
            },
            3,
            500,
        )
        .await
        .with_context(|| format!("Failed to fetch price overrides from {}", self.base_url))?;

        let response_text = response
            .text()
            .await
            .context("Failed to read price override response")?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty price override response"));
        }

        let values: Vec<serde_json::Value> =
            serde_json::from_str(&response_text).with_context(|| {
                format!("Failed to parse price override response: '{response_text}'")
            })?;

        let rows = decode_rows(values);
        debug!("Fetched {} price overrides", rows.len());
        Ok(rows)
    }
}
