use crate::core::overrides::{OverrideRow, OverrideSource, decode_rows};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads override rows from a local YAML or JSON file.
pub struct FileOverrideSource {
    path: PathBuf,
}

impl FileOverrideSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl OverrideSource for FileOverrideSource {
    async fn fetch_overrides(&self) -> Result<Vec<OverrideRow>> {
        debug!("Reading price overrides from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read overrides file: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<serde_json::Value> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse overrides file: {}", self.path.display()))?;
        Ok(decode_rows(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_yaml_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("overrides.yaml");
        fs::write(
            &path,
            r#"
- plan_tier: plus
  currency: USD
  billing_period: monthly
  amount: 7.99
  external_ref: price_launch
- plan_tier: plus
  currency: USD
"#,
        )?;

        let rows = FileOverrideSource::new(&path).fetch_overrides().await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Decimal::new(799, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_json_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("overrides.json");
        fs::write(
            &path,
            r#"[{"planTier": "base", "currency": "BRL", "billingPeriod": "yearly",
                 "amount": "89.90", "externalRef": "price_json"}]"#,
        )?;

        let rows = FileOverrideSource::new(&path).fetch_overrides().await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plan_tier, "base");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_file_has_no_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("overrides.yaml");
        fs::write(&path, "\n")?;

        let rows = FileOverrideSource::new(&path).fetch_overrides().await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = FileOverrideSource::new("/nonexistent/overrides.yaml")
            .fetch_overrides()
            .await;
        assert!(result.is_err());
    }
}
