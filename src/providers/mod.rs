pub mod caching;
pub mod file;
pub mod rest;
pub mod util;

use crate::core::config::SourceConfig;
use crate::core::overrides::{OverrideRow, OverrideSource};
use anyhow::Result;
use async_trait::async_trait;

/// The override source selected by configuration.
pub enum ConfiguredSource {
    Rest(rest::RestOverrideSource),
    File(file::FileOverrideSource),
    /// No source configured; only static prices apply.
    Static,
}

impl ConfiguredSource {
    pub fn from_config(config: Option<&SourceConfig>) -> Result<Self> {
        Ok(match config {
            Some(SourceConfig::Rest(rest)) => {
                ConfiguredSource::Rest(rest::RestOverrideSource::from_config(rest)?)
            }
            Some(SourceConfig::File(file)) => {
                ConfiguredSource::File(file::FileOverrideSource::new(&file.path))
            }
            None => ConfiguredSource::Static,
        })
    }
}

#[async_trait]
impl OverrideSource for ConfiguredSource {
    async fn fetch_overrides(&self) -> Result<Vec<OverrideRow>> {
        match self {
            ConfiguredSource::Rest(source) => source.fetch_overrides().await,
            ConfiguredSource::File(source) => source.fetch_overrides().await,
            ConfiguredSource::Static => Ok(Vec::new()),
        }
    }
}
