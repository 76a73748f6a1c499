use crate::core::plan::Currency;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const API_KEY_ENV: &str = "PRICEMATRIX_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RestSourceConfig {
    pub base_url: String,
    #[serde(default = "default_table")]
    pub table: String,
    pub api_key: Option<String>,
}

fn default_table() -> String {
    "plan_prices".to_string()
}

impl RestSourceConfig {
    /// The configured key, or the one from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FileSourceConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum SourceConfig {
    Rest(RestSourceConfig),
    File(FileSourceConfig),
}

impl SourceConfig {
    /// Names the rows this source serves, so cached rows from one source are
    /// never read back for another.
    pub fn cache_key(&self) -> String {
        match self {
            SourceConfig::Rest(rest) => format!(
                "rest:{}/{}",
                rest.base_url.trim_end_matches('/'),
                rest.table
            ),
            SourceConfig::File(file) => format!("file:{}", file.path.display()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_persist() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
            persist: default_persist(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Where override rows come from. Without one only static prices are shown.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub source: Option<SourceConfig>,
    #[serde(default = "default_currency")]
    pub currency: Currency,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

fn default_currency() -> Currency {
    Currency::Primary
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "pricematrix", "pricematrix")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "pricematrix", "pricematrix")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
