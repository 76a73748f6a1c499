use crate::core::cache::KeyValueCollection;
use crate::core::overrides::{OverrideRow, OverrideSource};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const LAST_GOOD_SUFFIX: &str = ":last-good";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Fetched from the source just now.
    Live,
    /// Served from a cache entry that is still within its TTL.
    Cached,
    /// The source failed; these are the rows of the last successful fetch.
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub rows: Vec<OverrideRow>,
    pub freshness: Freshness,
}

/// Caches the rows of an inner source and falls back to the last good copy
/// when the source fails.
///
/// Entries are stored under `key`, which must identify the inner source:
/// collections are shared between sources.
pub struct CachingOverrideSource<T: OverrideSource> {
    inner: T,
    cache: Arc<dyn KeyValueCollection>,
    ttl: Duration,
    fresh_key: String,
    last_good_key: String,
}

impl<T: OverrideSource> CachingOverrideSource<T> {
    pub fn new(inner: T, cache: Arc<dyn KeyValueCollection>, ttl: Duration, key: &str) -> Self {
        Self {
            inner,
            cache,
            ttl,
            fresh_key: key.to_string(),
            last_good_key: format!("{key}{LAST_GOOD_SUFFIX}"),
        }
    }

    pub async fn fetch(&self, refresh: bool) -> Result<FetchOutcome> {
        if !refresh && let Some(rows) = self.read(&self.fresh_key).await {
            debug!("Using cached price overrides");
            return Ok(FetchOutcome {
                rows,
                freshness: Freshness::Cached,
            });
        }

        match self.inner.fetch_overrides().await {
            Ok(rows) => {
                match serde_json::to_vec(&rows) {
                    Ok(bytes) => {
                        self.cache
                            .put(&self.fresh_key, bytes.clone(), Some(self.ttl))
                            .await;
                        self.cache.put(&self.last_good_key, bytes, None).await;
                    }
                    Err(e) => debug!("Could not serialize overrides for caching: {}", e),
                }
                Ok(FetchOutcome {
                    rows,
                    freshness: Freshness::Live,
                })
            }
            Err(err) => match self.read(&self.last_good_key).await {
                Some(rows) => {
                    warn!(error = %err, "Override fetch failed, using last known rows");
                    Ok(FetchOutcome {
                        rows,
                        freshness: Freshness::Stale,
                    })
                }
                None => Err(err),
            },
        }
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    async fn read(&self, key: &str) -> Option<Vec<OverrideRow>> {
        let bytes = self.cache.get(key).await?;
        serde_json::from_slice(&bytes)
            .inspect_err(|e| debug!("Discarding unreadable cache entry {}: {}", key, e))
            .ok()
    }
}

#[async_trait]
impl<T: OverrideSource> OverrideSource for CachingOverrideSource<T> {
    async fn fetch_overrides(&self) -> Result<Vec<OverrideRow>> {
        self.fetch(false).await.map(|outcome| outcome.rows)
    }
}
