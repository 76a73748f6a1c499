//! Key/value cache abstractions

use async_trait::async_trait;
use std::time::Duration;

/// A named collection of byte values with optional expiry.
///
/// Failures inside an implementation are logged and surface as misses; a
/// cache never fails its caller.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    async fn remove(&self, key: &str);

    async fn clear(&self);
}
