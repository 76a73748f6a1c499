use anyhow::Error;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Whether a failed store request is worth repeating.
///
/// Transport failures, 5xx and 429 are transient. Any other status (bad key,
/// unknown table) fails the same way on every attempt.
pub fn is_transient(err: &reqwest::Error) -> bool {
    match err.status() {
        Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        None => !err.is_decode() && !err.is_builder(),
    }
}

/// Runs a store request, repeating it up to `retries` more times, `delay_ms`
/// apart, while it fails transiently.
pub async fn with_retry<F, Fut, T>(mut request: F, retries: usize, delay_ms: u64) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match request().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt < retries && is_transient(&err) => {
                attempt += 1;
                debug!(
                    status = ?err.status(),
                    "Store request failed ({}), retry {}/{}",
                    err,
                    attempt,
                    retries
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
