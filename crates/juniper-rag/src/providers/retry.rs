//! Exponential-backoff retry for HTTP-backed providers

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Retry `operation` on transient errors.
///
/// Makes at most `max_retries + 1` attempts, sleeping `base_delay * 2^attempt`
/// between them. Permanent errors are returned immediately.
pub async fn retry_request<F, Fut, T>(max_retries: u32, base_delay: Duration, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                if attempt < max_retries {
                    let delay = base_delay * 2u32.pow(attempt);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::internal("retry loop ended without an attempt")))
}
