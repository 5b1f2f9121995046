//! Retry-until-timeout wrapper around API calls.
//!
//! ```ignore
//! let workflow = retry(READ_TIMEOUT, || async {
//!     client.get_workflow(&request).await.map_err(read_retry_error)
//! })
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::retry::{INITIAL_BACKOFF, MAX_BACKOFF};
use crate::error::ProviderError;

/// Outcome of one failed attempt.
#[derive(Debug)]
pub enum RetryError {
    /// Sleep and try again while time remains.
    Retryable(ProviderError),
    /// Give up immediately.
    NonRetryable(ProviderError),
}

impl RetryError {
    /// Unwrap the inner error.
    pub fn into_inner(self) -> ProviderError {
        match self {
            Self::Retryable(err) | Self::NonRetryable(err) => err,
        }
    }
}

impl From<ProviderError> for RetryError {
    fn from(err: ProviderError) -> Self {
        retry_error(err)
    }
}

/// Classify an error for write calls.
pub fn retry_error(err: ProviderError) -> RetryError {
    retry_error_with(err, &[])
}

/// Classify an error, also treating `extra_codes` as retryable.
pub fn retry_error_with(err: ProviderError, extra_codes: &[&str]) -> RetryError {
    if err.is_retryable_with(extra_codes) {
        RetryError::Retryable(err)
    } else {
        RetryError::NonRetryable(err)
    }
}

/// Classify an error for read calls: anything from the API is retried
/// except a missing object.
pub fn read_retry_error(err: ProviderError) -> RetryError {
    match err {
        ProviderError::Api { .. } if err.is_not_found() => RetryError::NonRetryable(err),
        ProviderError::Api { .. } | ProviderError::Network(_) => RetryError::Retryable(err),
        other => RetryError::NonRetryable(other),
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or
/// `timeout` elapses. On timeout the last error is returned.
pub async fn retry<T, F, Fut>(timeout: Duration, op: F) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RetryError>>,
{
    retry_with_backoff(timeout, INITIAL_BACKOFF, MAX_BACKOFF, op).await
}

/// [`retry`] with an explicit backoff window.
pub async fn retry_with_backoff<T, F, Fut>(
    timeout: Duration,
    initial_backoff: Duration,
    max_backoff: Duration,
    op: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RetryError>>,
{
    let deadline = Instant::now() + timeout;
    let mut backoff = initial_backoff;
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(err)) => return Err(err),
            Err(RetryError::Retryable(err)) => {
                let now = Instant::now();
                if now >= deadline {
                    warn!(attempt, error = %err, "Retry budget exhausted");
                    return Err(err);
                }
                let sleep_for = backoff.min(deadline - now);
                debug!(
                    attempt,
                    backoff_ms = sleep_for.as_millis() as u64,
                    error = %err,
                    "Retryable error, backing off"
                );
                tokio::time::sleep(sleep_for).await;
                backoff = (backoff * 2).min(max_backoff);
                attempt += 1;
            },
        }
    }
}
