//! Bounded retry with fixed backoff, and timeout bounding for backend calls.
//!
//! [`retry`] wraps a fallible async operation with a [`RetryPolicy`] and a
//! predicate deciding which errors are worth another attempt. Errors the
//! predicate rejects are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// Tunable parameters for a bounded, fixed-backoff retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Create a new policy.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(3))
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted. The last error is returned.
pub async fn retry<T, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: P,
    mut op: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
    P: Fn(&AppError) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    backoff_ms = policy.backoff.as_millis() as u64,
                    error = %e,
                    "Attempt {attempt} failed, retrying",
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                if is_retryable(&e) {
                    tracing::error!(operation, attempts = attempt, error = %e, "Retries exhausted");
                }
                return Err(e);
            }
        }
    }
}

/// Bound `fut` by `limit`. Elapsing is reported as an error of `kind`, so
/// a store timeout reads as [`ErrorKind::StoreUnavailable`] and flows
/// through the same retry path as a refused connection.
pub async fn with_timeout<T, Fut>(
    limit: Duration,
    kind: ErrorKind,
    operation: &str,
    fut: Fut,
) -> AppResult<T>
where
    Fut: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(elapsed) => Err(AppError::with_source(
            kind,
            format!("{operation} timed out after {}ms", limit.as_millis()),
            elapsed,
        )),
    }
}
