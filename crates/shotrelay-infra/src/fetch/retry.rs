//! Bounded retry with linear backoff.
//!
//! The loop is the whole state machine: attempt n either succeeds, fails
//! terminally, or sleeps `backoff * n` and becomes attempt n + 1 until the
//! attempt budget is spent.

use std::future::Future;
use std::time::Duration;

use super::FetchError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Base wait; attempt n sleeps `backoff * n` before retrying.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(300),
        }
    }
}

/// Drive `op` until it succeeds, fails terminally, or exhausts the policy.
/// Only transient errors are retried; the last error is returned as is.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let wait = policy.backoff * attempt;
                tracing::warn!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "Transient fetch failure, retrying"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
