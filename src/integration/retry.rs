//! Retry with linear backoff
//!
//! Shared by every core banking step of the submission workflow. Only
//! transient errors are retried; everything else propagates on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Retry budget and pacing for one core banking step
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    /// Linear backoff: attempt 1 waits base, attempt 2 waits 2x base, ...
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// Run `operation` up to `policy.max_attempts` times.
///
/// Sleeps `attempt * backoff_base` after each failed attempt except the
/// last; the final error is returned unchanged.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    step: &'static str,
    mut operation: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff_for(attempt);
                tracing::warn!(
                    step,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "core banking step failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
