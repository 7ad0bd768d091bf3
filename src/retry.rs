//! Bounded retry with exponential backoff for explorer requests.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Errors that know whether a failed attempt is worth repeating.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; `3` means up to 4 attempts.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_retries,
            base_delay,
            multiplier,
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (0-indexed): `base * multiplier^retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let ms = self.base_delay.as_millis() as f64 * self.multiplier.powi(retry as i32);
        Duration::from_millis(ms as u64)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. `operation` receives the current retry count.
pub async fn execute_with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut retry = 0u32;
    loop {
        match operation(retry).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && retry < policy.max_retries => {
                let delay = policy.delay_for(retry);
                tracing::info!(
                    "retrying request ({}/{}) in {:?}: {}",
                    retry + 1,
                    policy.max_retries,
                    delay,
                    err
                );
                sleep(delay).await;
                retry += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
