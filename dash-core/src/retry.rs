//! Bounded retry for transient transport failures.
//!
//! Retries:
//! - Timeouts
//! - Connection failures
//! - Body read failures
//!
//! Never retries an HTTP status. A 4xx or 5xx response is an answer from the provider and is
//! surfaced as-is.

use std::future::Future;
use std::time::Duration;

use crate::error::DashboardError;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.2;
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Seconds; the wait before retry `n` is `backoff_factor * 2^(n-1)`.
    pub backoff_factor: f64,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BACKOFF_FACTOR)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self { max_retries, backoff_factor: backoff_factor.max(0.0), max_delay: DEFAULT_MAX_DELAY }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn none() -> Self {
        Self::new(0, 0.0)
    }

    /// Delay before the given retry (1-based), capped at `max_delay`.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 2f64.powi(retry.saturating_sub(1).min(30) as i32);
        Duration::try_from_secs_f64(self.backoff_factor * factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, DashboardError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DashboardError>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if retry > 0 {
                        tracing::info!("Request succeeded after {} retries", retry);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && retry < self.max_retries => {
                    retry += 1;
                    let delay = self.delay_before_retry(retry);
                    tracing::warn!(
                        "Transient failure, retry {} of {} in {:?}: {}",
                        retry,
                        self.max_retries,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!("All {} attempts exhausted: {}", retry + 1, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}
