//! Retry support for transient API failures
//!
//! Requests that fail with a network error, a 5xx status or a 429 are retried
//! with exponential backoff. Everything else fails on the first attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

/// Classifies errors as transient (worth retrying) or permanent
pub trait RetryableError {
    /// Whether the failed operation may succeed if attempted again
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason used in log output
    fn retry_reason(&self) -> &str;
}

/// Backoff settings for retried requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Randomize delays to avoid synchronized retries
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a retry configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never retries
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delays between attempts: `initial`, `2 * initial`, `4 * initial`, ... capped at `max_delay`
    fn delays(&self) -> Vec<Duration> {
        let factor = (self.initial_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(|delay| if self.use_jitter { jitter(delay) } else { delay })
            .take(self.max_retries)
            .collect()
    }
}

/// Run `operation`, retrying transient failures according to `config`
///
/// # Arguments
///
/// * `operation` - Closure producing a fresh future for each attempt
/// * `config` - Backoff settings
/// * `description` - Label used in log output
pub async fn with_retry<F, Fut, T, E>(
    operation: F,
    config: &RetryConfig,
    description: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let strategy = config.delays();
    debug!(
        max_retries = strategy.len(),
        "Starting {} with retry", description
    );

    RetryIf::spawn(strategy, operation, |err: &E| {
        let retry = err.is_retryable();
        if retry {
            warn!(
                reason = err.retry_reason(),
                error = %err,
                "{} failed, retrying", description
            );
        }
        retry
    })
    .await
}
