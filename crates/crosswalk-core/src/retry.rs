//! Exponential backoff retry for calls against the backing services.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration.
///
/// Every error is retried; the policy carries no opinion about which
/// failures are transient. Callers that must not retry simply wrap the
/// operation with `max_retries = 0`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the given max retries and base delay.
    /// The maximum delay cap defaults to 60 seconds.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Delay before the given retry attempt (0-indexed).
    ///
    /// The delay is `base_delay * 2^attempt`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exponential.min(self.max_delay)
    }

    /// Execute an async operation with retry.
    ///
    /// The closure `f` is called until it succeeds or the maximum number of
    /// retries is exhausted, in which case the last-seen error is returned.
    /// In total `f` runs at most `max_retries + 1` times.
    ///
    /// Each retry attempt is logged at `debug` level; the final failure
    /// after exhausting retries is logged at `warn` level.
    pub async fn execute<F, Fut, T, E>(&self, operation_name: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.max_retries {
                        warn!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            error = %error,
                            "Retries exhausted"
                        );
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt);
                    debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying after error"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
