//! Retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::Result;

/// Bounded retry policy with exponential backoff.
///
/// After a failed attempt `n` (zero-based) the policy sleeps
/// `base_delay * multiplier^n` before the next one, until `max_attempts`
/// attempts have been made.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use jobsync_core::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(500));
/// assert_eq!(policy.delay_for(0), Duration::from_millis(500));
/// assert_eq!(policy.delay_for(1), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: u32,
}

impl RetryPolicy {
    /// Create a policy doubling the delay after each failure.
    ///
    /// `max_attempts` counts the first attempt; zero is treated as one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: 2,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Use a different backoff multiplier.
    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier.max(1);
        self
    }

    /// Returns the total number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay after the first failure.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the delay to sleep after failed attempt `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `operation` until it succeeds or attempts are exhausted.
    ///
    /// The operation receives the zero-based attempt number. Returns the
    /// last error once no attempts remain.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 >= self.max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        ?delay,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}
