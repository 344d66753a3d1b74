//! Retry with exponential backoff and jitter
//!
//! Used for gateway calls that are safe to repeat, such as the bootstrap
//! session lookup.
//!
//! # Example
//!
//! ```rust,ignore
//! let policy = RetryPolicy::new(RetryConfig::default());
//! let session = policy.execute(|| gateway.current_session()).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Result, ShellError};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting initial attempt)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on the delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (2.0 doubles the delay each time)
    pub backoff_multiplier: f64,
    /// Random spread around each delay, as a fraction (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
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

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }
}

/// Executes operations with exponential backoff on transient errors
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base = self.config.initial_delay.as_millis() as f64
            * self.config.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.config.max_delay.as_millis() as f64);
        let delay = if self.config.jitter > 0.0 {
            let spread = capped * self.config.jitter;
            (capped + rand::random::<f64>() * spread * 2.0 - spread).max(0.0)
        } else {
            capped
        };
        Duration::from_millis(delay as u64)
    }

    /// Run `operation`, retrying while it fails with a transient error.
    ///
    /// Non-transient errors are returned immediately. When every attempt
    /// fails, the result is [`ShellError::RetryExhausted`].
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    warn!(attempt, error = %e, "Transient failure");
                    last_error = e.to_string();

                    // No sleep after the last attempt
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(self.calculate_delay(attempt)).await;
                    }
                }
            }
        }

        Err(ShellError::RetryExhausted {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy::new(
            RetryConfig::default()
                .with_initial_delay(Duration::from_millis(100))
                .with_max_delay(Duration::from_millis(350))
                .with_jitter(0.0),
        );
        assert_eq!(policy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(350));
    }

    #[test]
    fn test_jitter_stays_within_spread() {
        let policy = RetryPolicy::new(
            RetryConfig::default()
                .with_initial_delay(Duration::from_millis(100))
                .with_jitter(0.5),
        );
        for _ in 0..50 {
            let delay = policy.calculate_delay(0);
            assert!(delay >= Duration::from_millis(50), "{:?} below spread", delay);
            assert!(delay <= Duration::from_millis(150), "{:?} above spread", delay);
        }
    }

    #[test]
    fn test_jitter_is_clamped() {
        let config = RetryConfig::default().with_jitter(3.0);
        assert!((config.jitter - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::with_defaults();

        let counter = Arc::clone(&calls);
        let result = policy
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ShellError::Network("connection reset".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::with_defaults();

        let counter = Arc::clone(&calls);
        let result: Result<()> = policy
            .execute(|| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ShellError::NotAuthenticated)
                }
            })
            .await;

        assert!(matches!(result, Err(ShellError::NotAuthenticated)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempts() {
        let policy = RetryPolicy::new(RetryConfig::default().with_max_retries(1));
        let result: Result<()> = policy
            .execute(|| async { Err(ShellError::Network("down".to_string())) })
            .await;
        assert!(matches!(
            result,
            Err(ShellError::RetryExhausted { attempts: 2, .. })
        ));
    }
}
