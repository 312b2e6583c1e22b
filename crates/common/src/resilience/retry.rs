//! Generic retry execution with pluggable policies and backoff
//!
//! The executor re-runs a fallible async operation until it succeeds, the
//! policy says stop, or the attempt budget runs out. On exhaustion the most
//! recent real error is returned unchanged: callers always see the failure
//! that actually happened, never a synthetic "retries exhausted" wrapper.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Invalid retry configuration
#[derive(Debug, Error)]
#[error("Invalid retry configuration: {message}")]
pub struct RetryConfigError {
    pub message: String,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide whether `error`, observed on 0-indexed `attempt`, warrants
    /// another try.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the configured backoff delay
    Retry,
    /// Retry after a custom delay (e.g. server-provided)
    RetryAfter(Duration),
    /// Don't retry; the error propagates as-is
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Delay to wait after the given 0-indexed failed attempt.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget (initial try + retries)
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_secs(1),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        if let BackoffStrategy::Exponential { base, .. } = &self.backoff {
            if *base <= 0.0 {
                return Err(RetryConfigError {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`] with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Execute an operation with retry logic.
    ///
    /// The final error is the one produced by the last attempt actually made,
    /// whether the loop stopped on policy grounds or exhausted its budget.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            debug!(attempt = attempt + 1, max_attempts, "executing operation");

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt + 1 >= max_attempts {
                        warn!(
                            attempts = attempt + 1,
                            error = ?error,
                            "attempt budget exhausted, propagating last error"
                        );
                        return Err(error);
                    }

                    let delay = match self.policy.should_retry(&error, attempt) {
                        RetryDecision::Stop => {
                            debug!(error = ?error, "policy declined retry");
                            return Err(error);
                        }
                        RetryDecision::Retry => self.config.backoff.calculate_delay(attempt),
                        RetryDecision::RetryAfter(custom_delay) => custom_delay,
                    };

                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = ?error,
                        "operation failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Retries on any error
    #[derive(Debug, Clone)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retries
    #[derive(Debug, Clone)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    use super::policies::{AlwaysRetry, NeverRetry};
    use super::*;

    #[test]
    fn test_fixed_backoff_is_constant() {
        let strategy = BackoffStrategy::Fixed(Duration::from_millis(100));

        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(5), Duration::from_millis(100));
    }

    #[test]
    fn test_exponential_backoff_doubles_from_one_second() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay: Duration::from_secs(1),
            base: 2.0,
            max_delay: Duration::from_secs(30),
        };

        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(1000));
        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(2000));
        assert_eq!(strategy.calculate_delay(2), Duration::from_millis(4000));
        assert_eq!(strategy.calculate_delay(3), Duration::from_millis(8000));
    }

    #[test]
    fn test_exponential_backoff_caps_at_max_delay() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay: Duration::from_secs(1),
            base: 2.0,
            max_delay: Duration::from_secs(10),
        };

        assert_eq!(strategy.calculate_delay(20), Duration::from_secs(10));
    }

    #[test]
    fn test_config_validation() {
        let result = RetryConfig::builder().max_attempts(0).build();
        assert!(result.is_err());

        let result = RetryConfig::builder()
            .exponential_backoff(Duration::from_secs(1), 0.0, Duration::from_secs(10))
            .build();
        assert!(result.is_err());

        assert!(RetryConfig::builder().max_attempts(5).build().is_ok());
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let config = RetryConfig::builder()
            .max_attempts(3)
            .fixed_backoff(Duration::from_millis(1))
            .build()
            .expect("valid config");

        let executor = RetryExecutor::new(config, AlwaysRetry);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result = executor
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    let count = c.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err("temporary failure")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_real_error() {
        let config = RetryConfig::builder()
            .max_attempts(3)
            .fixed_backoff(Duration::from_millis(1))
            .build()
            .expect("valid config");

        let executor = RetryExecutor::new(config, AlwaysRetry);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result: Result<(), String> = executor
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    let count = c.fetch_add(1, Ordering::SeqCst);
                    Err(format!("failure #{}", count + 1))
                }
            })
            .await;

        // Not a synthetic wrapper: the error from the final attempt comes back
        assert_eq!(result, Err("failure #3".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_policy_stop_short_circuits() {
        let executor = RetryExecutor::new(RetryConfig::default(), NeverRetry);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result: Result<(), &str> = executor
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("non-retryable")
                }
            })
            .await;

        assert_eq!(result, Err("non-retryable"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_delays_between_attempts() {
        let config = RetryConfig::builder()
            .max_attempts(4)
            .exponential_backoff(Duration::from_secs(1), 2.0, Duration::from_secs(30))
            .build()
            .expect("valid config");

        let executor = RetryExecutor::new(config, AlwaysRetry);
        let start = tokio::time::Instant::now();

        let result: Result<(), &str> = executor.execute(|| async { Err("always fails") }).await;
        assert!(result.is_err());

        // Paused clock: elapsed time is exactly the sum of the backoff sleeps
        // (1s + 2s + 4s).
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_retry_after_overrides_backoff() {
        struct ShortCustomDelay;

        impl RetryPolicy<&'static str> for ShortCustomDelay {
            fn should_retry(&self, _error: &&'static str, _attempt: u32) -> RetryDecision {
                RetryDecision::RetryAfter(Duration::from_millis(1))
            }
        }

        let config = RetryConfig::builder()
            .max_attempts(2)
            .exponential_backoff(Duration::from_secs(60), 2.0, Duration::from_secs(60))
            .build()
            .expect("valid config");

        let executor = RetryExecutor::new(config, ShortCustomDelay);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let start = Instant::now();
        let result: Result<(), &str> = executor
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("flaky")
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        // The 60s configured backoff was bypassed by the custom delay
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
