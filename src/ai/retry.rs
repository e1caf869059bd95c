//! Retry Controller
//!
//! Bounded exponential backoff around one fallible remote call.
//!
//! - Transient failures (rate limit, overload) are retried after
//!   `initial_delay * 2^n`, with no jitter
//! - Terminal failures are returned on the spot
//! - The last error is returned unchanged once attempts run out; there is no
//!   wait after the final attempt

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::config::RetryConfig;
use crate::constants::retry as retry_constants;
use crate::types::Classified;

/// Upper bound on a single backoff wait
const MAX_DELAY: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first; values below 1 still run once
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry_constants::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(retry_constants::INITIAL_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_delay_ms),
        )
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_factor(2.0)
            .with_max_delay(MAX_DELAY.max(self.initial_delay))
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Run `operation` until it succeeds, fails terminally, or runs out of attempts.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classified + fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    operation
        .retry(policy.backoff())
        .sleep(tokio::time::sleep)
        .when(|err: &E| err.failure_class().is_transient())
        .notify(|err: &E, delay: Duration| {
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                class = %err.failure_class(),
                error = %err,
                "Transient model failure, retrying"
            );
            attempt += 1;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FailureClass, RemoteError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn quota() -> RemoteError {
        RemoteError::new("Resource has been exhausted (e.g. check quota).")
            .with_status(429)
            .with_code("RESOURCE_EXHAUSTED")
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(2000))
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_from_transient_failures() {
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<&str, RemoteError> = retry(&policy(), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(quota())
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_runs_once() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let start = Instant::now();

        let result: Result<(), RemoteError> = retry(&policy(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::new("API key not valid").with_status(400))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "API key not valid");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_double_without_trailing_wait() {
        let attempts = Mutex::new(Vec::new());
        let attempts = &attempts;
        let start = Instant::now();

        let result: Result<(), RemoteError> = retry(&policy(), move || async move {
            attempts.lock().unwrap().push(start.elapsed());
            Err(quota())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.failure_class(), FailureClass::RateLimit);

        let attempts = attempts.lock().unwrap().clone();
        assert_eq!(
            attempts,
            vec![
                Duration::ZERO,
                Duration::from_millis(2000),
                Duration::from_millis(6000),
            ]
        );
        // Returned right after the third attempt
        assert_eq!(start.elapsed(), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_is_retried() {
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<u8, RemoteError> = retry(&policy(), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RemoteError::new("The model is overloaded").with_status(503))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policies() {
        for max_attempts in [0, 1] {
            let calls = AtomicU32::new(0);
            let calls = &calls;
            let policy = RetryPolicy::new(max_attempts, Duration::from_millis(2000));

            let result: Result<(), RemoteError> = retry(&policy, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(quota())
            })
            .await;

            assert!(result.is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 1, "max_attempts = {max_attempts}");
        }
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 250,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(250));
        assert_eq!(RetryPolicy::default().max_attempts, 3);
    }
}
