//! Bounded retry for delivery attempts

use std::future::Future;

use contracts::{BackoffConfig, ContractError};
use tracing::warn;

use crate::error::DispatcherError;

/// Retry policy of a worker
///
/// A delivery is attempted at most `1 + retry_attempt` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    retry_attempt: u32,
    backoff: BackoffConfig,
}

/// All attempts failed
#[derive(Debug)]
pub struct RetryExhausted {
    /// Attempts made
    pub attempts: u32,
    /// Error of the last attempt
    pub source: ContractError,
}

impl RetryExhausted {
    /// Convert into a dispatcher error, recording how many payloads were lost
    pub fn into_error(self, backend: impl Into<String>, dropped: usize) -> DispatcherError {
        DispatcherError::DeliveryExhausted {
            backend: backend.into(),
            attempts: self.attempts,
            dropped,
            source: self.source,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(retry_attempt: u32, backoff: BackoffConfig) -> Self {
        Self {
            retry_attempt,
            backoff,
        }
    }

    /// Upper bound on attempts
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempt.saturating_add(1)
    }

    /// Run `op` until it succeeds or the attempts are used up
    pub async fn run<T, F, Fut>(&self, backend: &str, mut op: F) -> Result<T, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ContractError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts() => {
                    warn!(
                        backend = %backend,
                        attempt,
                        max_attempts = self.max_attempts(),
                        error = %e,
                        "Delivery attempt failed, retrying"
                    );
                    observability::record_retry(backend);

                    let delay = self.backoff.delay_for(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(source) => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn failing_until(calls: &AtomicU32, succeed_on: u32) -> Result<u32, ContractError> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= succeed_on {
            Ok(n)
        } else {
            Err(ContractError::transport_send("mock", "unavailable"))
        }
    }

    #[tokio::test]
    async fn test_succeeds_within_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, BackoffConfig::None);

        let result = policy
            .run("mock", move || async move { failing_until(calls, 3) })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_after_retry_attempt_plus_one() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(2, BackoffConfig::None);

        let err = policy
            .run("mock", move || async move { failing_until(calls, 100) })
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(matches!(
            err.into_error("mock", 4),
            DispatcherError::DeliveryExhausted { dropped: 4, attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::default();

        assert!(policy
            .run("mock", move || async move { failing_until(calls, 2) })
            .await
            .is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fixed_backoff_waits_between_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(2, BackoffConfig::Fixed { delay_ms: 20 });

        let started = tokio::time::Instant::now();
        let _ = policy
            .run("mock", move || async move { failing_until(calls, 100) })
            .await;

        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
