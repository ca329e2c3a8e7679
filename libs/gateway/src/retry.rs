//! Bounded retry for idempotent reads
//!
//! Only reads (pool listing, pool detail, simulation) go through here. Intent
//! submissions are never retried at this layer.

use satswap_config::QuoteConfig;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::Transient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl ReadRetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &QuoteConfig) -> Self {
        Self::new(
            config.max_read_attempts,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
        )
    }

    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before retry number `retry` (0-based), doubling and capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry.min(10));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for ReadRetryPolicy {
    fn default() -> Self {
        Self::from_config(&QuoteConfig::default())
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out
pub async fn retry_read<T, E, F, Fut>(policy: &ReadRetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {:?}",
                    what, attempt, policy.max_attempts, err, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReadRetryPolicy::new(5, Duration::from_millis(50), Duration::from_millis(300));
        assert_eq!(policy.delay_for(0), Duration::from_millis(50));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
        assert_eq!(policy.delay_for(30), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = ReadRetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100));

        let result: Result<u32, GatewayError> = retry_read(&policy, "list pools", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(GatewayError::Network("reset".into()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_are_bounded() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = ReadRetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(100));

        let result: Result<(), GatewayError> = retry_read(&policy, "simulate", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Timeout { timeout_ms: 5 })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_fail_fast() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), GatewayError> =
            retry_read(&ReadRetryPolicy::default(), "get pool", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::NotFound("p9".into()))
            })
            .await;

        assert_eq!(result, Err(GatewayError::NotFound("p9".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
