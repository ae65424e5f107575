//! Retry policy for remote calls.
//!
//! Transient failures (timeouts, rate limits, 5xx) are retried with
//! exponential backoff up to a bounded attempt count. Permanent failures
//! (auth, permission, malformed requests) fail immediately.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::{RemoteError, RemoteResult};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Ceiling for the backoff duration.
    pub max_backoff: Duration,
    /// Multiplier applied per attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(16),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries. Used in tests.
    #[must_use]
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Backoff before retry number `attempt` (0-based).
    ///
    /// A rate-limit response carrying a server-suggested wait overrides the
    /// computed backoff.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32, last_error: &RemoteError) -> Duration {
        if let RemoteError::RateLimited { retry_after_secs: Some(secs) } = last_error {
            return Duration::from_secs(*secs).min(self.max_backoff);
        }
        let factor = self.backoff_multiplier.powi(attempt.min(16) as i32);
        let millis = (self.initial_backoff.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max_backoff)
    }

    /// Run `operation`, retrying transient errors per this policy.
    pub async fn run<F, Fut, T>(&self, what: &str, operation: F) -> RemoteResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let backoff = self.backoff_for(attempt, &e);
                    debug!(
                        what,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "transient remote error, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            backoff_multiplier: 2.0,
        };
        let err = RemoteError::Timeout(30);
        assert_eq!(config.backoff_for(0, &err), Duration::from_millis(100));
        assert_eq!(config.backoff_for(1, &err), Duration::from_millis(200));
        // Capped at max_backoff from here on
        assert_eq!(config.backoff_for(2, &err), Duration::from_millis(350));
        assert_eq!(config.backoff_for(8, &err), Duration::from_millis(350));
    }

    #[test]
    fn test_backoff_honors_retry_after() {
        let config = RetryConfig::default();
        let err = RemoteError::RateLimited { retry_after_secs: Some(3) };
        assert_eq!(config.backoff_for(0, &err), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let config = RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            backoff_multiplier: 2.0,
        };
        let calls = AtomicU32::new(0);

        let result: RemoteResult<&str> = config
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(RemoteError::Service("503".into()))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let config = RetryConfig::default();
        let calls = AtomicU32::new(0);

        let result: RemoteResult<()> = config
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::Auth("invalid token".into())) }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_exhaust_budget() {
        let config = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
            backoff_multiplier: 1.0,
        };
        let calls = AtomicU32::new(0);

        let result: RemoteResult<()> = config
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::Timeout(30)) }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Timeout(_))));
        // 1 initial try + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
