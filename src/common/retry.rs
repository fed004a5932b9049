//! Bounded retry with exponential backoff for transient failures

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::errors::{MonitorError, Result};

/// Retry schedule: `max_attempts` tries, waiting `base_delay * 2^(n-1)` after try `n`
///
/// No single wait exceeds `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(60),
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Backoff for `error`, stretched to its `Retry-After` hint up to `max_delay`
    pub fn wait_for(&self, attempt: u32, error: &MonitorError) -> Duration {
        let delay = self.delay_after(attempt);
        match error {
            MonitorError::RateLimit {
                retry_after_seconds: Some(secs),
                ..
            } => delay.max(Duration::from_secs(*secs)).min(self.max_delay),
            _ => delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
///
/// Rate-limit errors carrying a `Retry-After` hint wait that long, capped at
/// the policy's `max_delay`.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.wait_for(attempt, &e);
                warn!(
                    operation = label,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_retry_after_is_honoured_but_capped() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(60));
        let limited = |secs| MonitorError::RateLimit {
            message: "banned".to_string(),
            retry_after_seconds: Some(secs),
        };

        assert_eq!(policy.wait_for(1, &limited(7)), Duration::from_secs(7));
        // 418 bans can announce days
        assert_eq!(policy.wait_for(1, &limited(86_400)), Duration::from_secs(60));
        assert_eq!(
            policy.wait_for(1, &MonitorError::Timeout("slow".to_string())),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_backoff_never_exceeds_max_delay() {
        let policy = RetryPolicy::new(20, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30));
        assert_eq!(policy.delay_after(5), Duration::from_secs(16));
        assert_eq!(policy.delay_after(6), Duration::from_secs(30));
        assert_eq!(policy.delay_after(17), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(fast_policy(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(MonitorError::Timeout("slow".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(fast_policy(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(MonitorError::Server { status: 503, body: String::new() }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(fast_policy(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(MonitorError::InvalidResponse("bad".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(MonitorError::InvalidResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
