//! Retry with exponential backoff.
//!
//! A generic retrying invoker applied uniformly to each network call, so
//! retry policy never leaks into business logic. Rate-limit responses wait
//! for the server-supplied duration; terminal errors (authentication,
//! malformed responses) are surfaced immediately.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::RegistryError;

/// Configuration for automatic retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub base_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,

    /// Upper bound for any single backoff wait.
    pub max_backoff: Duration,

    /// Jitter factor (0.1 = ±10%).
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_backoff: Duration::from_secs(60),
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries; useful in tests.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff delay for a given attempt (1-based), with jitter applied.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let unjittered = (self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent))
            .min(self.max_backoff.as_secs_f64());

        let jitter = if self.jitter > 0.0 {
            rand::thread_rng().gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };

        Duration::from_secs_f64((unjittered * (1.0 + jitter)).max(0.0))
    }
}

/// Invokes `operation` until it succeeds, the error is terminal, or the
/// attempt budget runs out.
///
/// A [`RegistryError::RateLimited`] failure sleeps for the server-supplied
/// duration instead of the exponential delay. Non-retryable errors are
/// returned immediately.
///
/// # Errors
///
/// Returns the last error once all attempts are exhausted.
pub async fn retry<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T, RegistryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RegistryError>>,
{
    let mut last_error = None;

    for attempt in 1..=config.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_retryable() => return Err(error),
            Err(RegistryError::RateLimited { retry_after }) => {
                tracing::warn!(
                    operation = label,
                    attempt,
                    wait = ?retry_after,
                    "Rate limited, honoring server-supplied wait"
                );
                tokio::time::sleep(retry_after).await;
                last_error = Some(RegistryError::RateLimited { retry_after });
            }
            Err(error) => {
                tracing::warn!(
                    operation = label,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %error,
                    "Request failed"
                );
                if attempt < config.max_attempts {
                    let delay = config.delay_for_attempt(attempt);
                    tracing::debug!(operation = label, wait = ?delay, "Backing off before retry");
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or(RegistryError::Http {
        status: 0,
        message: format!("{label}: retry budget exhausted"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn flaky_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
            max_backoff: Duration::from_millis(10),
            jitter: 0.0,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry(&flaky_config(), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, RegistryError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result = retry(&flaky_config(), "op", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(RegistryError::Http {
                        status: 503,
                        message: "unavailable".to_string(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(&flaky_config(), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(RegistryError::AuthenticationFailed {
                    message: "nope".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(RegistryError::AuthenticationFailed { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_error() {
        let result: Result<(), _> = retry(&flaky_config(), "op", || async {
            Err(RegistryError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(RegistryError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_rate_limit_waits_server_duration() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result = retry(&flaky_config(), "op", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(RegistryError::RateLimited {
                        retry_after: Duration::from_millis(20),
                    })
                } else {
                    Ok(1)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_delay_growth_is_bounded() {
        let config = RetryConfig {
            jitter: 0.0,
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(20), Duration::from_secs(60));
    }
}
