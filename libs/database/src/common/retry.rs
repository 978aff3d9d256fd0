use std::collections::hash_map::RandomState;
use std::future::Future;
use std::hash::BuildHasher;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Retry policy for establishing connections at startup.
///
/// Request-path operations never go through this; it only guards the
/// initial connect so a service can start while its database is still
/// coming up.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,

    /// Growth factor applied after every retry
    pub backoff_multiplier: f64,

    /// Scale each delay by a random factor in [0.5, 1.0)
    pub use_jitter: bool,
}

impl RetryConfig {
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay schedule for this policy, one entry per retry
    pub fn backoff(&self) -> Backoff {
        Backoff {
            next_ms: self.initial_delay_ms,
            remaining: self.max_retries,
            config: self.clone(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Iterator over the delays of a [`RetryConfig`]. Ends once retries run out.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    remaining: u32,
    config: RetryConfig,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let base = self.next_ms.min(self.config.max_delay_ms);
        self.next_ms = ((self.next_ms as f64 * self.config.backoff_multiplier) as u64)
            .min(self.config.max_delay_ms);

        let delay = if self.config.use_jitter {
            apply_jitter(base)
        } else {
            base
        };
        Some(Duration::from_millis(delay))
    }
}

fn apply_jitter(delay: u64) -> u64 {
    let factor = (RandomState::new().hash_one(SystemTime::now()) % 50) as f64 / 100.0 + 0.5;
    (delay as f64 * factor) as u64
}

/// Run `operation` until it succeeds or the policy's retries are exhausted.
///
/// The last error is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delays = config.backoff();
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => match delays.next() {
                Some(delay) => {
                    debug!(
                        attempt,
                        max_retries = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Operation failed: {}. Retrying",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    warn!(attempt, "Operation failed, giving up: {}", e);
                    return Err(e);
                }
            },
        }
    }
}

/// [`retry_with_backoff`] with the default policy
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms,
            max_delay_ms,
            ..RetryConfig::default()
        }
        .without_jitter()
    }

    #[test]
    fn test_backoff_schedule_without_jitter() {
        let delays: Vec<u64> = policy(5, 100, 500)
            .backoff()
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn test_backoff_jitter_stays_within_bounds() {
        let config = RetryConfig {
            use_jitter: true,
            ..policy(20, 1000, 1000)
        };

        for delay in config.backoff() {
            let ms = delay.as_millis() as u64;
            assert!((500..=1000).contains(&ms));
        }
    }

    #[test]
    fn test_backoff_with_zero_retries_is_empty() {
        assert_eq!(policy(0, 100, 500).backoff().count(), 0);
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();

        let result = retry(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("connected")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();
        let config = policy(5, 5, 5000);

        let result = retry_with_backoff(
            || {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(format!("attempt {}", n + 1))
                    } else {
                        Ok("connected")
                    }
                }
            },
            config,
        )
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_last_error_when_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let calls = counter.clone();
        let config = policy(2, 5, 5000);

        let result = retry_with_backoff(
            || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("unreachable")
                }
            },
            config,
        )
        .await;

        assert_eq!(result.unwrap_err(), "unreachable");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
