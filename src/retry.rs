//! Task retry policy with exponential backoff.
//!
//! The orchestrator's `save` and `publish` tasks run under a [`RetryPolicy`].
//! The delay between attempts follows:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::config::RetryConfig;
use rand::{Rng, rng};
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first failure.
    pub max_retries: usize,
    /// Delay before the first retry; doubles on each further attempt.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// A single attempt, no retries.
    #[cfg(test)]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1) as u32)
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `task` until it succeeds or the retries are exhausted.
    pub async fn run<T, E, F, Fut>(&self, name: &str, mut task: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match task().await {
                Ok(value) => {
                    info!(
                        task = name,
                        attempts = attempt + 1,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        "Task succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64;

                    if attempt > self.max_retries {
                        error!(
                            task = name,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "Task exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.backoff(attempt) + Duration::from_millis(jitter_ms);
                    warn!(
                        task = name,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt,
                        ?delay,
                        error = %e,
                        "Task attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.retries,
            Duration::from_secs(config.delay_secs),
            Duration::from_secs(config.max_delay_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(5), Duration::from_secs(16));
        assert_eq!(policy.backoff(6), Duration::from_secs(30));
        assert_eq!(policy.backoff(64), Duration::from_secs(30));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig::default());
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.base_delay, Duration::from_secs(300));
        assert_eq!(policy.max_delay, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);

        let result: Result<&str, String> = policy
            .run("flaky", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(format!("attempt {n} failed"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(1, Duration::ZERO, Duration::ZERO);

        let result: Result<(), String> = policy
            .run("broken", || {
                calls.set(calls.get() + 1);
                async { Err("nope".to_string()) }
            })
            .await;

        assert_eq!(result, Err("nope".to_string()));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_none_runs_once() {
        let calls = Cell::new(0);
        let result: Result<(), String> = RetryPolicy::none()
            .run("once", || {
                calls.set(calls.get() + 1);
                async { Err("fail".to_string()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
