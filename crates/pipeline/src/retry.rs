//! Retry logic with exponential backoff for store write contention: a
//! contended write is retried with exponential backoff up to a fixed
//! attempt limit, and exhausting it aborts the batch rather than silently
//! dropping the write.
//!
//! Every `index::Store` write transaction in this engine already runs on a
//! single thread, so contention here means another process holds
//! the writer lock on the same `redb` file, not a race within this run.

use std::thread;
use std::time::Duration;

/// Configuration for retrying a single store write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Run `op` until it succeeds or `config.max_retries` extra attempts have
/// all failed, sleeping with jittered exponential backoff between tries.
/// Returns the last error once attempts are exhausted.
pub fn with_retry<T, E>(config: &RetryConfig, mut op: impl FnMut() -> Result<T, E>) -> Result<T, E> {
    let mut attempt = 0u32;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= config.max_retries {
                    return Err(err);
                }
                thread::sleep(backoff_delay(config, attempt));
                attempt += 1;
            }
        }
    }
}

fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.base_delay.as_millis() as u64;
    let exponential = base.saturating_mul(1u64 << attempt.min(16));
    let capped = exponential.min(config.max_delay.as_millis() as u64);
    let jitter = fastrand::u64(0..=capped / 2 + 1);
    Duration::from_millis(capped + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn succeeds_without_retrying_when_the_first_attempt_works() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };
        let calls = Cell::new(0);
        let result: Result<&str, &str> = with_retry(&config, || {
            calls.set(calls.get() + 1);
            Ok("ok")
        });
        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retries_up_to_the_configured_limit_then_returns_the_last_error() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };
        let calls = Cell::new(0);
        let result: Result<&str, &str> = with_retry(&config, || {
            calls.set(calls.get() + 1);
            Err("locked")
        });
        assert_eq!(result, Err("locked"));
        // Initial attempt plus 3 retries.
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn recovers_after_a_transient_failure() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };
        let calls = Cell::new(0);
        let result: Result<&str, &str> = with_retry(&config, || {
            let n = calls.get() + 1;
            calls.set(n);
            if n < 3 {
                Err("locked")
            } else {
                Ok("ok")
            }
        });
        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.get(), 3);
    }
}
