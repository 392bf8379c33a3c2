//! Explicit retry policy for upstream dispatch attempts.
//!
//! The policy is plain data consulted by the gateway's dispatch loop: how
//! many attempts are allowed in total and how long to back off between them.
//! Backoff grows exponentially from `initial_delay_ms` by `multiplier`,
//! capped at `max_delay_ms`.
use std::time::Duration;

use crate::config::models::RetryConfig;

/// Retry policy for a single logical call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of dispatch attempts (1 = no retry).
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Multiplier applied per retry.
    pub multiplier: f64,
    /// Upper bound on any single backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 10000,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay_ms: config.initial_delay_ms,
            multiplier: config.multiplier,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt may follow the given 1-based attempt number.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff delay after the given 1-based attempt number.
    ///
    /// Attempt 1 waits `initial_delay_ms`, attempt 2 waits
    /// `initial_delay_ms * multiplier`, and so on, capped at `max_delay_ms`.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
        let delay = (self.initial_delay_ms as f64) * self.multiplier.powi(exponent as i32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay_ms = delay as u64;
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}
