//! An injected retry strategy: `get_delay(attempt)` and
//! `should_retry(attempt, max, error)`. The default implementation is
//! exponential-base-times-2^n with jitter and a cap, all configurable.

use rand::Rng;
use std::time::Duration;
use visibility_adapter::AdapterError;

/// The retry policy a [`crate::pool::JobExecutor`] consults after a failed
/// attempt.
pub trait RetryStrategy: Send + Sync {
    /// The delay to wait before the next attempt.
    fn get_delay(&self, attempt: u32) -> Duration;

    /// Whether another attempt should be made.
    fn should_retry(&self, attempt: u32, max_attempts: u32, error: Option<&AdapterError>) -> bool {
        if attempt >= max_attempts {
            return false;
        }
        match error {
            Some(error) => error.retryable,
            None => true,
        }
    }
}

/// Exponential backoff with jitter (`spec.md` §4.3: "exponential base ×
/// 2^(attempt−1) with ±20% jitter, capped at maxRetryDelayMs").
pub struct ExponentialBackoff {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn get_delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let exponent = attempt.saturating_sub(1).min(20);
        let unjittered = self.base_delay * 2u32.saturating_pow(exponent);
        let capped = unjittered.min(self.max_delay);

        let jitter_fraction = rand::thread_rng().gen_range(-0.2..=0.2);
        let jittered_ms = (capped.as_millis() as f64) * (1.0 + jitter_fraction);
        Duration::from_millis(jittered_ms.max(0.0) as u64)
    }
}
