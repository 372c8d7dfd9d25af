//! Retry policy with exponential backoff.

use std::time::Duration;

use crate::config::NetworkConfig;
use crate::error::NetworkError;

/// Decides whether a failed attempt is retryable and computes backoff delays.
///
/// Retryable classifications are connection failures, timeouts, and server
/// errors from the retryable status set. Client errors (4xx) are never
/// retried; 401 handling belongs to the authentication interceptor, not the
/// retry path.
///
/// The attempt budget is `max_retries + 1` total attempts. Replay of the same
/// descriptor is safe because descriptors are side-effect free; callers
/// issuing non-idempotent writes against servers without idempotency keys
/// should set `max_retries` to 0.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Server status codes considered transient.
    retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            retryable_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given retry budget and base delay.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Derive a policy from a [`NetworkConfig`].
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay)
    }

    /// Set the backoff multiplier.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Replace the set of retryable server status codes.
    pub fn retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Whether the attempt with the given 0-based index should be retried
    /// after failing with `error`.
    pub fn should_retry(&self, attempt: u32, error: &NetworkError) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        match error {
            NetworkError::NetworkUnavailable | NetworkError::Timeout(_) => true,
            NetworkError::HttpStatus { status, .. } => self.retryable_statuses.contains(status),
            NetworkError::Serialization(_) | NetworkError::Unknown(_) => false,
        }
    }

    /// The backoff delay before retrying the attempt with the given 0-based
    /// index: `base_delay * backoff_multiplier ^ attempt`. No jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .mul_f64(self.backoff_multiplier.powi(attempt as i32))
    }
}
