//! # Retry Policy
//!
//! Exponential backoff for message sends. Attempt `n` (zero-based) that fails
//! transiently is followed by a pause of `base_delay × 2^n`, up to
//! `max_retries` retries. With the defaults that is 1 s, 2 s, 4 s and at most
//! four attempts in total.

use std::time::Duration;

use crate::client::error::ClientError;
use crate::shared::config::{AppConfig, DEFAULT_MAX_SEND_RETRIES, DEFAULT_RETRY_BASE_DELAY};

/// Upper bound for a single pause
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause after the first failed attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_SEND_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_send_retries, config.retry_base_delay)
    }

    /// No automatic retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Pause after failed attempt `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    /// Whether failed attempt `attempt` should be followed by another one
    pub fn should_retry(&self, attempt: u32, error: &ClientError) -> bool {
        error.is_transient() && attempt < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (0..3).map(|n| policy.delay_for(n)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_should_retry_bounds() {
        let policy = RetryPolicy::default();
        let transient = ClientError::timeout("slow");
        assert!(policy.should_retry(0, &transient));
        assert!(policy.should_retry(2, &transient));
        assert!(!policy.should_retry(3, &transient));
        assert!(!policy.should_retry(0, &ClientError::http(400, "bad")));
        assert!(!RetryPolicy::none().should_retry(0, &transient));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::new(40, Duration::from_secs(1));
        assert_eq!(policy.delay_for(31), MAX_BACKOFF);
        assert_eq!(policy.delay_for(40), MAX_BACKOFF);
    }
}
