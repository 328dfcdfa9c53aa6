//! Retry policy for reads rejected because of the session.
//!
//! Only auth failures are retried. The delay is fixed: no jitter and no
//! exponential growth, since a refreshed token either works or it doesn't.

use std::time::Duration;

use crate::errors::StoreError;

/// Maximum number of retries after the initial read.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay between a session refresh and the retried read.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries (not counting the initial read).
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Whether a read that failed with `error` at `retry_count` gets another try.
    pub fn should_retry(&self, error: &StoreError, retry_count: u32) -> bool {
        error.is_auth_failure() && retry_count < self.max_retries
    }
}
