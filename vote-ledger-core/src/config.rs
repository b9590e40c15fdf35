//! Configuration types for the VoteLedger.
use std::time::Duration;

/// Configuration for the VoteLedger.
///
/// Controls how casts that hit storage contention are retried. Only lock
/// timeouts and serialization failures are retried; every other error is
/// surfaced immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,

    /// Delay before the first retry. Each further retry doubles it.
    pub retry_base_delay: Duration,

    /// Upper bound for a single retry delay.
    pub retry_max_delay: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_millis(10),
            retry_max_delay: Duration::from_millis(500),
        }
    }
}

impl LedgerConfig {
    /// Create a config that surfaces contention on the first failure.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Create a config with a custom retry budget.
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Maximum number of retries after the first attempt
    /// * `retry_base_delay` - Delay before the first retry
    pub fn with_retries(max_retries: usize, retry_base_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_base_delay,
            ..Self::default()
        }
    }
}
