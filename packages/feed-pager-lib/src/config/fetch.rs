use crate::defaults;
use serde::Deserialize;

/// Page fetch retry configuration.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first failed attempt.
    pub retry_attempts: usize,

    /// Delay before the first retry; doubled on every further retry.
    pub initial_retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_attempts: defaults::FETCH_RETRY_ATTEMPTS,
            initial_retry_delay_ms: defaults::INITIAL_RETRY_DELAY_MS,
        }
    }
}
