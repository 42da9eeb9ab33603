//! Runtime configuration for the fetch pipeline
//!
//! Values normally come from the CLI or the environment (see `cli`), but
//! every struct here can be built directly for tests and embedding.

use std::time::Duration;

use crate::source::footprint::DEFAULT_BASE_URL;

/// Default initial delay before retrying a rate-limited request
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Default ceiling for the retry delay
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Growth applied to the delay after every rate-limited attempt
pub const BACKOFF_FACTOR: f64 = 1.5;

/// Backoff settings for rate-limited requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay applied on the first retry and restored after each success
    pub base_delay: Duration,
    /// Once the delay has grown to this value, the next 429 aborts the pass
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::from_millis(DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }
}

impl BackoffConfig {
    pub fn from_millis(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Computes the delay to use after `current` failed to clear the limit
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(BACKOFF_FACTOR).min(self.max_delay)
    }

    /// Whether `current` has already grown to the ceiling
    pub fn is_exhausted(&self, current: Duration) -> bool {
        current >= self.max_delay
    }
}

/// Connection settings for the Global Footprint Network API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as the basic-auth password when present
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}
