//! Country data sources
//!
//! A data source lists the known countries and returns yearly records for
//! one country at a time. The only production implementation talks to the
//! Global Footprint Network API; tests substitute scripted sources.

pub mod footprint;

pub use footprint::FootprintClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::data::{Country, CountryCode, CountryYearRecord};

/// HTTP status the upstream uses to signal rate limiting
pub const RATE_LIMIT_STATUS: u16 = 429;

/// Errors that can occur when querying a data source
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source asked us to slow down
    #[error("Rate limited by upstream (HTTP {status})")]
    RateLimited { status: u16 },

    /// The source answered with a non-success status other than 429
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16 },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SourceError {
    /// Maps a non-success HTTP status to the matching error kind
    pub fn from_status(status: u16) -> Self {
        if status == RATE_LIMIT_STATUS {
            SourceError::RateLimited { status }
        } else {
            SourceError::Status { status }
        }
    }

    /// Whether the failure is transient and worth retrying after a pause
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited { .. })
    }
}

/// Provider of countries and their yearly emission records
#[async_trait]
pub trait CountryDataSource: Send + Sync {
    /// Fetches every country the source knows about, in source order
    async fn list_countries(&self) -> Result<Vec<Country>, SourceError>;

    /// Fetches all yearly records for one country
    ///
    /// An empty vector means the source has no data for the country.
    async fn country_records(
        &self,
        code: &CountryCode,
    ) -> Result<Vec<CountryYearRecord>, SourceError>;
}
