//! Global Footprint Network API client
//!
//! Fetches the country list and per-country ecological footprint data, and
//! maps HTTP failures onto `SourceError` so the sequencer can tell rate
//! limiting apart from everything else.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{CountryDataSource, SourceError};
use crate::data::{Country, CountryCode, CountryYearRecord};

/// Base URL for the Global Footprint Network API
pub const DEFAULT_BASE_URL: &str = "https://api.footprintnetwork.org/v1";

/// The API ignores the username and authenticates on the key alone
const AUTH_USERNAME: &str = "any-user-name";

/// Footprint dataset holding the per-capita carbon figures
const DATASET: &str = "all/EFCpc";

/// Client for the Global Footprint Network API
#[derive(Debug, Clone)]
pub struct FootprintClient {
    http_client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
    api_key: Option<String>,
}

impl Default for FootprintClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FootprintClient {
    /// Create a new client against the public API without credentials
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key sent as the basic-auth password
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn countries_url(&self) -> String {
        format!("{}/countries", self.base_url)
    }

    fn country_data_url(&self, code: &CountryCode) -> String {
        format!("{}/data/{}/{}", self.base_url, code, DATASET)
    }

    /// Performs an authenticated GET and decodes the JSON body
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!(url, "GET");

        let mut request = self.http_client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.basic_auth(AUTH_USERNAME, Some(key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(status.as_u16()));
        }

        let text = response.text().await?;
        parse_body(&text)
    }
}

/// Decodes a response body, treating `null` as an empty list
///
/// The API answers `null` rather than `[]` for some countries without data.
fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, SourceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(serde_json::from_str("[]")?);
    }
    Ok(serde_json::from_str(trimmed)?)
}

#[async_trait]
impl CountryDataSource for FootprintClient {
    async fn list_countries(&self) -> Result<Vec<Country>, SourceError> {
        self.get(&self.countries_url()).await
    }

    async fn country_records(
        &self,
        code: &CountryCode,
    ) -> Result<Vec<CountryYearRecord>, SourceError> {
        self.get(&self.country_data_url(code)).await
    }
}
