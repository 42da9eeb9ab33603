//! Countries emission workflow
//!
//! Serves the merged aggregate from cache when possible. Otherwise it lists
//! countries, drives the sequencer over them, folds every dataset into an
//! accumulator and commits the result to the cache only after the whole pass
//! succeeded. Any failure clears the cache.

use std::pin::pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::aggregate::{merge, per_year};
use crate::cache::{CachedAggregate, ResultCache};
use crate::config::BackoffConfig;
use crate::data::EmissionByYear;
use crate::sequencer::{CountrySequencer, Delay, FetchError};
use crate::source::{CountryDataSource, SourceError};

/// Message reported to callers for every failed pass
pub const FAILURE_MESSAGE: &str = "Failed to process countries emission data.";

/// Errors that abort a workflow pass
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The country list could not be fetched
    #[error("Failed to fetch countries: {0}")]
    Countries(#[source] SourceError),

    /// The per-country fetch sequence failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Where a response's aggregate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Fresh,
}

/// Successful workflow result
#[derive(Debug, Clone)]
pub struct EmissionResponse {
    pub data: Arc<EmissionByYear>,
    pub source: ResponseSource,
    /// When the aggregate was cached; `None` for an uncached empty result
    pub cached_at: Option<DateTime<Utc>>,
}

impl EmissionResponse {
    fn from_cache(cached: CachedAggregate, source: ResponseSource) -> Self {
        Self {
            data: cached.data,
            source,
            cached_at: Some(cached.cached_at),
        }
    }
}

/// Orchestrates source, sequencer, aggregator and cache
pub struct EmissionWorkflow<S, D> {
    source: S,
    delay: D,
    cache: Arc<ResultCache>,
    backoff: BackoffConfig,
    // Serializes cache misses so concurrent callers share one upstream pass
    refresh: Mutex<()>,
}

impl<S, D> EmissionWorkflow<S, D>
where
    S: CountryDataSource,
    D: Delay,
{
    pub fn new(source: S, delay: D, cache: Arc<ResultCache>, backoff: BackoffConfig) -> Self {
        Self {
            source,
            delay,
            cache,
            backoff,
            refresh: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Returns the aggregate, computing it on a cache miss
    ///
    /// On failure the cache is cleared and the cause is logged before the
    /// error is returned.
    pub async fn run(&self) -> Result<EmissionResponse, WorkflowError> {
        if let Some(cached) = self.cache.get() {
            debug!(cached_at = %cached.cached_at, "Serving cached emission data");
            return Ok(EmissionResponse::from_cache(cached, ResponseSource::Cache));
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have filled the cache while we waited
        if let Some(cached) = self.cache.get() {
            debug!(cached_at = %cached.cached_at, "Serving emission data computed by a concurrent request");
            return Ok(EmissionResponse::from_cache(cached, ResponseSource::Cache));
        }

        match self.compute().await {
            Ok(aggregate) => {
                info!(years = aggregate.len(), "Countries emission data computed");
                match self.cache.set(aggregate) {
                    Some(cached) => Ok(EmissionResponse::from_cache(cached, ResponseSource::Fresh)),
                    None => Ok(EmissionResponse {
                        data: Arc::new(EmissionByYear::new()),
                        source: ResponseSource::Fresh,
                        cached_at: None,
                    }),
                }
            }
            Err(err) => {
                error!(error = %err, "Countries emission workflow failed");
                self.cache.clear();
                Err(err)
            }
        }
    }

    /// Runs one full fetch-aggregate-merge pass without touching the cache
    pub async fn compute(&self) -> Result<EmissionByYear, WorkflowError> {
        let countries = self
            .source
            .list_countries()
            .await
            .map_err(WorkflowError::Countries)?;
        info!(countries = countries.len(), "Fetching emission data");

        let sequencer = CountrySequencer::new(&self.source, &self.delay, countries, self.backoff);
        let mut datasets = pin!(sequencer.into_stream());

        let mut accumulator: Option<EmissionByYear> = None;
        while let Some(records) = datasets.try_next().await? {
            let emission = per_year(&records);
            accumulator = Some(match accumulator {
                None => emission,
                Some(merged) => merge(merged, emission),
            });
        }

        Ok(accumulator.unwrap_or_default())
    }
}
