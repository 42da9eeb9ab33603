//! Sequential per-country fetching with rate-limit backoff
//!
//! The upstream API only tolerates one request at a time, so countries are
//! fetched strictly in order and a new request is only made when the consumer
//! pulls the next dataset. Rate-limited requests are retried for the same
//! country after an exponentially growing pause; any other failure ends the
//! sequence.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::BackoffConfig;
use crate::data::{Country, CountryCode, CountryYearRecord};
use crate::source::{CountryDataSource, SourceError};

/// Fatal errors that end a fetch sequence
#[derive(Debug, Error)]
pub enum FetchError {
    /// Still rate limited after the delay grew to its ceiling
    #[error("Max request delay was reached ({}ms)", .delay.as_millis())]
    MaxDelayReached { delay: Duration },

    /// A request failed for a reason other than rate limiting
    #[error("Can't get countries data: {country} ({code}): {source}")]
    CannotFetch {
        country: String,
        code: CountryCode,
        #[source]
        source: SourceError,
    },
}

/// Pause between retries
///
/// Injected so tests can observe the requested delays without sleeping.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Delay backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Ready to request the current country
    Fetching,
    /// Rate limited; pause for the given delay, then fetch the same country
    Backoff(Duration),
    /// Every country has been yielded
    Done,
    /// A fatal error was returned; nothing more will be produced
    Failed,
}

/// Lazy, pull-driven sequence of per-country datasets
///
/// Each call to [`CountrySequencer::next`] performs at most one successful
/// fetch. The backoff delay is local to one traversal and goes back to the
/// base delay after every success.
pub struct CountrySequencer<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    delay: &'a D,
    countries: Vec<Country>,
    index: usize,
    config: BackoffConfig,
    current_delay: Duration,
    state: State,
    retries: u32,
}

impl<'a, S, D> CountrySequencer<'a, S, D>
where
    S: CountryDataSource + ?Sized,
    D: Delay + ?Sized,
{
    pub fn new(source: &'a S, delay: &'a D, countries: Vec<Country>, config: BackoffConfig) -> Self {
        Self {
            source,
            delay,
            countries,
            index: 0,
            config,
            current_delay: config.base_delay,
            state: State::Fetching,
            retries: 0,
        }
    }

    /// Number of countries already yielded
    pub fn position(&self) -> usize {
        self.index
    }

    /// Total rate-limit retries performed so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Fetches the next country's records
    ///
    /// Returns `Ok(None)` once all countries were yielded, and also for every
    /// call after an error was returned.
    pub async fn next(&mut self) -> Result<Option<Vec<CountryYearRecord>>, FetchError> {
        loop {
            match self.state {
                State::Done | State::Failed => return Ok(None),
                State::Backoff(wait) => {
                    self.delay.wait(wait).await;
                    self.current_delay = self.config.next_delay(wait);
                    self.retries += 1;
                    self.state = State::Fetching;
                }
                State::Fetching => {
                    let Some(country) = self.countries.get(self.index) else {
                        self.state = State::Done;
                        return Ok(None);
                    };

                    match self.source.country_records(&country.code).await {
                        Ok(records) => {
                            let records = if records.is_empty() {
                                warn!(
                                    country = %country.name,
                                    code = %country.code,
                                    "No data for country"
                                );
                                vec![CountryYearRecord::no_data(country)]
                            } else {
                                records
                            };

                            debug!(
                                country = %country.name,
                                records = records.len(),
                                "Fetched country data"
                            );
                            self.index += 1;
                            self.current_delay = self.config.base_delay;
                            return Ok(Some(records));
                        }
                        Err(err) if err.is_rate_limited() => {
                            if self.config.is_exhausted(self.current_delay) {
                                error!(
                                    country = %country.name,
                                    code = %country.code,
                                    delay = ?self.current_delay,
                                    "Max request delay reached"
                                );
                                self.state = State::Failed;
                                return Err(FetchError::MaxDelayReached {
                                    delay: self.current_delay,
                                });
                            }

                            warn!(
                                country = %country.name,
                                code = %country.code,
                                "Rate limited, waiting {:.1}sec before next request",
                                self.current_delay.as_secs_f64()
                            );
                            self.state = State::Backoff(self.current_delay);
                        }
                        Err(err) => {
                            error!(
                                country = %country.name,
                                code = %country.code,
                                error = %err,
                                "Error fetching data for country"
                            );
                            self.state = State::Failed;
                            return Err(FetchError::CannotFetch {
                                country: country.name.clone(),
                                code: country.code.clone(),
                                source: err,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Adapts the sequencer into a `Stream` of per-country datasets
    ///
    /// The stream ends after yielding the first error.
    pub fn into_stream(
        self,
    ) -> impl Stream<Item = Result<Vec<CountryYearRecord>, FetchError>> + Send + 'a
    where
        S: 'a,
        D: 'a,
    {
        stream::unfold(self, |mut sequencer| async move {
            match sequencer.next().await {
                Ok(Some(records)) => Some((Ok(records), sequencer)),
                Ok(None) => None,
                Err(err) => Some((Err(err), sequencer)),
            }
        })
    }
}
