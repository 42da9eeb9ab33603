//! Emission Aggregator Library
//!
//! Fetches per-country carbon figures one country at a time from a
//! rate-limited API, merges them into a `year -> country -> carbon` aggregate
//! and keeps the last complete aggregate in memory.

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod sequencer;
pub mod server;
pub mod source;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use aggregate::{merge, per_year};
pub use cache::ResultCache;
pub use config::{ApiConfig, BackoffConfig};
pub use data::{Country, CountryCode, CountryYearRecord, EmissionByYear, Year};
pub use sequencer::{CountrySequencer, Delay, FetchError, TokioDelay};
pub use source::{CountryDataSource, FootprintClient, SourceError};
pub use workflow::{EmissionResponse, EmissionWorkflow, ResponseSource, WorkflowError};
