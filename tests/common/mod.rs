//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use emission_aggregator::{
    Country, CountryCode, CountryDataSource, CountryYearRecord, Delay, SourceError, Year,
};

/// Data source answering from in-memory fixtures
///
/// Queued failure statuses for a country are returned, one per call, before
/// its records are served.
#[derive(Default)]
pub struct ScriptedSource {
    countries: Vec<Country>,
    records: HashMap<String, Vec<CountryYearRecord>>,
    failures: Mutex<HashMap<String, VecDeque<u16>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(countries: Vec<Country>) -> Self {
        Self {
            countries,
            ..Default::default()
        }
    }

    pub fn with_records(mut self, code: &str, records: Vec<CountryYearRecord>) -> Self {
        self.records.insert(code.to_string(), records);
        self
    }

    pub fn with_failures(mut self, code: &str, statuses: &[u16]) -> Self {
        self.failures
            .get_mut()
            .unwrap()
            .insert(code.to_string(), statuses.iter().copied().collect());
        self
    }

    /// Country codes requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CountryDataSource for ScriptedSource {
    async fn list_countries(&self) -> Result<Vec<Country>, SourceError> {
        Ok(self.countries.clone())
    }

    async fn country_records(
        &self,
        code: &CountryCode,
    ) -> Result<Vec<CountryYearRecord>, SourceError> {
        self.calls.lock().unwrap().push(code.to_string());
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(code.as_str())
            .and_then(|queue| queue.pop_front());
        match failure {
            Some(status) => Err(SourceError::from_status(status)),
            None => Ok(self.records.get(code.as_str()).cloned().unwrap_or_default()),
        }
    }
}

/// Delay that records each requested pause instead of sleeping
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn recorded(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

pub fn record(code: &str, name: &str, year: i32, carbon: f64) -> CountryYearRecord {
    CountryYearRecord {
        country_code: CountryCode::from(code),
        country_name: name.to_string(),
        year: Year::Value(year),
        carbon: Some(carbon),
    }
}

pub fn sample_countries() -> Vec<Country> {
    vec![
        Country::new("65", "Falkland Islands"),
        Country::new("82", "Gibraltar"),
        Country::new("83", "Kiribati"),
    ]
}

/// Source with two years of data for each of the three sample countries
pub fn three_country_source() -> ScriptedSource {
    ScriptedSource::new(sample_countries())
        .with_records(
            "65",
            vec![
                record("65", "Falkland Islands", 1961, 22.8426359858333),
                record("65", "Falkland Islands", 1962, 6.77675073094722),
            ],
        )
        .with_records(
            "82",
            vec![
                record("82", "Gibraltar", 1961, 0.681602553794869),
                record("82", "Gibraltar", 1962, 0.694619424088622),
            ],
        )
        .with_records(
            "83",
            vec![
                record("83", "Kiribati", 1961, 0.0858498666712685),
                record("83", "Kiribati", 1962, 0.105824795451294),
            ],
        )
}

/// Aggregate expected from `three_country_source`
pub fn expected_aggregate() -> serde_json::Value {
    serde_json::json!({
        "1961": {
            "Falkland Islands": 22.8426359858333,
            "Gibraltar": 0.681602553794869,
            "Kiribati": 0.0858498666712685
        },
        "1962": {
            "Falkland Islands": 6.77675073094722,
            "Gibraltar": 0.694619424088622,
            "Kiribati": 0.105824795451294
        }
    })
}
