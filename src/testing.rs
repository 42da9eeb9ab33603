//! Test doubles shared by the unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::data::{Country, CountryCode, CountryYearRecord, Year};
use crate::sequencer::Delay;
use crate::source::{CountryDataSource, SourceError};

/// Data source answering from in-memory fixtures
///
/// Queued failure statuses for a country are returned, one per call, before
/// its records are served.
#[derive(Default)]
pub struct ScriptedSource {
    countries: Vec<Country>,
    countries_status: Option<u16>,
    records: HashMap<String, Vec<CountryYearRecord>>,
    failures: Mutex<HashMap<String, VecDeque<u16>>>,
    calls: Mutex<Vec<String>>,
    list_calls: Mutex<usize>,
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

    pub fn with_failing_country_list(mut self, status: u16) -> Self {
        self.countries_status = Some(status);
        self
    }

    /// Country codes requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl CountryDataSource for ScriptedSource {
    async fn list_countries(&self) -> Result<Vec<Country>, SourceError> {
        *self.list_calls.lock().unwrap() += 1;
        match self.countries_status {
            Some(status) => Err(SourceError::from_status(status)),
            None => Ok(self.countries.clone()),
        }
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
        if let Some(status) = failure {
            return Err(SourceError::from_status(status));
        }

        Ok(self.records.get(code.as_str()).cloned().unwrap_or_default())
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

pub fn falkland_islands() -> Vec<CountryYearRecord> {
    vec![
        record("65", "Falkland Islands", 1961, 22.8426359858333),
        record("65", "Falkland Islands", 1962, 6.77675073094722),
    ]
}

pub fn gibraltar() -> Vec<CountryYearRecord> {
    vec![
        record("82", "Gibraltar", 1961, 0.681602553794869),
        record("82", "Gibraltar", 1962, 0.694619424088622),
    ]
}

pub fn kiribati() -> Vec<CountryYearRecord> {
    vec![
        record("83", "Kiribati", 1961, 0.0858498666712685),
        record("83", "Kiribati", 1962, 0.105824795451294),
    ]
}
