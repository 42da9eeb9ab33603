//! Core data models for the emission aggregator
//!
//! This module contains the types shared by the data source, the fetch
//! sequencer and the aggregator: countries, their yearly records, and the
//! merged `year -> country -> carbon` aggregate.

pub mod year;

pub use year::{Year, NO_DATA};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Carbon value recorded for a country that has no data
pub const NO_DATA_CARBON: f64 = -1.0;

/// Opaque identifier used to query the data source for a country
///
/// The upstream country list reports codes as strings while per-country
/// records report them as integers, so both forms are accepted. Codes are
/// only ever compared and formatted, never used as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

struct CountryCodeVisitor;

impl<'de> Visitor<'de> for CountryCodeVisitor {
    type Value = CountryCode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a country code as string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CountryCode, E> {
        Ok(CountryCode::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<CountryCode, E> {
        Ok(CountryCode(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CountryCode, E> {
        Ok(CountryCode(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CountryCode, E> {
        Ok(CountryCode(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CountryCodeVisitor)
    }
}

/// A country known to the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Identifier used to request the country's records
    #[serde(rename = "countryCode")]
    pub code: CountryCode,
    /// Display name, also used as the key inside the aggregate
    #[serde(rename = "countryName")]
    pub name: String,
    /// Short display name, if the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// ISO 3166-1 alpha-2 code, if the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isoa2: Option<String>,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: CountryCode::new(code),
            name: name.into(),
            short_name: None,
            isoa2: None,
        }
    }
}

/// One year of metrics for a single country
///
/// The upstream payload carries many more land-use metrics; only the fields
/// the aggregate needs are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryYearRecord {
    pub country_code: CountryCode,
    pub country_name: String,
    pub year: Year,
    /// Carbon footprint figure for the year, `None` when the source reports `null`
    pub carbon: Option<f64>,
}

impl CountryYearRecord {
    /// Builds the placeholder record used when a country has no data
    pub fn no_data(country: &Country) -> Self {
        Self {
            country_code: country.code.clone(),
            country_name: country.name.clone(),
            year: Year::NoData,
            carbon: Some(NO_DATA_CARBON),
        }
    }
}

/// Carbon figures keyed by year, then by country name
///
/// A `null` figure from the source is kept and serialized back as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmissionByYear(BTreeMap<Year, BTreeMap<String, Option<f64>>>);

impl EmissionByYear {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the aggregate has no year keys at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct year keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the per-country figures for a year
    pub fn year(&self, year: Year) -> Option<&BTreeMap<String, Option<f64>>> {
        self.0.get(&year)
    }

    /// Returns the figure for one country in one year
    ///
    /// `None` both when the country is missing and when its figure is `null`;
    /// use [`EmissionByYear::contains`] to tell them apart.
    pub fn get(&self, year: Year, country: &str) -> Option<f64> {
        self.0
            .get(&year)
            .and_then(|countries| countries.get(country))
            .copied()
            .flatten()
    }

    /// Returns true when the country has an entry for the year, even a `null` one
    pub fn contains(&self, year: Year, country: &str) -> bool {
        self.0
            .get(&year)
            .is_some_and(|countries| countries.contains_key(country))
    }

    pub(crate) fn entry(&mut self, year: Year) -> &mut BTreeMap<String, Option<f64>> {
        self.0.entry(year).or_default()
    }

    pub(crate) fn into_inner(self) -> BTreeMap<Year, BTreeMap<String, Option<f64>>> {
        self.0
    }
}
