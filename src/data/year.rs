//! Year keys for emission records
//!
//! The upstream API reports years as integers. Countries without any records
//! get a synthetic entry keyed by the `nodata` sentinel instead.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Token used for the no-data sentinel in JSON
pub const NO_DATA: &str = "nodata";

/// A record year, or the marker for a country with no usable records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Year {
    /// A calendar year reported by the source
    Value(i32),
    /// No records were available for the country
    NoData,
}

impl Year {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Year::NoData)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Value(year) => write!(f, "{}", year),
            Year::NoData => f.write_str(NO_DATA),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // serde_json turns integer map keys into quoted strings on its own
        match self {
            Year::Value(year) => serializer.serialize_i32(*year),
            Year::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

struct YearVisitor;

impl<'de> Visitor<'de> for YearVisitor {
    type Value = Year;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an integer year or \"{}\"", NO_DATA)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Year, E> {
        i32::try_from(v)
            .map(Year::Value)
            .map_err(|_| E::custom(format!("year out of range: {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Year, E> {
        i32::try_from(v)
            .map(Year::Value)
            .map_err(|_| E::custom(format!("year out of range: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Year, E> {
        if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
            Ok(Year::Value(v as i32))
        } else {
            Err(E::custom(format!("not a whole year: {}", v)))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Year, E> {
        if v == NO_DATA {
            return Ok(Year::NoData);
        }
        v.trim()
            .parse::<i32>()
            .map(Year::Value)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(YearVisitor)
    }
}
