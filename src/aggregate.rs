//! Emission aggregation
//!
//! Turns one country's yearly records into a `year -> {country -> carbon}`
//! map and merges such maps across countries. Both functions are pure; the
//! workflow folds them over the fetch sequence.

use crate::data::{CountryYearRecord, EmissionByYear};

/// Builds the per-year map for a single country's records
///
/// All records are attributed to the country name of the first record. When
/// several records share a year, the first one wins, even if its figure is
/// `null`.
pub fn per_year(records: &[CountryYearRecord]) -> EmissionByYear {
    let mut emission = EmissionByYear::new();
    let Some(first) = records.first() else {
        return emission;
    };
    let country_name = &first.country_name;

    for record in records {
        emission
            .entry(record.year)
            .entry(country_name.clone())
            .or_insert(record.carbon);
    }
    emission
}

/// Merges two aggregates year by year
///
/// Year keys are unioned. Within a year, `addition` overrides `base` for the
/// same country name.
pub fn merge(base: EmissionByYear, addition: EmissionByYear) -> EmissionByYear {
    let mut merged = base;
    for (year, countries) in addition.into_inner() {
        merged.entry(year).extend(countries);
    }
    merged
}
