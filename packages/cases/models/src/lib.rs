#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Case-count, coordinate, and report row types.
//!
//! These types flow through every stage of the pipeline: scraped text rows
//! ([`ScrapedRow`]) are normalized into [`CaseRecord`]s, joined with
//! [`CountryCoordinate`]s into [`ReportRow`]s, and summed into
//! [`WorldTotals`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A country's reference position from the static coordinate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCoordinate {
    /// Country name, the join key against scraped case data.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A country name taken from an anchor in a table header cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCountryRow {
    /// Trimmed anchor text.
    pub name: String,
}

/// Case figures exactly as scraped, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCaseRow {
    /// Confirmed cases text (e.g. `"1,234"`).
    pub cases: String,
    /// Deaths text.
    pub deaths: String,
    /// Recovered text (may be a placeholder such as `"No data"`).
    pub recovered: String,
}

/// A country name paired with its raw figures, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRow {
    /// Country name as it appears on the page.
    pub country: String,
    /// Unnormalized figures for that country.
    pub figures: RawCaseRow,
}

impl ScrapedRow {
    /// Builds a row from a name and the three figure strings.
    #[must_use]
    pub fn new(country: &str, cases: &str, deaths: &str, recovered: &str) -> Self {
        Self {
            country: country.to_owned(),
            figures: RawCaseRow {
                cases: cases.to_owned(),
                deaths: deaths.to_owned(),
                recovered: recovered.to_owned(),
            },
        }
    }

    /// Returns the raw text of the given field.
    #[must_use]
    pub fn raw(&self, field: CaseField) -> &str {
        match field {
            CaseField::Cases => &self.figures.cases,
            CaseField::Deaths => &self.figures.deaths,
            CaseField::Recovered => &self.figures.recovered,
        }
    }
}

/// Normalized case counts for a single country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    /// Country name as it appears on the page.
    pub country: String,
    /// Confirmed cases.
    pub cases: u64,
    /// Deaths.
    pub deaths: u64,
    /// Recoveries.
    pub recovered: u64,
}

impl CaseRecord {
    /// Returns the count for the given field.
    #[must_use]
    pub const fn value(&self, field: CaseField) -> u64 {
        match field {
            CaseField::Cases => self.cases,
            CaseField::Deaths => self.deaths,
            CaseField::Recovered => self.recovered,
        }
    }
}

/// A case record joined with its country's coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Country name (present in both sources).
    pub country: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Confirmed cases.
    pub cases: u64,
    /// Deaths.
    pub deaths: u64,
    /// Recoveries.
    pub recovered: u64,
}

impl ReportRow {
    /// Joins a case record with the matching coordinate.
    #[must_use]
    pub fn from_parts(record: &CaseRecord, coordinate: &CountryCoordinate) -> Self {
        Self {
            country: record.country.clone(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            cases: record.cases,
            deaths: record.deaths,
            recovered: record.recovered,
        }
    }

    /// Returns the count for the given field.
    #[must_use]
    pub const fn value(&self, field: CaseField) -> u64 {
        match field {
            CaseField::Cases => self.cases,
            CaseField::Deaths => self.deaths,
            CaseField::Recovered => self.recovered,
        }
    }
}

/// Field-wise sums over a set of report rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldTotals {
    /// Sum of confirmed cases.
    pub total_cases: u64,
    /// Sum of deaths.
    pub total_deaths: u64,
    /// Sum of recoveries.
    pub total_recovered: u64,
}

impl WorldTotals {
    /// Returns the total for the given field.
    #[must_use]
    pub const fn value(&self, field: CaseField) -> u64 {
        match field {
            CaseField::Cases => self.total_cases,
            CaseField::Deaths => self.total_deaths,
            CaseField::Recovered => self.total_recovered,
        }
    }
}

/// One of the three numeric columns of the case table.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CaseField {
    /// Confirmed cases.
    #[default]
    Cases,
    /// Deaths.
    Deaths,
    /// Recoveries.
    Recovered,
}

impl CaseField {
    /// All fields in table column order.
    pub const ALL: [Self; 3] = [Self::Cases, Self::Deaths, Self::Recovered];
}
