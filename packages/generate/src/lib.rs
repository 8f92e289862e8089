#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output generation for the COVID-19 map.
//!
//! Turns a joined [`covid_map_analytics::Report`] into the artifacts that
//! rendering front ends consume:
//!
//! * a GeoJSON point layer with one marker per country ([`map::markers`]),
//! * a choropleth layer keyed by country name with a threshold scale
//!   ([`map::ChoroplethLayer`]), optionally applied to a boundary file,
//! * chart series and a tabular report ([`export::write_outputs`]).
//!
//! Drawing the charts and maps is left to those front ends.

pub mod export;
pub mod format;
pub mod map;

use thiserror::Error;

pub use export::{ExportInput, ExportSummary, write_outputs};
pub use format::format_thousands;
pub use map::{ChoroplethLayer, markers};

/// Errors that can occur while generating outputs.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A boundary file is not valid GeoJSON.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// A boundary file is valid GeoJSON but not a feature collection.
    #[error("Boundary error: {message}")]
    Boundaries {
        /// Description of what went wrong.
        message: String,
    },
}
