#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Country coordinate reference table.
//!
//! Loads the static table of country names and positions that scraped case
//! data is joined against. The table is read once per run and keyed by
//! country name; every column besides name, latitude, and longitude is
//! ignored.

pub mod coordinates;

use std::path::PathBuf;

use thiserror::Error;

pub use coordinates::{CoordinateTable, load_coordinates, parse_coordinates};

/// Errors that can occur while loading the coordinate table.
///
/// Every variant means the reference data is missing or unusable; the
/// pipeline treats them all as a data-not-found failure.
#[derive(Debug, Error)]
pub enum CoordinateError {
    /// The table file does not exist.
    #[error("coordinate table not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A required column is absent from the header row.
    #[error("{origin}: missing required column '{column}'")]
    MissingColumn {
        /// Where the table came from (file path or label).
        origin: String,
        /// Canonical name of the missing column.
        column: &'static str,
    },

    /// A row holds a value that cannot be used.
    #[error("{origin}: line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        /// Where the table came from (file path or label).
        origin: String,
        /// 1-based line number in the source file.
        line: u64,
        /// Canonical name of the offending column.
        column: &'static str,
        /// Raw cell text.
        value: String,
    },

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
