#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! COVID-19 case map pipeline.
//!
//! Ties the other crates together: load the coordinate table, fetch the
//! case table page, extract and normalize its rows, then inner-join them
//! with the coordinates. Stages run strictly in order and the first
//! failure aborts the run with a [`PipelineError`] naming the stage.

use std::path::PathBuf;

use covid_map_geography::CoordinateError;
use covid_map_scraper::ScrapeError;

pub mod config;
pub mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{PipelineOutput, run, run_with_document};

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The coordinate table is missing or unusable.
    #[error("coordinate data unavailable: {0}")]
    DataNotFound(#[from] CoordinateError),

    /// The case table page could not be fetched.
    #[error("fetch failed: {0}")]
    Network(ScrapeError),

    /// The page does not contain the expected table structure.
    #[error("cannot parse case table: {0}")]
    Parse(ScrapeError),

    /// Names and figures could not be paired.
    #[error("cannot align case table: {0}")]
    Alignment(ScrapeError),

    /// A figure is not a count.
    #[error("cannot normalize case table: {0}")]
    Normalization(ScrapeError),

    /// The configuration is unusable.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// A local document could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl From<ScrapeError> for PipelineError {
    fn from(error: ScrapeError) -> Self {
        match error {
            ScrapeError::Network { .. } | ScrapeError::Timeout { .. } | ScrapeError::Status { .. } => {
                Self::Network(error)
            }
            ScrapeError::InvalidConfig(message) => {
                Self::InvalidConfig(ConfigError::Invalid(message))
            }
            ScrapeError::Parse(_) => Self::Parse(error),
            ScrapeError::Alignment { .. } => Self::Alignment(error),
            ScrapeError::Normalization { .. } => Self::Normalization(error),
        }
    }
}

impl PipelineError {
    /// Name of the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::DataNotFound(_) => "load_coordinates",
            Self::Network(_) | Self::Io { .. } => "fetch",
            Self::Parse(_) => "extract",
            Self::Alignment(_) => "align",
            Self::Normalization(_) => "normalize",
            Self::InvalidConfig(_) => "config",
        }
    }
}
