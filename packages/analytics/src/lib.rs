#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation over normalized case data.
//!
//! Joins case records with the coordinate table ([`report`]), ranks the
//! joined rows ([`ranking`]), and derives the numeric series a charting
//! front end needs ([`charts`]). Everything here is a pure transform over
//! in-memory data.

pub mod charts;
pub mod ranking;
pub mod report;

pub use charts::{HistogramBin, Share, histogram, shares, threshold_scale};
pub use ranking::top_n;
pub use report::{Report, build_report, world_totals};
