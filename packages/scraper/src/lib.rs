#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scraping for the COVID-19 case-count table.
//!
//! Three stages live here, each consuming the complete output of the one
//! before it:
//!
//! 1. [`fetch`]: a single HTTP GET of the source page,
//! 2. [`html_table`]: extraction of `(country, cases, deaths, recovered)`
//!    text rows from the page's table body,
//! 3. [`normalize`]: conversion of the figure text into integers.
//!
//! Nothing here retries. Any failure is returned to the caller with enough
//! context (URL, row, raw value) to diagnose a change in the page format.

pub mod fetch;
pub mod html_table;
pub mod normalize;

use std::collections::BTreeMap;
use std::time::Duration;

use covid_map_case_models::CaseField;

pub use fetch::fetch_document;
pub use html_table::{ExtractOptions, ExtractStrategy, align, extract_rows};
pub use normalize::{NormalizeError, normalize_count, normalize_row, normalize_rows};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching or extracting the case table.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout.
        timeout: Duration,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },

    /// The fetch configuration is unusable (bad header, bad selector).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The document does not have the expected structure.
    #[error("parse error: {0}")]
    Parse(String),

    /// Country names and case figures were extracted in different numbers.
    #[error("extracted {names} country names but {figures} case rows")]
    Alignment {
        /// Number of country names.
        names: usize,
        /// Number of figure rows.
        figures: usize,
    },

    /// A figure could not be turned into a count.
    #[error("{country}: {field} value '{value}' is not a non-negative integer")]
    Normalization {
        /// Country the figure belongs to.
        country: String,
        /// Column the figure came from.
        field: CaseField,
        /// Raw text after trimming.
        value: String,
    },
}

/// Where and how to fetch the source page.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// The URL to fetch.
    pub url: String,
    /// Upper bound on the whole request, connect through body.
    pub timeout: Duration,
    /// `User-Agent` header value, if any.
    pub user_agent: Option<String>,
    /// Additional HTTP headers to include in the request.
    pub headers: BTreeMap<String, String>,
}

impl FetchConfig {
    /// Creates a new `FetchConfig` for the given URL with the default
    /// timeout and no extra headers.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_owned());
        self
    }

    /// Adds an HTTP header to include in the request.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }
}
