//! Pipeline configuration.
//!
//! Every key is optional in the TOML file; missing keys take the defaults
//! below. The binary layers command-line overrides on top before calling
//! [`PipelineConfig::validate`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use covid_map_scraper::html_table::{DEFAULT_BODY_SELECTOR, DEFAULT_HEADER_ROWS};
use covid_map_scraper::{DEFAULT_TIMEOUT, ExtractOptions, ExtractStrategy, FetchConfig};
use serde::{Deserialize, Serialize};

/// Page holding the per-country case table.
pub const DEFAULT_URL: &str = "https://en.wikipedia.org/wiki/Template:COVID-19_pandemic_data";

/// Coordinate table path, relative to the working directory.
pub const DEFAULT_COORDINATES: &str = "countries.csv";

/// `User-Agent` sent with the fetch.
pub const DEFAULT_USER_AGENT: &str = concat!("covid_map/", env!("CARGO_PKG_VERSION"));

/// Rows shown by `report` when `--top` is not given.
pub const DEFAULT_TOP: usize = 10;

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown or mistyped keys.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// URL of the page holding the case table.
    pub url: String,
    /// Path of the coordinate CSV file.
    pub coordinates: PathBuf,
    /// Fetch timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header for the fetch.
    pub user_agent: Option<String>,
    /// CSS selector for the table body.
    pub body_selector: String,
    /// How names are paired with figures.
    pub strategy: ExtractStrategy,
    /// Leading heading anchors skipped by positional extraction.
    pub header_rows: usize,
    /// Rows in rankings.
    pub top: usize,
    /// Extra HTTP headers for the fetch.
    pub headers: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            coordinates: PathBuf::from(DEFAULT_COORDINATES),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: Some(DEFAULT_USER_AGENT.to_owned()),
            body_selector: DEFAULT_BODY_SELECTOR.to_owned(),
            strategy: ExtractStrategy::default(),
            header_rows: DEFAULT_HEADER_ROWS,
            top: DEFAULT_TOP,
            headers: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty URL or selector, or a
    /// zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("url must not be empty".to_owned()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_owned(),
            ));
        }
        if self.body_selector.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "body_selector must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Fetch settings derived from this configuration.
    #[must_use]
    pub fn fetch_config(&self) -> FetchConfig {
        let mut config =
            FetchConfig::new(&self.url).with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(agent) = &self.user_agent {
            config = config.with_user_agent(agent);
        }
        for (key, value) in &self.headers {
            config = config.with_header(key, value);
        }
        config
    }

    /// Extraction settings derived from this configuration.
    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            body_selector: self.body_selector.clone(),
            strategy: self.strategy,
            header_rows: self.header_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.header_rows, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = PipelineConfig::from_toml(
            r#"
coordinates = "data/countries.csv"
strategy = "positional"
timeout_secs = 5

[headers]
Accept-Language = "en"
"#,
        )
        .unwrap();

        assert_eq!(config.coordinates, PathBuf::from("data/countries.csv"));
        assert_eq!(config.strategy, ExtractStrategy::Positional);
        assert_eq!(config.url, DEFAULT_URL);

        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(5));
        assert_eq!(fetch.headers.get("Accept-Language").unwrap(), "en");
        assert_eq!(fetch.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));

        let options = config.extract_options();
        assert_eq!(options.strategy, ExtractStrategy::Positional);
        assert_eq!(options.body_selector, "tbody");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(
            PipelineConfig::from_toml("retries = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml("timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml("strategy = \"diagonal\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = PipelineConfig {
            timeout_secs: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rendered_toml_parses_back() {
        let config = PipelineConfig {
            strategy: ExtractStrategy::Positional,
            ..PipelineConfig::default()
        }
        .with_header_for_test("X-Test", "1");
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("strategy = \"positional\""));
        assert_eq!(PipelineConfig::from_toml(&rendered).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PipelineConfig::load(Path::new("/nonexistent/covid_map.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    impl PipelineConfig {
        fn with_header_for_test(mut self, key: &str, value: &str) -> Self {
            self.headers.insert(key.to_owned(), value.to_owned());
            self
        }
    }
}
