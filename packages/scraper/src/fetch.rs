//! Single-shot HTTP fetch of the source page.

use crate::{FetchConfig, ScrapeError};

impl FetchConfig {
    /// Builds a [`reqwest::Client`] with the configured timeout and headers.
    fn build_client(&self) -> Result<reqwest::Client, ScrapeError> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in &self.headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                ScrapeError::InvalidConfig(format!("invalid header name '{key}': {e}"))
            })?;
            let val = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                ScrapeError::InvalidConfig(format!("invalid header value '{value}': {e}"))
            })?;
            header_map.insert(name, val);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(header_map)
            .timeout(self.timeout);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.as_str());
        }

        builder
            .build()
            .map_err(|e| ScrapeError::InvalidConfig(format!("cannot build HTTP client: {e}")))
    }

    fn request_error(&self, error: reqwest::Error) -> ScrapeError {
        if error.is_timeout() {
            ScrapeError::Timeout {
                url: self.url.clone(),
                timeout: self.timeout,
            }
        } else {
            ScrapeError::Network {
                url: self.url.clone(),
                source: error,
            }
        }
    }
}

/// Fetches the document at `config.url` and returns its body text.
///
/// Exactly one request is made; there is no retry.
///
/// # Errors
///
/// Returns [`ScrapeError::Timeout`] if the request exceeds
/// `config.timeout`, [`ScrapeError::Status`] for a non-2xx response, and
/// [`ScrapeError::Network`] for any other transport failure.
pub async fn fetch_document(config: &FetchConfig) -> Result<String, ScrapeError> {
    let client = config.build_client()?;

    log::info!("Fetching case table from {}", config.url);

    let response = client
        .get(&config.url)
        .send()
        .await
        .map_err(|e| config.request_error(e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: config.url.clone(),
            status,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| config.request_error(e))?;

    log::debug!("Fetched {} bytes from {}", body.len(), config.url);
    Ok(body)
}
