//! Sequential pipeline stages.

use std::path::Path;

use covid_map_analytics::{Report, build_report};
use covid_map_case_models::WorldTotals;
use covid_map_geography::{CoordinateTable, load_coordinates};
use covid_map_scraper::{extract_rows, fetch_document, normalize_rows};

use crate::{PipelineConfig, PipelineError};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Joined rows plus the names that did not join.
    pub report: Report,
    /// Totals over the joined rows.
    pub totals: WorldTotals,
}

/// Loads coordinates, fetches the page, then extracts, normalizes, and
/// joins its rows.
///
/// # Errors
///
/// Returns the [`PipelineError`] of the first stage that fails. Coordinates
/// are loaded before the fetch, so missing reference data never costs a
/// request.
pub async fn run(config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let coordinates = load_coordinates(&config.coordinates)?;
    let document = fetch_document(&config.fetch_config()).await?;
    process(config, &coordinates, &document)
}

/// Runs every stage except the fetch against `document`.
///
/// # Errors
///
/// Returns the [`PipelineError`] of the first stage that fails.
pub fn run_with_document(
    config: &PipelineConfig,
    document: &str,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let coordinates = load_coordinates(&config.coordinates)?;
    process(config, &coordinates, document)
}

/// Reads a previously saved copy of the page.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the file cannot be read.
pub fn read_document(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn process(
    config: &PipelineConfig,
    coordinates: &CoordinateTable,
    document: &str,
) -> Result<PipelineOutput, PipelineError> {
    let scraped = extract_rows(document, &config.extract_options())?;
    let records = normalize_rows(&scraped)?;
    let report = build_report(&records, coordinates);
    let totals = report.totals();

    Ok(PipelineOutput { report, totals })
}
