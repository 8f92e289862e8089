//! Report file exports.
//!
//! Writes everything a charting or mapping front end needs into one
//! directory:
//!
//! | File                 | Contents                                        |
//! |----------------------|-------------------------------------------------|
//! | `report.csv`         | joined rows, one column per field               |
//! | `report.json`        | rows, totals, unmatched names, generation time  |
//! | `markers.geojson`    | point layer from [`crate::map::markers`]        |
//! | `choropleth.json`    | [`crate::map::ChoroplethLayer`] for cases       |
//! | `charts.json`        | cases histogram, top-N shares by cases/deaths   |
//! | `choropleth.geojson` | boundaries annotated with values (optional)     |

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use covid_map_analytics::{HistogramBin, Report, Share, histogram, shares, top_n};
use covid_map_case_models::{CaseField, ReportRow, WorldTotals};
use serde::Serialize;

use crate::GenerateError;
use crate::map::{ChoroplethLayer, markers, parse_boundaries};

/// Number of bins in the cases histogram.
pub const HISTOGRAM_BINS: usize = 10;

/// Everything needed to write the export files.
#[derive(Debug, Clone)]
pub struct ExportInput<'a> {
    /// The joined report.
    pub report: &'a Report,
    /// Totals over `report.rows`.
    pub totals: WorldTotals,
    /// URL the case table was scraped from.
    pub source_url: &'a str,
    /// Count shown in marker popups.
    pub label_field: CaseField,
    /// Number of thresholds in the choropleth scale.
    pub threshold_steps: usize,
    /// Number of countries in the pie-chart rankings.
    pub top: usize,
    /// Optional GeoJSON boundary file to annotate.
    pub boundaries: Option<&'a Path>,
}

/// Files written by [`write_outputs`], plus boundary names without data.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Paths of every file written.
    pub files: Vec<PathBuf>,
    /// Boundary features that matched no country.
    pub unmatched_boundaries: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    source_url: &'a str,
    totals: WorldTotals,
    rows: &'a [ReportRow],
    unmatched_cases: &'a [String],
    unmatched_coordinates: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartsDocument {
    cases_histogram: Vec<HistogramBin>,
    top_cases: Vec<Share>,
    top_deaths: Vec<Share>,
}

/// Writes all export files into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`GenerateError`] if a file cannot be written or the boundary
/// file cannot be read or parsed.
pub fn write_outputs(dir: &Path, input: &ExportInput<'_>) -> Result<ExportSummary, GenerateError> {
    std::fs::create_dir_all(dir)?;
    let rows = input.report.rows.as_slice();
    let mut summary = ExportSummary::default();

    let csv_path = dir.join("report.csv");
    let mut writer = csv::Writer::from_path(&csv_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    summary.files.push(csv_path);

    let document = ReportDocument {
        generated_at: Utc::now(),
        source_url: input.source_url,
        totals: input.totals,
        rows,
        unmatched_cases: &input.report.unmatched_cases,
        unmatched_coordinates: &input.report.unmatched_coordinates,
    };
    summary.files.push(write_json(dir, "report.json", &document)?);

    summary.files.push(write_json(
        dir,
        "markers.geojson",
        &markers(rows, input.label_field),
    )?);

    let layer = ChoroplethLayer::build(rows, CaseField::Cases, input.threshold_steps);
    summary
        .files
        .push(write_json(dir, "choropleth.json", &layer)?);

    let cases: Vec<u64> = rows.iter().map(|r| r.cases).collect();
    let charts = ChartsDocument {
        cases_histogram: histogram(&cases, HISTOGRAM_BINS),
        top_cases: shares(&top_n(rows, CaseField::Cases, input.top), CaseField::Cases),
        top_deaths: shares(&top_n(rows, CaseField::Deaths, input.top), CaseField::Deaths),
    };
    summary.files.push(write_json(dir, "charts.json", &charts)?);

    if let Some(path) = input.boundaries {
        let contents = std::fs::read_to_string(path)?;
        let applied = layer.apply(parse_boundaries(&contents)?);
        summary
            .files
            .push(write_json(dir, "choropleth.geojson", &applied.boundaries)?);
        summary.unmatched_boundaries = applied.missing;
    }

    log::info!(
        "Wrote {} files to {}",
        summary.files.len(),
        dir.display()
    );
    Ok(summary)
}

/// Serializes `value` to `dir/name`, writing to a `.tmp` file first and
/// renaming it into place.
fn write_json(dir: &Path, name: &str, value: &impl Serialize) -> Result<PathBuf, GenerateError> {
    let path = dir.join(name);
    let tmp_path = dir.join(format!("{name}.tmp"));
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, &path)?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}
