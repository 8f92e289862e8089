//! Conversion of scraped figure text into counts.
//!
//! The page formats numbers with comma thousands separators and marks
//! missing figures with an em dash or the words `No data`. Both markers
//! mean zero. Anything else that does not parse is an error rather than a
//! silent zero, so a change in the page's number format surfaces
//! immediately.

use covid_map_case_models::{CaseField, CaseRecord, ScrapedRow};

use crate::ScrapeError;

/// Thousands separator removed before parsing.
pub const THOUSANDS_SEPARATOR: char = ',';

/// Glyph the page uses for "no data available" (U+2014 EM DASH).
pub const PLACEHOLDER_GLYPH: char = '\u{2014}';

/// Literal marker the page uses for missing data.
pub const NO_DATA_MARKER: &str = "No data";

/// A figure that is not a non-negative base-10 integer once separators and
/// placeholders are dealt with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a non-negative integer")]
pub struct NormalizeError {
    /// The trimmed input text.
    pub value: String,
}

/// Normalizes one figure.
///
/// In order: trims whitespace, removes thousands separators, replaces the
/// placeholder glyph and the `No data` marker with `0`, then parses the
/// result as an unsigned base-10 integer.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the cleaned text is empty, contains
/// anything other than ASCII digits, or overflows `u64`.
pub fn normalize_count(raw: &str) -> Result<u64, NormalizeError> {
    let trimmed = raw.trim();
    let cleaned = trimmed
        .replace(THOUSANDS_SEPARATOR, "")
        .replace(PLACEHOLDER_GLYPH, "0")
        .replace(NO_DATA_MARKER, "0");

    let error = || NormalizeError {
        value: trimmed.to_owned(),
    };

    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error());
    }

    cleaned.parse::<u64>().map_err(|_| error())
}

/// Normalizes all three figures of a scraped row.
///
/// # Errors
///
/// Returns [`ScrapeError::Normalization`] naming the country, the column,
/// and the raw value of the first figure that fails.
pub fn normalize_row(row: &ScrapedRow) -> Result<CaseRecord, ScrapeError> {
    let count = |field: CaseField| {
        normalize_count(row.raw(field)).map_err(|e| ScrapeError::Normalization {
            country: row.country.clone(),
            field,
            value: e.value,
        })
    };

    Ok(CaseRecord {
        country: row.country.clone(),
        cases: count(CaseField::Cases)?,
        deaths: count(CaseField::Deaths)?,
        recovered: count(CaseField::Recovered)?,
    })
}

/// Normalizes every row, stopping at the first failure.
///
/// # Errors
///
/// Returns the first [`ScrapeError::Normalization`] encountered.
pub fn normalize_rows(rows: &[ScrapedRow]) -> Result<Vec<CaseRecord>, ScrapeError> {
    let records = rows
        .iter()
        .map(normalize_row)
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Normalized {} case records", records.len());
    Ok(records)
}
