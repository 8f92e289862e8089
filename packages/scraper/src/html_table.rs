//! Case-table extraction.
//!
//! The source page lists one country per `<tr>`: the country name is an
//! anchor inside a `<th>`, followed by four `<td>` cells holding cases,
//! deaths, recovered, and a reference marker. Rows above the data
//! (column headings, world totals) carry anchors in their `<th>` cells too
//! but no figure cells.
//!
//! Two strategies are supported:
//!
//! * [`ExtractStrategy::RowWise`] reads the name and the figures from the
//!   same `<tr>`, so a row can never be paired with another row's figures.
//!   A row with a full set of figure cells but no country anchor is an
//!   error, not a heading.
//! * [`ExtractStrategy::Positional`] collects all header anchors and all
//!   figure rows as two independent lists, drops a fixed number of leading
//!   heading anchors, and pairs the lists by index. The lists must end up
//!   the same length.

use covid_map_case_models::{RawCaseRow, RawCountryRow, ScrapedRow};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ScrapeError;

/// Number of `<td>` cells in a data row: cases, deaths, recovered, reference.
pub const FIGURE_CELLS: usize = 4;

/// Leading header anchors that are column headings rather than countries.
pub const DEFAULT_HEADER_ROWS: usize = 5;

/// Default CSS selector for the primary table body.
pub const DEFAULT_BODY_SELECTOR: &str = "tbody";

/// How country names are matched up with their figures.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtractStrategy {
    /// Name and figures come from the same `<tr>`.
    #[default]
    RowWise,
    /// Names and figures are extracted separately and paired by index.
    Positional,
}

/// Options controlling table extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// CSS selector for the table body; the first match is used.
    pub body_selector: String,
    /// Pairing strategy.
    pub strategy: ExtractStrategy,
    /// Leading header anchors to drop (positional strategy only).
    pub header_rows: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            body_selector: DEFAULT_BODY_SELECTOR.to_owned(),
            strategy: ExtractStrategy::default(),
            header_rows: DEFAULT_HEADER_ROWS,
        }
    }
}

/// Pre-parsed selectors shared by both strategies.
struct Selectors {
    row: Selector,
    cell: Selector,
    header: Selector,
    anchor: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
            header: parse_selector("th")?,
            anchor: parse_selector("a")?,
        })
    }
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::InvalidConfig(format!("invalid CSS selector '{selector}': {e}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join("").trim().to_owned()
}

/// Extracts `(country, cases, deaths, recovered)` rows from the document.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the document has no element matching
/// the body selector or a data row has the wrong number of cells, and
/// [`ScrapeError::Alignment`] if positional extraction produces unequal
/// name and figure counts.
pub fn extract_rows(html: &str, options: &ExtractOptions) -> Result<Vec<ScrapedRow>, ScrapeError> {
    let document = Html::parse_document(html);
    let body_sel = parse_selector(&options.body_selector)?;
    let body = document.select(&body_sel).next().ok_or_else(|| {
        ScrapeError::Parse(format!(
            "no element matching '{}' found in document",
            options.body_selector
        ))
    })?;
    let selectors = Selectors::new()?;

    let rows = match options.strategy {
        ExtractStrategy::RowWise => extract_row_wise(body, &selectors)?,
        ExtractStrategy::Positional => {
            let names = country_names(body, &selectors, options.header_rows);
            let figures = case_figures(body, &selectors)?;
            align(names, figures)?
        }
    };

    log::info!(
        "Extracted {} country rows ({} strategy)",
        rows.len(),
        options.strategy
    );
    Ok(rows)
}

fn extract_row_wise(body: ElementRef<'_>, sel: &Selectors) -> Result<Vec<ScrapedRow>, ScrapeError> {
    let mut rows = Vec::new();

    for (index, tr) in body.select(&sel.row).enumerate() {
        let name = tr
            .select(&sel.header)
            .find_map(|th| th.select(&sel.anchor).next())
            .map(element_text)
            .filter(|name| !name.is_empty());
        let cells: Vec<String> = tr.select(&sel.cell).map(element_text).collect();

        let Some(name) = name else {
            if cells.len() >= FIGURE_CELLS {
                return Err(ScrapeError::Parse(format!(
                    "row {index}: {} data cells but no country anchor",
                    cells.len()
                )));
            }
            log::debug!("row {index}: no country anchor, skipping");
            continue;
        };

        if cells.is_empty() {
            log::debug!("row {index} ({name}): heading row, skipping");
            continue;
        }

        let figures = figures_from_cells(cells).ok_or_else(|| {
            ScrapeError::Parse(format!(
                "row {index} ({name}): expected {FIGURE_CELLS} data cells"
            ))
        })?;

        rows.push(ScrapedRow {
            country: name,
            figures,
        });
    }

    Ok(rows)
}

/// Collects the first non-empty anchor text of every header cell that has
/// one, dropping the first `header_rows` of them.
fn country_names(body: ElementRef<'_>, sel: &Selectors, header_rows: usize) -> Vec<RawCountryRow> {
    body.select(&sel.header)
        .filter_map(|th| th.select(&sel.anchor).next())
        .map(element_text)
        .filter(|name| !name.is_empty())
        .map(|name| RawCountryRow { name })
        .skip(header_rows)
        .collect()
}

/// Collects the figures of every row with exactly [`FIGURE_CELLS`] cells.
/// Rows with fewer cells are structural; rows with more are an error.
fn case_figures(body: ElementRef<'_>, sel: &Selectors) -> Result<Vec<RawCaseRow>, ScrapeError> {
    let mut figures = Vec::new();

    for (index, tr) in body.select(&sel.row).enumerate() {
        let cells: Vec<String> = tr.select(&sel.cell).map(element_text).collect();
        match cells.len() {
            FIGURE_CELLS => {
                if let Some(row) = figures_from_cells(cells) {
                    figures.push(row);
                }
            }
            n if n < FIGURE_CELLS => log::debug!("row {index}: {n} data cells, skipping"),
            n => {
                return Err(ScrapeError::Parse(format!(
                    "row {index}: expected {FIGURE_CELLS} data cells, found {n}"
                )));
            }
        }
    }

    Ok(figures)
}

/// Takes cases, deaths, and recovered from a row's cells, discarding the
/// reference marker. Returns `None` unless there are exactly
/// [`FIGURE_CELLS`] cells.
fn figures_from_cells(cells: Vec<String>) -> Option<RawCaseRow> {
    let [cases, deaths, recovered, _reference]: [String; FIGURE_CELLS] = cells.try_into().ok()?;
    Some(RawCaseRow {
        cases,
        deaths,
        recovered,
    })
}

/// Pairs country names with figure rows by position.
///
/// # Errors
///
/// Returns [`ScrapeError::Alignment`] if the two sequences differ in
/// length. Nothing is truncated.
pub fn align(
    names: Vec<RawCountryRow>,
    figures: Vec<RawCaseRow>,
) -> Result<Vec<ScrapedRow>, ScrapeError> {
    if names.len() != figures.len() {
        return Err(ScrapeError::Alignment {
            names: names.len(),
            figures: figures.len(),
        });
    }

    Ok(names
        .into_iter()
        .zip(figures)
        .map(|(name, figures)| ScrapedRow {
            country: name.name,
            figures,
        })
        .collect())
}
