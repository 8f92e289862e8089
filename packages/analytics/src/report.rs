//! Inner join of case records with country coordinates.

use std::collections::BTreeSet;

use covid_map_case_models::{CaseRecord, ReportRow, WorldTotals};
use covid_map_geography::CoordinateTable;
use serde::{Deserialize, Serialize};

/// The joined report table plus the names dropped from either side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// One row per country present in both sources, in case-table order.
    pub rows: Vec<ReportRow>,
    /// Scraped countries with no coordinate entry.
    pub unmatched_cases: Vec<String>,
    /// Coordinate-table countries absent from the scraped data.
    pub unmatched_coordinates: Vec<String>,
}

impl Report {
    /// Field-wise sums over [`Report::rows`].
    #[must_use]
    pub fn totals(&self) -> WorldTotals {
        world_totals(&self.rows)
    }
}

/// Joins case records with coordinates on exact country name.
///
/// Matching is case-sensitive with no normalization of the names. Rows
/// keep the order of `cases`. If a country appears more than once in
/// `cases`, only its first record is used, so the result never has more
/// rows than either input has distinct countries.
#[must_use]
pub fn build_report(cases: &[CaseRecord], coordinates: &CoordinateTable) -> Report {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut rows = Vec::new();
    let mut unmatched_cases = Vec::new();

    for record in cases {
        if !seen.insert(record.country.as_str()) {
            log::warn!(
                "Duplicate case row for '{}', keeping first occurrence",
                record.country
            );
            continue;
        }

        match coordinates.get(&record.country) {
            Some(coordinate) => rows.push(ReportRow::from_parts(record, coordinate)),
            None => {
                log::debug!("No coordinates for '{}', dropping", record.country);
                unmatched_cases.push(record.country.clone());
            }
        }
    }

    let unmatched_coordinates: Vec<String> = coordinates
        .iter()
        .filter(|c| !seen.contains(c.name.as_str()))
        .map(|c| c.name.clone())
        .collect();

    log::info!(
        "Joined {} countries ({} case rows without coordinates, {} coordinates without cases)",
        rows.len(),
        unmatched_cases.len(),
        unmatched_coordinates.len()
    );

    Report {
        rows,
        unmatched_cases,
        unmatched_coordinates,
    }
}

/// Sums cases, deaths, and recoveries over `rows`.
///
/// Each sum saturates at `u64::MAX` instead of overflowing.
#[must_use]
pub fn world_totals(rows: &[ReportRow]) -> WorldTotals {
    rows.iter().fold(WorldTotals::default(), |acc, row| WorldTotals {
        total_cases: acc.total_cases.saturating_add(row.cases),
        total_deaths: acc.total_deaths.saturating_add(row.deaths),
        total_recovered: acc.total_recovered.saturating_add(row.recovered),
    })
}

#[cfg(test)]
mod tests {
    use covid_map_case_models::CountryCoordinate;
    use covid_map_scraper::{ScrapeError, normalize_rows};

    use super::*;

    fn coordinate(name: &str, latitude: f64, longitude: f64) -> CountryCoordinate {
        CountryCoordinate {
            name: name.to_owned(),
            latitude,
            longitude,
        }
    }

    fn record(country: &str, cases: u64, deaths: u64, recovered: u64) -> CaseRecord {
        CaseRecord {
            country: country.to_owned(),
            cases,
            deaths,
            recovered,
        }
    }

    fn row(country: &str, cases: u64, deaths: u64, recovered: u64) -> ReportRow {
        ReportRow {
            country: country.to_owned(),
            latitude: 0.0,
            longitude: 0.0,
            cases,
            deaths,
            recovered,
        }
    }

    #[test]
    fn alpha_beta_scenario() -> Result<(), ScrapeError> {
        use covid_map_case_models::ScrapedRow;

        let coordinates = CoordinateTable::from(vec![
            coordinate("Alpha", 1.0, 2.0),
            coordinate("Beta", 3.0, 4.0),
        ]);
        let scraped = vec![
            ScrapedRow::new("Alpha", "1,000", "10", "900"),
            ScrapedRow::new("Beta", "No data", "0", "0"),
        ];

        let report = build_report(&normalize_rows(&scraped)?, &coordinates);

        assert_eq!(
            report.rows,
            vec![
                ReportRow {
                    country: "Alpha".to_owned(),
                    latitude: 1.0,
                    longitude: 2.0,
                    cases: 1000,
                    deaths: 10,
                    recovered: 900,
                },
                ReportRow {
                    country: "Beta".to_owned(),
                    latitude: 3.0,
                    longitude: 4.0,
                    cases: 0,
                    deaths: 0,
                    recovered: 0,
                },
            ]
        );
        assert_eq!(
            report.totals(),
            WorldTotals {
                total_cases: 1000,
                total_deaths: 10,
                total_recovered: 900,
            }
        );
        assert!(report.unmatched_cases.is_empty());
        assert!(report.unmatched_coordinates.is_empty());
        Ok(())
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() -> Result<(), ScrapeError> {
        use covid_map_case_models::ScrapedRow;

        let coordinates = CoordinateTable::from(vec![
            coordinate("Alpha", 1.0, 2.0),
            coordinate("Beta", 3.0, 4.0),
        ]);
        let scraped = vec![
            ScrapedRow::new("Alpha", "10,000,000,000,000,000,000", "1", "0"),
            ScrapedRow::new("Beta", "10,000,000,000,000,000,000", "2", "0"),
        ];

        let totals = build_report(&normalize_rows(&scraped)?, &coordinates).totals();

        assert_eq!(totals.total_cases, u64::MAX);
        assert_eq!(totals.total_deaths, 3);
        Ok(())
    }

    #[test]
    fn inner_join_drops_unmatched_on_both_sides() {
        let coordinates = CoordinateTable::from(vec![
            coordinate("Alpha", 1.0, 2.0),
            coordinate("Delta", 5.0, 6.0),
        ]);
        let cases = vec![record("Alpha", 1, 0, 0), record("Gamma", 2, 0, 0)];

        let report = build_report(&cases, &coordinates);

        let countries: Vec<&str> = report.rows.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["Alpha"]);
        assert_eq!(report.unmatched_cases, vec!["Gamma".to_owned()]);
        assert_eq!(report.unmatched_coordinates, vec!["Delta".to_owned()]);
        assert!(report.rows.len() <= cases.len().min(coordinates.len()));
    }

    #[test]
    fn join_is_case_sensitive() {
        let coordinates = CoordinateTable::from(vec![coordinate("Alpha", 1.0, 2.0)]);
        let report = build_report(&[record("alpha", 1, 1, 1)], &coordinates);
        assert!(report.rows.is_empty());
    }

    #[test]
    fn duplicate_case_rows_never_exceed_coordinate_count() {
        let coordinates = CoordinateTable::from(vec![coordinate("Alpha", 1.0, 2.0)]);
        let cases = vec![record("Alpha", 5, 0, 0), record("Alpha", 9, 0, 0)];

        let report = build_report(&cases, &coordinates);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].cases, 5);
        assert!(report.rows.len() <= cases.len().min(coordinates.len()));
    }

    #[test]
    fn totals_sum_five_rows() {
        let rows = vec![
            row("A", 100, 1, 50),
            row("B", 2_500, 30, 2_000),
            row("C", 0, 0, 0),
            row("D", 42, 2, 40),
            row("E", 1_000_000, 12_345, 900_000),
        ];
        let totals = world_totals(&rows);
        assert_eq!(totals.total_cases, 1_002_642);
        assert_eq!(totals.total_deaths, 12_378);
        assert_eq!(totals.total_recovered, 902_090);
        assert_eq!(
            totals.total_cases,
            rows.iter().map(|r| r.cases).sum::<u64>()
        );
    }

    #[test]
    fn totals_of_empty_report_are_zero() {
        assert_eq!(world_totals(&[]), WorldTotals::default());
    }
}
