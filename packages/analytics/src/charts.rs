//! Numeric series for charts and map legends.
//!
//! These are the data halves of the usual summary plots: a histogram of
//! per-country counts, percentage shares for a pie chart, and an evenly
//! spaced threshold scale for choropleth coloring.

use covid_map_case_models::{CaseField, ReportRow};
use serde::{Deserialize, Serialize};

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge; exclusive except for the last bin.
    pub upper: f64,
    /// Number of values in the bin.
    pub count: usize,
}

/// A country's share of a field's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// Country name.
    pub country: String,
    /// The country's count.
    pub value: u64,
    /// Percentage of the sum over all rows passed in (0-100).
    pub percent: f64,
}

/// Splits `[min, max]` of `values` into `bins` equal-width bins and counts
/// the values in each. The last bin includes its upper edge.
///
/// If every value is equal the range is widened by 0.5 on each side.
/// Returns no bins for empty input or `bins == 0`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn histogram(values: &[u64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let (lower, upper) = if min == max {
        (min as f64 - 0.5, max as f64 + 0.5)
    } else {
        (min as f64, max as f64)
    };
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0_usize; bins];
    for &value in values {
        let offset = ((value as f64 - lower) / width).floor();
        let idx = (offset.max(0.0) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lower + width * i as f64,
            upper: if i + 1 == bins {
                upper
            } else {
                lower + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Percentage share of `field` for each row, relative to the sum over
/// `rows`. All shares are 0 when the sum is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shares(rows: &[ReportRow], field: CaseField) -> Vec<Share> {
    let total: u128 = rows.iter().map(|r| u128::from(r.value(field))).sum();

    rows.iter()
        .map(|row| {
            let value = row.value(field);
            let percent = if total == 0 {
                0.0
            } else {
                value as f64 * 100.0 / total as f64
            };
            Share {
                country: row.country.clone(),
                value,
                percent,
            }
        })
        .collect()
}

/// Evenly spaced integer thresholds from the minimum to the maximum of
/// `values`, with the last one raised by 1 so the maximum itself falls
/// inside the scale.
///
/// `steps` is clamped to at least 2. Returns an empty scale for empty
/// input.
#[must_use]
pub fn threshold_scale(values: &[u64], steps: usize) -> Vec<u64> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    let intervals = steps.max(2) as u128 - 1;
    let span = u128::from(max - min);

    let mut scale: Vec<u64> = (0..=intervals)
        .map(|i| {
            let offset = span * i / intervals;
            min + u64::try_from(offset).unwrap_or(u64::MAX - min)
        })
        .collect();

    if let Some(last) = scale.last_mut() {
        *last = last.saturating_add(1);
    }
    scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: &str, cases: u64) -> ReportRow {
        ReportRow {
            country: country.to_owned(),
            latitude: 0.0,
            longitude: 0.0,
            cases,
            deaths: 0,
            recovered: 0,
        }
    }

    #[test]
    fn histogram_covers_every_value() {
        let values = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        // Last bin is closed: 9 and 10 both land in [9, 10].
        assert_eq!(bins[9].count, 2);
        assert!((bins[0].lower - 0.0).abs() < f64::EPSILON);
        assert!((bins[9].upper - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn histogram_of_constant_values_widens_range() {
        let bins = histogram(&[5, 5, 5], 2);
        assert_eq!(bins.len(), 2);
        assert!((bins[0].lower - 4.5).abs() < f64::EPSILON);
        assert!((bins[1].upper - 5.5).abs() < f64::EPSILON);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(histogram(&[], 10).is_empty());
        assert!(histogram(&[1, 2], 0).is_empty());
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let rows = vec![row("A", 50), row("B", 25), row("C", 25)];
        let shares = shares(&rows, CaseField::Cases);
        assert!((shares[0].percent - 50.0).abs() < 1e-9);
        let sum: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn shares_of_huge_counts_do_not_overflow() {
        let rows = vec![row("A", u64::MAX), row("B", u64::MAX)];
        let shares = shares(&rows, CaseField::Cases);
        assert!((shares[0].percent - 50.0).abs() < 1e-9);
        assert!((shares[1].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn shares_of_zero_total_are_zero() {
        let rows = vec![row("A", 0), row("B", 0)];
        assert!(shares(&rows, CaseField::Cases)
            .iter()
            .all(|s| s.percent == 0.0));
    }

    #[test]
    fn threshold_scale_spans_min_to_past_max() {
        let scale = threshold_scale(&[0, 250, 1_000], 6);
        assert_eq!(scale, vec![0, 200, 400, 600, 800, 1_001]);
        assert!(*scale.last().unwrap() > 1_000);
    }

    #[test]
    fn threshold_scale_truncates_fractional_steps() {
        assert_eq!(threshold_scale(&[1, 10], 4), vec![1, 4, 7, 11]);
    }

    #[test]
    fn threshold_scale_of_nothing_is_empty() {
        assert!(threshold_scale(&[], 6).is_empty());
    }
}
