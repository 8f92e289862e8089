//! Top-N rankings over report rows.

use std::cmp::Reverse;

use covid_map_case_models::{CaseField, ReportRow};

/// Returns the `n` rows with the highest `field`, highest first.
///
/// The sort is stable: rows with equal values keep their original
/// relative order.
#[must_use]
pub fn top_n(rows: &[ReportRow], field: CaseField, n: usize) -> Vec<ReportRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by_key(|row| Reverse(row.value(field)));
    ranked.truncate(n);
    ranked
}
