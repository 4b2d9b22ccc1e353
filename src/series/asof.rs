//! As-of alignment of a sparse series onto target dates.
//!
//! Each target date resolves to the most recent observation at or before it.
//! Lookups are independent ordered-range queries against the `SeriesMap`, so
//! the target sequence may be in any order (O(N log M) overall).

use chrono::NaiveDate;

use crate::domain::AlignedSeries;
use crate::series::SeriesMap;

/// Align `series` to `targets` with last-known-value semantics.
///
/// For each `targets[i]`:
/// - `values[i]` is the latest observation dated `<= targets[i]`, or `None`
/// - `filled[i]` is true when that value was carried forward (no observation
///   on `targets[i]` itself)
pub fn align_as_of(series: &SeriesMap, targets: &[NaiveDate]) -> AlignedSeries {
    let mut values = Vec::with_capacity(targets.len());
    let mut filled = Vec::with_capacity(targets.len());

    for &target in targets {
        match series.latest_at_or_before(target) {
            Some((date, value)) => {
                values.push(Some(value));
                filled.push(date != target);
            }
            None => {
                values.push(None);
                filled.push(false);
            }
        }
    }

    AlignedSeries { values, filled }
}
