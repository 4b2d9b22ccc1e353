//! Date-keyed observation map for a single series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Two observations for the same date that disagreed on the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuplicateConflict {
    pub date: NaiveDate,
    /// Value that was replaced (earlier in fetch order).
    pub replaced: f64,
    /// Value kept (later in fetch order).
    pub kept: f64,
}

/// Sorted `date -> value` mapping for one indicator.
///
/// Besides the points, the map remembers how many raw records were dropped
/// during normalization and any conflicting duplicates, for diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesMap {
    points: BTreeMap<NaiveDate, f64>,
    conflicts: Vec<DuplicateConflict>,
    dropped: usize,
}

impl SeriesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point. A later insert for the same date replaces the earlier one.
    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        if let Some(prev) = self.points.insert(date, value) {
            if prev != value {
                self.conflicts.push(DuplicateConflict {
                    date,
                    replaced: prev,
                    kept: value,
                });
            }
        }
    }

    pub(crate) fn note_dropped(&mut self) {
        self.dropped += 1;
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.points.contains_key(&date)
    }

    /// Most recent point with a date at or before `date`.
    pub fn latest_at_or_before(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        self.points
            .range(..=date)
            .next_back()
            .map(|(d, v)| (*d, *v))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in ascending date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// The `n` most recent points, ascending.
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, f64)> {
        let mut out: Vec<_> = self.iter().rev().take(n).collect();
        out.reverse();
        out
    }

    pub fn conflicts(&self) -> &[DuplicateConflict] {
        &self.conflicts
    }

    /// Raw records discarded because of an unparseable date or missing value.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl FromIterator<(NaiveDate, f64)> for SeriesMap {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        let mut map = SeriesMap::new();
        for (d, v) in iter {
            map.insert(d, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn later_insert_wins_and_conflict_is_recorded() {
        let mut map = SeriesMap::new();
        map.insert(d(2024, 1, 2), 17.10);
        map.insert(d(2024, 1, 2), 17.10);
        assert!(map.conflicts().is_empty());

        map.insert(d(2024, 1, 2), 17.20);
        assert_eq!(map.get(d(2024, 1, 2)), Some(17.20));
        assert_eq!(
            map.conflicts(),
            &[DuplicateConflict {
                date: d(2024, 1, 2),
                replaced: 17.10,
                kept: 17.20
            }]
        );
    }

    #[test]
    fn latest_at_or_before_uses_range_lookup() {
        let map: SeriesMap = [(d(2024, 1, 2), 1.0), (d(2024, 1, 4), 2.0)].into_iter().collect();
        assert_eq!(map.latest_at_or_before(d(2024, 1, 1)), None);
        assert_eq!(map.latest_at_or_before(d(2024, 1, 2)), Some((d(2024, 1, 2), 1.0)));
        assert_eq!(map.latest_at_or_before(d(2024, 1, 3)), Some((d(2024, 1, 2), 1.0)));
        assert_eq!(map.latest_at_or_before(d(2024, 2, 1)), Some((d(2024, 1, 4), 2.0)));
    }

    #[test]
    fn tail_returns_most_recent_ascending() {
        let map: SeriesMap = (1..=5).map(|i| (d(2024, 1, i), i as f64)).collect();
        assert_eq!(map.tail(2), vec![(d(2024, 1, 4), 4.0), (d(2024, 1, 5), 5.0)]);
        assert_eq!(map.tail(10).len(), 5);
    }
}
