//! In-memory rate source.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::data::RateSource;
use crate::domain::RawObservation;
use crate::series::parse_date;

/// Serves fixed observations per series id, filtered to the requested range.
///
/// Records whose date does not parse are passed through untouched so that
/// normalization sees exactly what a real provider would have sent.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<String, Vec<RawObservation>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series_id: impl Into<String>, observations: Vec<RawObservation>) -> Self {
        self.series.insert(series_id.into(), observations);
        self
    }
}

impl RateSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_range(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawObservation> {
        self.series
            .get(series_id)
            .map(|obs| {
                obs.iter()
                    .filter(|o| match parse_date(&o.date) {
                        Ok(d) => d >= start && d <= end,
                        Err(_) => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
