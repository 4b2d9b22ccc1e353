//! Date/value normalization of raw provider observations.
//!
//! Provider data is occasionally inconsistent; a bad record is dropped instead
//! of failing the whole series.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::RawObservation;
use crate::series::SeriesMap;

/// Text values meaning "not available".
const NA_SENTINELS: [&str; 3] = ["N/E", "NA", "."];

/// A date string in neither accepted format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub input: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid date '{}'. Expected YYYY-MM-DD or DD/MM/YYYY.",
            self.input
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse `YYYY-MM-DD`, or `DD/MM/YYYY` when the text contains a slash.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if s.contains('/') {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
            return Ok(d);
        }
    }
    Err(ParseError { input: s.to_string() })
}

/// Parse a locale-formatted number (`"1,234.50"`), or `None` for sentinels,
/// blanks, parse failures and non-finite values.
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?.replace(',', "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || NA_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(trimmed)) {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Zero or one typed point for a raw observation.
pub fn normalize_observation(obs: &RawObservation) -> Option<(NaiveDate, f64)> {
    let value = parse_value(obs.value.as_deref())?;
    let date = parse_date(&obs.date).ok()?;
    Some((date, value))
}

/// Reduce raw observations into a `SeriesMap`.
///
/// Observations are applied in the order given (fetch order), so for a
/// repeated date the later record wins. Disagreeing duplicates are recorded on
/// the map and logged.
pub fn normalize(observations: &[RawObservation]) -> SeriesMap {
    let mut map = SeriesMap::new();
    for obs in observations {
        match normalize_observation(obs) {
            Some((date, value)) => map.insert(date, value),
            None => map.note_dropped(),
        }
    }

    for c in map.conflicts() {
        warn!(
            date = %c.date,
            replaced = c.replaced,
            kept = c.kept,
            "duplicate observation with a different value"
        );
    }
    debug!(
        points = map.len(),
        dropped = map.dropped(),
        "normalized observations"
    );
    map
}
