//! UMA derived-value chain.

use serde::Serialize;

use crate::data::UmaQuote;

pub const DAYS_PER_MONTH: f64 = 30.4;
pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UmaSource {
    Inegi,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uma {
    pub period: Option<String>,
    pub daily: f64,
    pub monthly: f64,
    pub annual: f64,
    pub source: UmaSource,
}

impl Uma {
    /// `monthly = daily × 30.4`, `annual = monthly × 12`.
    pub fn from_daily(daily: f64, period: Option<String>, source: UmaSource) -> Self {
        let monthly = daily * DAYS_PER_MONTH;
        Self {
            period,
            daily,
            monthly,
            annual: monthly * MONTHS_PER_YEAR,
            source,
        }
    }
}

/// Pick the UMA for the report.
///
/// INEGI values win when a daily value was published; published monthly and
/// annual values are used as-is and only missing ones are derived. Otherwise a
/// positive manual daily value is used with the derived chain.
pub fn resolve_uma(quote: Option<&UmaQuote>, manual_daily: Option<f64>) -> Option<Uma> {
    if let Some(q) = quote {
        if let Some(daily) = q.daily {
            let mut uma = Uma::from_daily(daily, q.period.clone(), UmaSource::Inegi);
            if let Some(m) = q.monthly {
                uma.monthly = m;
                uma.annual = m * MONTHS_PER_YEAR;
            }
            if let Some(a) = q.annual {
                uma.annual = a;
            }
            return Some(uma);
        }
    }

    manual_daily
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| Uma::from_daily(v, None, UmaSource::Manual))
}
