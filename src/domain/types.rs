//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during alignment
//! - exported to JSON/CSV
//! - printed in the terminal report

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single observation as returned by a rate-data source, before parsing.
///
/// `date` is either `YYYY-MM-DD` or `DD/MM/YYYY`. `value` may carry thousands
/// separators or a "not available" sentinel such as `N/E`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: Option<String>,
}

impl RawObservation {
    pub fn new(date: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            date: date.into(),
            value: value.map(str::to_string),
        }
    }
}

/// How an indicator is quoted by its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    /// A price or index level (FX rates, UDIS).
    Level,
    /// An interest rate in whole percent (`11.25` means 11.25%).
    Percent,
}

/// Report block an indicator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dollar,
    Yen,
    Euro,
    Udis,
    Tiie,
    Cetes,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Dollar,
        Section::Yen,
        Section::Euro,
        Section::Udis,
        Section::Tiie,
        Section::Cetes,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Dollar => "US DOLLAR",
            Section::Yen => "JAPANESE YEN",
            Section::Euro => "EURO",
            Section::Udis => "UDIS",
            Section::Tiie => "TIIE RATES",
            Section::Cetes => "CETES",
        }
    }
}

/// Indicators published by Banxico's SIE service that the report consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Indicator {
    /// USD/MXN FIX rate.
    UsdFix,
    EurMxn,
    JpyMxn,
    /// Inflation-indexed investment units.
    Udis,
    Tiie28,
    Tiie91,
    Tiie182,
    Cetes28,
    Cetes91,
    Cetes182,
    Cetes364,
}

impl Indicator {
    pub const ALL: [Indicator; 11] = [
        Indicator::UsdFix,
        Indicator::EurMxn,
        Indicator::JpyMxn,
        Indicator::Udis,
        Indicator::Tiie28,
        Indicator::Tiie91,
        Indicator::Tiie182,
        Indicator::Cetes28,
        Indicator::Cetes91,
        Indicator::Cetes182,
        Indicator::Cetes364,
    ];

    /// Banxico SIE series identifier.
    pub fn series_id(self) -> &'static str {
        match self {
            Indicator::UsdFix => "SF43718",
            Indicator::EurMxn => "SF46410",
            Indicator::JpyMxn => "SF46406",
            Indicator::Udis => "SP68257",
            Indicator::Tiie28 => "SF43783",
            Indicator::Tiie91 => "SF43784",
            Indicator::Tiie182 => "SF43785",
            Indicator::Cetes28 => "SF43936",
            Indicator::Cetes91 => "SF43939",
            Indicator::Cetes182 => "SF43942",
            Indicator::Cetes364 => "SF43945",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Indicator::UsdFix => "USD/MXN (FIX)",
            Indicator::EurMxn => "EUR/MXN",
            Indicator::JpyMxn => "JPY/MXN",
            Indicator::Udis => "UDIS",
            Indicator::Tiie28 => "TIIE 28d",
            Indicator::Tiie91 => "TIIE 91d",
            Indicator::Tiie182 => "TIIE 182d",
            Indicator::Cetes28 => "CETES 28d",
            Indicator::Cetes91 => "CETES 91d",
            Indicator::Cetes182 => "CETES 182d",
            Indicator::Cetes364 => "CETES 364d",
        }
    }

    pub fn quote(self) -> Quote {
        match self {
            Indicator::UsdFix | Indicator::EurMxn | Indicator::JpyMxn | Indicator::Udis => Quote::Level,
            _ => Quote::Percent,
        }
    }

    pub fn section(self) -> Section {
        match self {
            Indicator::UsdFix => Section::Dollar,
            Indicator::EurMxn => Section::Euro,
            Indicator::JpyMxn => Section::Yen,
            Indicator::Udis => Section::Udis,
            Indicator::Tiie28 | Indicator::Tiie91 | Indicator::Tiie182 => Section::Tiie,
            Indicator::Cetes28 | Indicator::Cetes91 | Indicator::Cetes182 | Indicator::Cetes364 => {
                Section::Cetes
            }
        }
    }

    /// Look up an indicator by its SIE series id (case-insensitive).
    pub fn from_series_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|i| i.series_id().eq_ignore_ascii_case(id.trim()))
    }
}

/// Number rendering for a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// `0.0000`
    Fixed4,
    /// `0.000000`
    Fixed6,
    /// Decimal fraction shown as `0.00%`.
    Percent2,
}

impl NumberFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            NumberFormat::Fixed4 => format!("{value:.4}"),
            NumberFormat::Fixed6 => format!("{value:.6}"),
            NumberFormat::Percent2 => format!("{:.2}%", value * 100.0),
        }
    }
}

/// Values aligned to a sequence of target dates, with fill flags.
///
/// Invariants (established by `series::align_as_of`):
/// - `values.len() == filled.len()`
/// - `filled[i]` implies `values[i].is_some()`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub values: Vec<Option<f64>>,
    pub filled: Vec<bool>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<f64>, bool)> + '_ {
        self.values.iter().copied().zip(self.filled.iter().copied())
    }

    /// True when no position carries a value.
    pub fn is_all_blank(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Apply `f` to every present value, keeping the fill flags.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.iter().map(|v| v.map(&f)).collect(),
            filled: self.filled.clone(),
        }
    }

    /// Combine two aligned series position by position.
    ///
    /// The output is blank where either input is blank or `f` returns `None`,
    /// and filled where either input was filled.
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> Option<f64>) -> Self {
        let mut values = Vec::with_capacity(self.len());
        let mut filled = Vec::with_capacity(self.len());
        for ((a, fa), (b, fb)) in self.iter().zip(other.iter()) {
            let v = match (a, b) {
                (Some(a), Some(b)) => f(a, b).filter(|v| v.is_finite()),
                _ => None,
            };
            filled.push(v.is_some() && (fa || fb));
            values.push(v);
        }
        Self { values, filled }
    }
}

/// A full `report` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Last calendar column of the report.
    pub asof: NaiveDate,
    /// Number of business-day columns ending at `asof`.
    pub business_days: usize,
    /// How far back (calendar days) to request history before the first column.
    pub lookback_days: i64,
    /// Trailing window for the smoothed USD rate used by buy/sell quotes.
    pub smoothing_window: usize,
    /// Buy/sell margin over the smoothed rate, in percent per side.
    pub margin_pct: f64,
    /// Manual daily UMA used when INEGI returns nothing.
    pub uma_manual: Option<f64>,
    /// Number of most recent raw observations kept per series.
    pub raw_last_n: usize,
    /// Directory for the CSV sheets (none: terminal only).
    pub out_dir: Option<PathBuf>,
    /// Include the raw observations sheet.
    pub write_raw: bool,
    /// Optional JSON export of the whole report.
    pub export_json: Option<PathBuf>,
    /// Optional FRED series appended as its own sheet.
    pub fred_series: Option<String>,
}

/// Outcome of probing one data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Ok,
    Warn,
    Err,
}

impl StatusLevel {
    pub fn label(self) -> &'static str {
        match self {
            StatusLevel::Ok => "ok",
            StatusLevel::Warn => "warn",
            StatusLevel::Err => "err",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: String,
    pub level: StatusLevel,
    pub message: String,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_ids_round_trip_through_lookup() {
        for ind in Indicator::ALL {
            assert_eq!(Indicator::from_series_id(ind.series_id()), Some(ind));
        }
        assert_eq!(Indicator::from_series_id(" sf43718 "), Some(Indicator::UsdFix));
        assert_eq!(Indicator::from_series_id("SF00000"), None);
    }

    #[test]
    fn rates_are_quoted_in_percent() {
        assert_eq!(Indicator::Cetes28.quote(), Quote::Percent);
        assert_eq!(Indicator::Tiie182.quote(), Quote::Percent);
        assert_eq!(Indicator::UsdFix.quote(), Quote::Level);
        assert_eq!(Indicator::Udis.quote(), Quote::Level);
    }

    #[test]
    fn zip_with_propagates_blanks_and_fill_flags() {
        let a = AlignedSeries {
            values: vec![Some(20.0), Some(20.0), None, Some(18.0)],
            filled: vec![false, true, false, false],
        };
        let b = AlignedSeries {
            values: vec![Some(0.5), Some(0.5), Some(0.5), Some(0.0)],
            filled: vec![false, false, true, false],
        };
        let out = a.zip_with(&b, |x, y| if y == 0.0 { None } else { Some(x / y) });
        assert_eq!(out.values, vec![Some(40.0), Some(40.0), None, None]);
        assert_eq!(out.filled, vec![false, true, false, false]);
    }

    #[test]
    fn number_formats_render() {
        assert_eq!(NumberFormat::Fixed4.render(17.1), "17.1000");
        assert_eq!(NumberFormat::Fixed6.render(0.125), "0.125000");
        assert_eq!(NumberFormat::Percent2.render(0.1125), "11.25%");
    }
}
