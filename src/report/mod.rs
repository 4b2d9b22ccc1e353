//! Report assembly: aligned indicator rows, derived quotes, UMA, raw data.
//!
//! All values are aligned as-of to the business-day columns before any
//! arithmetic, so derived rows inherit blanks and fill flags from their inputs.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::data::UmaQuote;
use crate::domain::{AlignedSeries, Indicator, NumberFormat, Quote, ReportConfig, Section, percent_series_to_decimal};
use crate::error::AppError;
use crate::series::{DuplicateConflict, SeriesMap, align_as_of, business_days_ending, rolling_average_series};

pub mod format;
pub mod uma;

pub use format::*;
pub use uma::*;

/// One labelled line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub section: Section,
    pub values: AlignedSeries,
    pub format: NumberFormat,
}

/// Recent normalized observations for one indicator, plus normalization stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSeries {
    pub label: String,
    pub series_id: String,
    pub points: Vec<(NaiveDate, f64)>,
    pub dropped: usize,
    pub conflicts: Vec<DuplicateConflict>,
}

impl RawSeries {
    pub fn from_map(label: &str, series_id: &str, map: &SeriesMap, last_n: usize) -> Self {
        Self {
            label: label.to_string(),
            series_id: series_id.to_string(),
            points: map.tail(last_n),
            dropped: map.dropped(),
            conflicts: map.conflicts().to_vec(),
        }
    }
}

/// Everything the renderers need.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReport {
    pub asof: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<ReportRow>,
    pub uma: Option<Uma>,
    pub raw: Vec<RawSeries>,
    /// Optional extra FRED series: `(series id, points)`.
    pub fred: Option<(String, Vec<(NaiveDate, f64)>)>,
}

impl IndicatorReport {
    pub fn row(&self, label: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Normalized series per indicator plus the UMA quote, as fetched.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub series: HashMap<Indicator, SeriesMap>,
    pub uma: Option<UmaQuote>,
}

impl ReportInputs {
    fn series(&self, indicator: Indicator) -> SeriesMap {
        self.series.get(&indicator).cloned().unwrap_or_default()
    }
}

/// Build the report from fetched inputs.
///
/// Fails with exit code 3 when every indicator series is empty.
pub fn build_report(inputs: &ReportInputs, config: &ReportConfig) -> Result<IndicatorReport, AppError> {
    if Indicator::ALL
        .iter()
        .all(|i| inputs.series.get(i).is_none_or(SeriesMap::is_empty))
    {
        return Err(AppError::no_data(
            "No indicator data available for the requested dates (all sources returned empty).",
        ));
    }

    let dates = business_days_ending(config.asof, config.business_days);
    let aligned = |ind: Indicator| align_as_of(&inputs.series(ind), &dates);

    let fix = aligned(Indicator::UsdFix);
    let jpy = aligned(Indicator::JpyMxn);
    let eur = aligned(Indicator::EurMxn);

    let smoothed = align_as_of(
        &rolling_average_series(&inputs.series(Indicator::UsdFix), config.smoothing_window),
        &dates,
    );
    let margin = config.margin_pct / 100.0;
    let divide = |a: f64, b: f64| if b == 0.0 { None } else { Some(a / b) };

    let mut rows = vec![
        row("USD/MXN", Section::Dollar, fix.clone(), NumberFormat::Fixed4),
        row("Buy", Section::Dollar, smoothed.map(|x| x * (1.0 - margin)), NumberFormat::Fixed6),
        row("Sell", Section::Dollar, smoothed.map(|x| x * (1.0 + margin)), NumberFormat::Fixed6),
        row("JPY/MXN", Section::Yen, jpy.clone(), NumberFormat::Fixed6),
        row("USD/JPY", Section::Yen, fix.zip_with(&jpy, divide), NumberFormat::Fixed6),
        row("EUR/MXN", Section::Euro, eur.clone(), NumberFormat::Fixed6),
        row("EUR/USD", Section::Euro, eur.zip_with(&fix, divide), NumberFormat::Fixed6),
        row("UDIS", Section::Udis, aligned(Indicator::Udis), NumberFormat::Fixed6),
    ];

    for ind in Indicator::ALL.into_iter().filter(|i| i.quote() == Quote::Percent) {
        let values = percent_series_to_decimal(aligned(ind));
        rows.push(row(ind.display_name(), ind.section(), values, NumberFormat::Percent2));
    }

    for r in rows.iter().filter(|r| r.values.is_all_blank()) {
        warn!(row = %r.label, "no data at or before any report date");
    }

    let raw = Indicator::ALL
        .into_iter()
        .map(|ind| RawSeries::from_map(ind.display_name(), ind.series_id(), &inputs.series(ind), config.raw_last_n))
        .collect();

    let uma = resolve_uma(inputs.uma.as_ref(), config.uma_manual);
    if uma.is_none() {
        warn!("UMA unavailable (INEGI returned no daily value and no manual value given)");
    }

    info!(asof = %config.asof, columns = dates.len(), rows = rows.len(), "built report");
    Ok(IndicatorReport {
        asof: config.asof,
        dates,
        rows,
        uma,
        raw,
        fred: None,
    })
}

fn row(label: &str, section: Section, values: AlignedSeries, format: NumberFormat) -> ReportRow {
    ReportRow {
        label: label.to_string(),
        section,
        values,
        format,
    }
}
