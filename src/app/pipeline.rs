//! Shared report pipeline used by the `report`, `series`, and `align` commands.
//!
//! fetch -> normalize -> (smooth) -> align as-of -> derive rows
//!
//! Sources are passed in as `&dyn RateSource` so the whole workflow runs
//! offline against `MemorySource` in tests.

use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use tracing::{info, warn};

use crate::config::Settings;
use crate::data::{FredClient, InegiClient, RateSource, SieClient, UmaQuote};
use crate::domain::{AlignedSeries, Indicator, NumberFormat, Quote, ReportConfig, percent_series_to_decimal};
use crate::error::AppError;
use crate::report::{IndicatorReport, ReportInputs, build_report};
use crate::series::{SeriesMap, align_as_of, business_days_ending, normalize};

/// Inclusive fetch window: `lookback_days` before the first column through `asof`.
pub fn fetch_window(dates: &[NaiveDate], asof: NaiveDate, lookback_days: i64) -> (NaiveDate, NaiveDate) {
    let first = dates.first().copied().unwrap_or(asof);
    let back = Days::new(lookback_days.max(0).unsigned_abs());
    (first.checked_sub_days(back).unwrap_or(NaiveDate::MIN), asof)
}

/// Fetch and normalize one series.
pub fn fetch_series(source: &dyn RateSource, series_id: &str, start: NaiveDate, end: NaiveDate) -> SeriesMap {
    let raw = source.fetch_range(series_id, start, end);
    let map = normalize(&raw);
    if map.is_empty() {
        warn!(source = source.name(), series = series_id, "no usable observations");
    }
    map
}

/// Run the report against live clients built from `settings`.
///
/// A Banxico token is required. INEGI and FRED are optional: a missing token
/// only loses the UMA (manual fallback still applies) or the extra sheet.
pub fn run_report(config: &ReportConfig, settings: &Settings) -> Result<IndicatorReport, AppError> {
    let banxico = SieClient::from_settings(settings)?;

    let uma = match InegiClient::from_settings(settings) {
        Ok(client) => client
            .fetch_uma()
            .inspect_err(|e| warn!(error = %e, "UMA fetch failed"))
            .ok(),
        Err(e) => {
            warn!(error = %e, "skipping INEGI UMA");
            None
        }
    };

    let fred = match &config.fred_series {
        Some(_) => Some(FredClient::from_settings(settings)?),
        None => None,
    };

    run_report_with_sources(config, &banxico, uma, fred.as_ref().map(|c| c as &dyn RateSource))
}

/// Run the report against arbitrary sources.
pub fn run_report_with_sources(
    config: &ReportConfig,
    rates: &dyn RateSource,
    uma: Option<UmaQuote>,
    fred: Option<&dyn RateSource>,
) -> Result<IndicatorReport, AppError> {
    let dates = business_days_ending(config.asof, config.business_days);
    let (start, end) = fetch_window(&dates, config.asof, config.lookback_days);
    info!(source = rates.name(), %start, %end, "fetching indicators");

    let series = Indicator::ALL
        .into_iter()
        .map(|ind| (ind, fetch_series(rates, ind.series_id(), start, end)))
        .collect();

    let inputs = ReportInputs { series, uma };
    let mut report = build_report(&inputs, config)?;

    if let (Some(series_id), Some(fred)) = (&config.fred_series, fred) {
        let map = fetch_series(fred, series_id, start, end);
        report.fred = Some((series_id.clone(), map.tail(config.raw_last_n)));
    }

    Ok(report)
}

/// A single series aligned to the calendar, ready for display.
#[derive(Debug, Clone)]
pub struct SeriesView {
    pub label: String,
    pub dates: Vec<NaiveDate>,
    pub aligned: AlignedSeries,
    pub format: NumberFormat,
    pub observations: usize,
    pub dropped: usize,
}

/// Align a normalized series to `dates`; percent quotes become decimal fractions.
pub fn view_series(label: &str, map: &SeriesMap, dates: Vec<NaiveDate>, quote: Quote) -> SeriesView {
    let aligned = align_as_of(map, &dates);
    let (aligned, format) = match quote {
        Quote::Percent => (percent_series_to_decimal(aligned), NumberFormat::Percent2),
        Quote::Level => (aligned, NumberFormat::Fixed6),
    };
    SeriesView {
        label: label.to_string(),
        dates,
        aligned,
        format,
        observations: map.len(),
        dropped: map.dropped(),
    }
}

/// Fetch one series from `source` and align it to the business days ending at `asof`.
///
/// `series_id` is a raw SIE id or a known indicator name such as `cetes-28`.
pub fn run_series(
    source: &dyn RateSource,
    series_id: &str,
    asof: NaiveDate,
    business_days: usize,
    lookback_days: i64,
) -> Result<SeriesView, AppError> {
    let indicator = Indicator::from_series_id(series_id).or_else(|| Indicator::from_str(series_id, true).ok());
    let series_id = indicator.map_or(series_id, |i| i.series_id());

    let dates = business_days_ending(asof, business_days);
    let (start, end) = fetch_window(&dates, asof, lookback_days);
    let map = fetch_series(source, series_id, start, end);
    if map.is_empty() {
        return Err(AppError::no_data(format!(
            "No observations for {series_id} between {start} and {end}."
        )));
    }

    let label = indicator.map_or(series_id, |i| i.display_name());
    let quote = indicator.map_or(Quote::Level, |i| i.quote());
    Ok(view_series(label, &map, dates, quote))
}
