//! Terminal output for reports, single series, and source status.
//!
//! Formatting lives here so the pipeline and the engine stay free of layout
//! decisions. Tables are fixed-width and right-trimmed.

use chrono::NaiveDate;

use crate::domain::{AlignedSeries, NumberFormat, Section, SourceStatus};
use crate::report::{IndicatorReport, Uma};

/// Marker appended to carried-forward cells.
pub const FILLED_MARK: char = '*';

const LABEL_WIDTH: usize = 16;
const CELL_WIDTH: usize = 12;

/// Format the full report: one block per section, then UMA and the legend.
pub fn format_report(report: &IndicatorReport) -> String {
    let mut out = String::new();

    out.push_str("=== ratesheet - Mexican FX and rates ===\n");
    out.push_str(&format!("As-of: {}\n", report.asof));
    out.push_str(&format!("Columns: {} business day(s)\n", report.dates.len()));

    for section in Section::ALL {
        let rows: Vec<_> = report.rows.iter().filter(|r| r.section == section).collect();
        if rows.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(section.title());
        out.push('\n');
        out.push_str(&header(&report.dates));
        for r in rows {
            out.push_str(&line(&r.label, &r.values, r.format));
        }
    }

    out.push('\n');
    out.push_str(&format_uma(report.uma.as_ref()));

    if report.rows.iter().any(|r| r.values.filled.iter().any(|f| *f)) {
        out.push('\n');
        out.push_str(&legend());
    }

    out
}

/// Format one aligned series as a two-column table.
pub fn format_aligned(label: &str, dates: &[NaiveDate], series: &AlignedSeries, fmt: NumberFormat) -> String {
    let mut out = String::new();
    out.push_str(&format!("{label}\n"));
    out.push_str(&pad_line(format!("{:<12} {:>CELL_WIDTH$}", "date", "value")));
    out.push_str(&pad_line(format!("{:-<12} {:-<CELL_WIDTH$}", "", "")));
    for (date, (value, filled)) in dates.iter().zip(series.iter()) {
        out.push_str(&pad_line(format!("{:<12} {:>CELL_WIDTH$}", date.to_string(), cell(value, filled, fmt))));
    }
    if series.filled.iter().any(|f| *f) {
        out.push_str(&legend());
    }
    out
}

/// Format the source status probes.
pub fn format_status(statuses: &[SourceStatus]) -> String {
    let mut out = String::new();
    out.push_str(&pad_line(format!("{:<10} {:<6} {:>8} {}", "source", "status", "ms", "message")));
    out.push_str(&pad_line(format!("{:-<10} {:-<6} {:->8} {:-<7}", "", "", "", "")));
    for s in statuses {
        out.push_str(&pad_line(format!(
            "{:<10} {:<6} {:>8} {}",
            s.source,
            s.level.label(),
            s.latency_ms,
            s.message
        )));
    }
    out
}

fn format_uma(uma: Option<&Uma>) -> String {
    let Some(uma) = uma else {
        return "UMA: unavailable\n".to_string();
    };
    let period = uma.period.as_deref().unwrap_or("-");
    format!(
        "UMA ({:?}, period {period})\n  daily   {:>14.2}\n  monthly {:>14.2}\n  annual  {:>14.2}\n",
        uma.source, uma.daily, uma.monthly, uma.annual
    )
}

fn header(dates: &[NaiveDate]) -> String {
    let mut s = format!("{:<LABEL_WIDTH$}", "");
    for d in dates {
        s.push_str(&format!(" {:>CELL_WIDTH$}", d.format("%d/%m/%Y").to_string()));
    }
    pad_line(s)
}

fn line(label: &str, values: &AlignedSeries, fmt: NumberFormat) -> String {
    let mut s = format!("{:<LABEL_WIDTH$}", truncate(label, LABEL_WIDTH));
    for (value, filled) in values.iter() {
        s.push_str(&format!(" {:>CELL_WIDTH$}", cell(value, filled, fmt)));
    }
    pad_line(s)
}

/// Render one cell: blank for missing, marked when carried forward.
pub fn cell(value: Option<f64>, filled: bool, fmt: NumberFormat) -> String {
    match value {
        None => String::new(),
        Some(v) if filled => format!("{}{FILLED_MARK}", fmt.render(v)),
        Some(v) => fmt.render(v),
    }
}

fn legend() -> String {
    format!("{FILLED_MARK} value carried forward from an earlier date\n")
}

fn pad_line(s: String) -> String {
    let mut s = s.trim_end().to_string();
    s.push('\n');
    s
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusLevel;
    use crate::report::{ReportRow, UmaSource};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn report() -> IndicatorReport {
        IndicatorReport {
            asof: d(5),
            dates: vec![d(4), d(5)],
            rows: vec![
                ReportRow {
                    label: "USD/MXN".to_string(),
                    section: Section::Dollar,
                    values: AlignedSeries {
                        values: vec![Some(17.0), Some(17.0)],
                        filled: vec![false, true],
                    },
                    format: NumberFormat::Fixed4,
                },
                ReportRow {
                    label: "CETES 28d".to_string(),
                    section: Section::Cetes,
                    values: AlignedSeries {
                        values: vec![None, Some(0.1125)],
                        filled: vec![false, false],
                    },
                    format: NumberFormat::Percent2,
                },
            ],
            uma: Some(Uma::from_daily(100.0, None, UmaSource::Manual)),
            raw: Vec::new(),
            fred: None,
        }
    }

    #[test]
    fn cells_mark_filled_values() {
        assert_eq!(cell(Some(17.0), true, NumberFormat::Fixed4), "17.0000*");
        assert_eq!(cell(Some(17.0), false, NumberFormat::Fixed4), "17.0000");
        assert_eq!(cell(None, false, NumberFormat::Fixed4), "");
    }

    #[test]
    fn report_has_sections_legend_and_uma() {
        let text = format_report(&report());
        assert!(text.contains("US DOLLAR"));
        assert!(text.contains("CETES"));
        assert!(!text.contains("EURO"));
        assert!(text.contains("04/01/2024"));
        assert!(text.contains("17.0000*"));
        assert!(text.contains("11.25%"));
        assert!(text.contains("3040.00"));
        assert!(text.contains("carried forward"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn missing_uma_is_reported() {
        let mut r = report();
        r.uma = None;
        assert!(format_report(&r).contains("UMA: unavailable"));
    }

    #[test]
    fn aligned_table_without_fills_has_no_legend() {
        let series = AlignedSeries {
            values: vec![None, Some(1.5)],
            filled: vec![false, false],
        };
        let text = format_aligned("X", &[d(4), d(5)], &series, NumberFormat::Fixed4);
        assert!(text.contains("2024-01-05"));
        assert!(text.contains("1.5000"));
        assert!(!text.contains("carried forward"));
    }

    #[test]
    fn status_table_lists_sources() {
        let text = format_status(&[SourceStatus {
            source: "banxico".to_string(),
            level: StatusLevel::Ok,
            message: "USD/MXN 17.0 on 2024-01-05".to_string(),
            latency_ms: 120,
        }]);
        assert!(text.contains("banxico"));
        assert!(text.contains("ok"));
        assert!(text.contains("120"));
    }
}
