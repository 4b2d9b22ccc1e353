//! Export report data to CSV and JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::AppError;
use crate::report::IndicatorReport;

/// Write the recent normalized observations of every indicator as
/// `series,label,date,value` rows.
pub fn write_raw_csv(path: &Path, report: &IndicatorReport) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(create(path, "raw CSV")?);
    let write_err = |e: csv::Error| AppError::config(format!("Failed to write raw CSV: {e}"));

    writer.write_record(["series", "label", "date", "value"]).map_err(write_err)?;
    for raw in &report.raw {
        for (date, value) in &raw.points {
            writer
                .write_record([
                    raw.series_id.as_str(),
                    raw.label.as_str(),
                    date.to_string().as_str(),
                    value.to_string().as_str(),
                ])
                .map_err(write_err)?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush raw CSV: {e}")))
}

/// Write the whole report (values and fill flags) as pretty JSON.
pub fn write_report_json(path: &Path, report: &IndicatorReport) -> Result<(), AppError> {
    let file = create(path, "report JSON")?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::config(format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Write one FRED series as `date,value` rows.
pub fn write_fred_csv(path: &Path, series_id: &str, points: &[(NaiveDate, f64)]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(create(path, "FRED CSV")?);
    let write_err = |e: csv::Error| AppError::config(format!("Failed to write FRED CSV: {e}"));

    writer.write_record(["date", series_id]).map_err(write_err)?;
    for (date, value) in points {
        writer
            .write_record([date.to_string(), value.to_string()])
            .map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush FRED CSV: {e}")))
}

pub(crate) fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::config(format!("Failed to create {what} '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RawSeries;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn report() -> IndicatorReport {
        IndicatorReport {
            asof: d(5),
            dates: vec![d(5)],
            rows: Vec::new(),
            uma: None,
            raw: vec![RawSeries {
                label: "UDIS".to_string(),
                series_id: "SP68257".to_string(),
                points: vec![(d(4), 8.1), (d(5), 8.2)],
                dropped: 0,
                conflicts: Vec::new(),
            }],
            fred: None,
        }
    }

    #[test]
    fn raw_csv_has_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        write_raw_csv(&path, &report()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "series,label,date,value");
        assert_eq!(lines[1], "SP68257,UDIS,2024-01-04,8.1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn json_export_round_trips_as_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &report()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["asof"], "2024-01-05");
        assert_eq!(v["raw"][0]["series_id"], "SP68257");
        assert!(v["uma"].is_null());
    }

    #[test]
    fn fred_csv_and_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fred.csv");
        write_fred_csv(&path, "DGS10", &[(d(2), 4.33)]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "date,DGS10\n2024-01-02,4.33\n");

        let err = write_fred_csv(&dir.path().join("missing/fred.csv"), "DGS10", &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn separators_in_ids_and_labels_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fred.csv");
        write_fred_csv(&path, "DGS10,\"x\"", &[(d(2), 4.33)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("date,\"DGS10,\"\"x\"\"\""));

        let mut r = report();
        r.raw[0].label = "UDIS, valor".to_string();
        let raw_path = dir.path().join("raw.csv");
        write_raw_csv(&raw_path, &r).unwrap();
        let mut reader = csv::Reader::from_path(&raw_path).unwrap();
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(&first[1], "UDIS, valor");
    }
}
