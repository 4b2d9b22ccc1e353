//! Indicator sheet layout as a CSV grid.
//!
//! Layout: a header row with the business-day columns, then one block per
//! section (title row followed by its rows), then the UMA block. Cells carried
//! forward from an earlier date end with `*`.

use std::path::Path;

use crate::domain::Section;
use crate::error::AppError;
use crate::report::{IndicatorReport, cell};

pub fn write_layout_csv(path: &Path, report: &IndicatorReport) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::config(format!("Failed to create sheet CSV '{}': {e}", path.display())))?;
    let write_err = |e: csv::Error| AppError::config(format!("Failed to write sheet CSV: {e}"));

    let mut header = vec!["Indicadores".to_string()];
    header.extend(report.dates.iter().map(|d| d.format("%d/%m/%Y").to_string()));
    writer.write_record(&header).map_err(write_err)?;

    for section in Section::ALL {
        let rows: Vec<_> = report.rows.iter().filter(|r| r.section == section).collect();
        if rows.is_empty() {
            continue;
        }
        writer.write_record([section.title()]).map_err(write_err)?;
        for r in rows {
            let mut record = vec![r.label.clone()];
            record.extend(r.values.iter().map(|(v, filled)| cell(v, filled, r.format)));
            writer.write_record(&record).map_err(write_err)?;
        }
    }

    writer.write_record([""]).map_err(write_err)?;
    match &report.uma {
        Some(uma) => {
            writer.write_record(["UMA", uma.period.as_deref().unwrap_or("")]).map_err(write_err)?;
            for (label, value) in [("Daily", uma.daily), ("Monthly", uma.monthly), ("Annual", uma.annual)] {
                writer.write_record([label, format!("{value:.2}").as_str()]).map_err(write_err)?;
            }
        }
        None => writer.write_record(["UMA", "unavailable"]).map_err(write_err)?,
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush sheet CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{AlignedSeries, NumberFormat};
    use crate::report::{ReportRow, Uma, UmaSource};

    #[test]
    fn grid_has_sections_marks_and_uma() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let report = IndicatorReport {
            asof: d(5),
            dates: vec![d(4), d(5)],
            rows: vec![ReportRow {
                label: "EUR/USD".to_string(),
                section: Section::Euro,
                values: AlignedSeries {
                    values: vec![None, Some(1.1)],
                    filled: vec![false, true],
                },
                format: NumberFormat::Fixed6,
            }],
            uma: Some(Uma::from_daily(100.0, Some("2024".to_string()), UmaSource::Inegi)),
            raw: Vec::new(),
            fred: None,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indicadores.csv");
        write_layout_csv(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Indicadores,04/01/2024,05/01/2024");
        assert_eq!(lines[1], "EURO");
        assert_eq!(lines[2], "EUR/USD,,1.100000*");
        assert!(lines.contains(&"UMA,2024"));
        assert!(lines.contains(&"Monthly,3040.00"));
    }
}
