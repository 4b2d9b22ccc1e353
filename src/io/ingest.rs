//! CSV ingest of raw observations for offline alignment.
//!
//! The file needs a `date` and a `value` column (Banxico's `fecha`/`dato` are
//! accepted too). Nothing is parsed here beyond CSV structure: values reach
//! `series::normalize` as text, exactly like a provider response would.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::RawObservation;
use crate::error::AppError;

const DATE_COLUMNS: [&str; 2] = ["date", "fecha"];
const VALUE_COLUMNS: [&str; 2] = ["value", "dato"];

/// Read `date,value` rows from a CSV file.
pub fn read_observations_csv(path: &Path) -> Result<Vec<RawObservation>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = find_column(&header_map, &DATE_COLUMNS)
        .ok_or_else(|| AppError::config("CSV is missing a 'date' column."))?;
    let value_idx = find_column(&header_map, &VALUE_COLUMNS)
        .ok_or_else(|| AppError::config("CSV is missing a 'value' column."))?;

    let mut out = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable CSV row");
                continue;
            }
        };
        let Some(date) = record.get(date_idx).filter(|d| !d.is_empty()) else {
            warn!(line, "skipping CSV row without a date");
            continue;
        };
        let value = record.get(value_idx).filter(|v| !v.is_empty());
        out.push(RawObservation::new(date, value));
    }

    debug!(path = %path.display(), rows = out.len(), "read observations CSV");
    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_rows_as_text() {
        let f = write_csv("\u{feff}Date, Value\n2024-01-02,\"17,050.5\"\n03/01/2024,N/E\n2024-01-04,\n");
        let obs = read_observations_csv(f.path()).unwrap();
        assert_eq!(
            obs,
            vec![
                RawObservation::new("2024-01-02", Some("17,050.5")),
                RawObservation::new("03/01/2024", Some("N/E")),
                RawObservation::new("2024-01-04", None),
            ]
        );
    }

    #[test]
    fn accepts_banxico_column_names_and_skips_dateless_rows() {
        let f = write_csv("fecha,dato,extra\n,1.0\n02/01/2024,2.0,x\n");
        let obs = read_observations_csv(f.path()).unwrap();
        assert_eq!(obs, vec![RawObservation::new("02/01/2024", Some("2.0"))]);
    }

    #[test]
    fn missing_columns_and_files_are_config_errors() {
        let f = write_csv("day,price\n2024-01-02,1\n");
        assert_eq!(read_observations_csv(f.path()).unwrap_err().exit_code(), 2);
        assert_eq!(
            read_observations_csv(Path::new("/nonexistent/obs.csv")).unwrap_err().exit_code(),
            2
        );
    }
}
