//! Points CSV ingest.
//!
//! One row per measurement point:
//!
//! ```text
//! point,velocity,band1,band2,band3,peak1_hz,peak1_amp,peak2_hz,peak2_amp,peak3_hz,peak3_amp
//! Pump DE Horizontal,6.0,0.25,0.18,0.12,29.67,4.0,59.3,0.5,,
//! ```
//!
//! Lines starting with `#` are comments. Peak columns are optional; an empty
//! cell or a zero frequency/amplitude means the peak was not measured. Bad
//! rows are skipped and reported so a single typo does not hide the rest of
//! the survey; the run is still rejected later if any of the 12 points ends up
//! missing.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{BandEnergies, MeasurementPoint, PointId, SpectralPeak};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 5] = ["point", "velocity", "band1", "band2", "band3"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub point: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct PointsIngest {
    pub points: Vec<MeasurementPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn load_points_csv(path: &Path) -> Result<PointsIngest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open points CSV '{}': {e}", path.display())))?;
    let ingest = read_points_csv(file)?;
    tracing::info!(
        path = %path.display(),
        rows = ingest.rows_read,
        points = ingest.points.len(),
        errors = ingest.row_errors.len(),
        "Loaded points CSV"
    );
    Ok(ingest)
}

pub fn read_points_csv<R: Read>(reader: R) -> Result<PointsIngest, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::invalid_input(format!("Missing required column: `{column}`")));
        }
    }

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    point: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(point) => points.push(point),
            Err(message) => row_errors.push(RowError {
                line,
                point: get(&record, &header_map, "point").map(str::to_string),
                message,
            }),
        }
    }

    for e in &row_errors {
        tracing::warn!(line = e.line, point = ?e.point, "{}", e.message);
    }

    Ok(PointsIngest {
        points,
        row_errors,
        rows_read,
    })
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

fn get<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, column: &str) -> Option<&'a str> {
    header_map
        .get(column)
        .and_then(|&idx| record.get(idx))
        .filter(|s| !s.is_empty())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<MeasurementPoint, String> {
    let label = get(record, header_map, "point").ok_or("Missing point label")?;
    let id = PointId::parse(label).ok_or_else(|| format!("Unknown measurement point '{label}'"))?;

    let velocity_mm_s = required_f64(record, header_map, "velocity")?;
    let bands = BandEnergies {
        band1: required_f64(record, header_map, "band1")?,
        band2: required_f64(record, header_map, "band2")?,
        band3: required_f64(record, header_map, "band3")?,
    };

    let mut peaks = Vec::new();
    for k in 1..=3 {
        let freq = optional_f64(record, header_map, &format!("peak{k}_hz"))?;
        let amp = optional_f64(record, header_map, &format!("peak{k}_amp"))?;
        if let (Some(freq_hz), Some(amp)) = (freq, amp) {
            if freq_hz > 0.0 && amp > 0.0 {
                peaks.push(SpectralPeak { freq_hz, amp });
            }
        }
    }

    Ok(MeasurementPoint {
        id,
        velocity_mm_s,
        bands,
        peaks,
    })
}

fn required_f64(record: &StringRecord, header_map: &HashMap<String, usize>, column: &str) -> Result<f64, String> {
    optional_f64(record, header_map, column)?.ok_or_else(|| format!("Missing `{column}`"))
}

fn optional_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    column: &str,
) -> Result<Option<f64>, String> {
    let Some(raw) = get(record, header_map, column) else {
        return Ok(None);
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid number in `{column}`: '{raw}'"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("`{column}` must be a finite value >= 0, got {raw}"));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, End, Machine};

    #[test]
    fn parses_points_with_optional_peaks() {
        let csv = "\u{feff}Point,Velocity,Band1,Band2,Band3,Peak1_Hz,Peak1_Amp,Peak2_Hz,Peak2_Amp\n\
                   Pump DE Horizontal,6.0,0.25,0.18,0.12,29.67,4.0,59.3,0.5\n\
                   motor_nde_a,1.2,0.2,0.1,0.1,,,0,0\n";
        let ingest = read_points_csv(csv.as_bytes()).unwrap();
        assert_eq!(ingest.rows_read, 2);
        assert!(ingest.row_errors.is_empty());

        let first = &ingest.points[0];
        assert_eq!(first.id, PointId::new(Machine::Pump, End::De, Direction::Horizontal));
        assert_eq!(first.peaks.len(), 2);
        assert_eq!(first.peaks[0], SpectralPeak { freq_hz: 29.67, amp: 4.0 });

        let second = &ingest.points[1];
        assert_eq!(second.id, PointId::new(Machine::Motor, End::Nde, Direction::Axial));
        assert!(!second.has_spectrum());
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let csv = "point,velocity,band1,band2,band3\n\
                   Pump DE Horizontal,abc,0.2,0.1,0.1\n\
                   Gearbox DE Horizontal,1.0,0.2,0.1,0.1\n\
                   Pump DE Vertical,1.0,0.2,-0.1,0.1\n\
                   Pump DE Axial,1.0,0.2,0.1,0.1\n";
        let ingest = read_points_csv(csv.as_bytes()).unwrap();
        assert_eq!(ingest.points.len(), 1);
        assert_eq!(ingest.row_errors.len(), 3);
        assert_eq!(ingest.row_errors[0].line, 2);
        assert_eq!(ingest.row_errors[0].point.as_deref(), Some("Pump DE Horizontal"));
        assert!(ingest.row_errors[1].message.contains("Unknown measurement point"));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "point,velocity,band1,band2\nPump DE Horizontal,1.0,0.2,0.1\n";
        let err = read_points_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("band3"));
    }
}
