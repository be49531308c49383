//! Export the analysis result.
//!
//! - JSON: the full `AnalysisOutput` (inputs in survey order, every per-point
//!   verdict, the mechanical vote, the integrated verdict with its breakdown).
//! - CSV: one row per measurement point for spreadsheets. The point columns
//!   match the points CSV ingest layout, so the file can be fed back with
//!   `--points`. Run metadata and the survey summary are `#` comment lines.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{DomainResult, MeasurementPoint};
use crate::error::AppError;

pub fn write_analysis_json(path: &Path, output: &AnalysisOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, output)
        .map_err(|e| AppError::internal(format!("Failed to write export JSON: {e}")))?;
    tracing::info!(path = %path.display(), "Wrote analysis export");
    Ok(())
}

pub fn read_analysis_json(path: &Path) -> Result<AnalysisOutput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open export JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::invalid_input(format!("Invalid export JSON: {e}")))
}

/// One row of the per-point CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRow {
    pub point: String,
    pub velocity: f64,
    pub band1: f64,
    pub band2: f64,
    pub band3: f64,
    pub peak1_hz: Option<f64>,
    pub peak1_amp: Option<f64>,
    pub peak2_hz: Option<f64>,
    pub peak2_amp: Option<f64>,
    pub peak3_hz: Option<f64>,
    pub peak3_amp: Option<f64>,
    pub zone: String,
    pub diagnosis: String,
    pub confidence: u8,
    pub severity: String,
}

impl PointRow {
    fn new(point: &MeasurementPoint, result: &DomainResult) -> Self {
        let peak = |k: usize| point.peaks.get(k);
        Self {
            point: point.id.label(),
            velocity: point.velocity_mm_s,
            band1: point.bands.band1,
            band2: point.bands.band2,
            band3: point.bands.band3,
            peak1_hz: peak(0).map(|p| p.freq_hz),
            peak1_amp: peak(0).map(|p| p.amp),
            peak2_hz: peak(1).map(|p| p.freq_hz),
            peak2_amp: peak(1).map(|p| p.amp),
            peak3_hz: peak(2).map(|p| p.freq_hz),
            peak3_amp: peak(2).map(|p| p.amp),
            zone: result
                .details
                .as_mechanical()
                .map(|d| format!("{:?}", d.zone))
                .unwrap_or_default(),
            diagnosis: result.diagnosis.to_string(),
            confidence: result.confidence,
            severity: result.severity.label().to_string(),
        }
    }
}

/// Write the per-point CSV report.
pub fn write_points_csv(path: &Path, output: &AnalysisOutput) -> Result<(), AppError> {
    let write_err = |e: std::io::Error| AppError::internal(format!("Failed to write points CSV: {e}"));

    let mut file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create points CSV '{}': {e}", path.display())))?;
    writeln!(file, "# machine: {}", output.machine_id).map_err(write_err)?;
    writeln!(file, "# rpm: {} (1x = {:.2} Hz)", output.rpm, output.rpm / 60.0).map_err(write_err)?;
    writeln!(file, "# generated: {}", output.generated_at.to_rfc3339()).map_err(write_err)?;

    let mut writer = csv::Writer::from_writer(file);
    for (point, result) in output.points.iter().zip(&output.point_results) {
        writer
            .serialize(PointRow::new(point, result))
            .map_err(|e| AppError::internal(format!("Failed to write points CSV row: {e}")))?;
    }
    let mut file = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("Failed to flush points CSV: {e}")))?;

    let s = &output.summary;
    writeln!(file, "# points above zone B: {}/{}", s.above_zone_b, s.points).map_err(write_err)?;
    writeln!(file, "# band3 bearing alerts: {}/{}", s.band3_alerts, s.points).map_err(write_err)?;
    writeln!(
        file,
        "# system: {} ({}%, {})",
        output.mechanical.result.diagnosis,
        output.mechanical.result.confidence,
        output.mechanical.result.severity.label()
    )
    .map_err(write_err)?;

    tracing::info!(path = %path.display(), rows = output.points.len(), "Wrote points CSV");
    Ok(())
}
