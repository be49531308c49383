//! Run JSON read/write and boundary validation.
//!
//! A run file holds everything measured during one survey. The classifiers
//! trust their inputs, so every value is checked here first: negative or
//! non-finite readings, missing or duplicated points and oversized peak lists
//! are rejected with exit code 2.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use crate::domain::{MeasurementPoint, PointId, RunInput};
use crate::error::AppError;

/// Peaks per point the classifiers look at.
pub const MAX_PEAKS: usize = 3;

pub fn read_run_json(path: &Path) -> Result<RunInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open run JSON '{}': {e}", path.display())))?;
    let run: RunInput = serde_json::from_reader(file)
        .map_err(|e| AppError::invalid_input(format!("Invalid run JSON '{}': {e}", path.display())))?;
    Ok(run)
}

pub fn write_run_json(path: &Path, run: &RunInput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create run JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, run)
        .map_err(|e| AppError::internal(format!("Failed to write run JSON: {e}")))?;
    Ok(())
}

/// Reject inputs the classifiers are not meant to see.
pub fn validate_run(run: &RunInput) -> Result<(), AppError> {
    if !(run.rpm.is_finite() && run.rpm > 0.0) {
        return Err(AppError::invalid_input(format!("RPM must be a positive number, got {}.", run.rpm)));
    }

    validate_points(&run.points)?;

    let t = &run.bearing_temps;
    for (name, value) in [
        ("bearing_temps.pump_de", t.pump_de),
        ("bearing_temps.pump_nde", t.pump_nde),
        ("bearing_temps.motor_de", t.motor_de),
        ("bearing_temps.motor_nde", t.motor_nde),
    ] {
        ensure_non_negative(name, value)?;
    }

    let h = &run.hydraulic;
    let m = &h.measurements;
    let d = &h.design;
    for (name, value) in [
        ("hydraulic.measurements.flow_m3h", m.flow_m3h),
        ("hydraulic.measurements.motor_power_kw", m.motor_power_kw),
        ("hydraulic.design.rated_flow_m3h", d.rated_flow_m3h),
        ("hydraulic.design.rated_head_m", d.rated_head_m),
        ("hydraulic.design.bep_efficiency_pct", d.bep_efficiency_pct),
        ("hydraulic.design.npsh_required_m", d.npsh_required_m),
    ] {
        ensure_non_negative(name, value)?;
    }
    // Gauge pressure may sit slightly below atmospheric on the suction side.
    if !(m.suction_bar.is_finite() && m.suction_bar > -1.013) {
        return Err(AppError::invalid_input(
            format!("hydraulic.measurements.suction_bar must be above -1.013 bar(g), got {}.", m.suction_bar),
        ));
    }
    if !m.discharge_bar.is_finite() || m.discharge_bar < m.suction_bar {
        return Err(AppError::invalid_input(
            format!(
                "hydraulic.measurements.discharge_bar ({}) must be >= suction_bar ({}).",
                m.discharge_bar, m.suction_bar
            ),
        ));
    }
    if h.fluid.trim().is_empty() {
        return Err(AppError::invalid_input("hydraulic.fluid must name a fluid."));
    }

    let e = &run.electrical;
    for (i, v) in e.readings.voltages.iter().enumerate() {
        ensure_non_negative(&format!("electrical.readings.voltages[{i}]"), *v)?;
    }
    for (i, c) in e.readings.currents.iter().enumerate() {
        ensure_non_negative(&format!("electrical.readings.currents[{i}]"), *c)?;
    }
    ensure_non_negative("electrical.rated.voltage_v", e.rated.voltage_v)?;
    ensure_non_negative("electrical.rated.current_a", e.rated.current_a)?;

    Ok(())
}

/// Exactly one entry per survey point, each with sane readings.
pub fn validate_points(points: &[MeasurementPoint]) -> Result<(), AppError> {
    if points.is_empty() {
        return Err(AppError::insufficient_data(
            "No measurement points supplied (add `points` to the run JSON or pass --points).",
        ));
    }

    let mut seen = BTreeSet::new();
    for p in points {
        if !seen.insert(p.id) {
            return Err(AppError::invalid_input(format!("Duplicate measurement point '{}'.", p.id)));
        }
        ensure_non_negative(&format!("{} velocity", p.id), p.velocity_mm_s)?;
        ensure_non_negative(&format!("{} band1", p.id), p.bands.band1)?;
        ensure_non_negative(&format!("{} band2", p.id), p.bands.band2)?;
        ensure_non_negative(&format!("{} band3", p.id), p.bands.band3)?;
        if p.peaks.len() > MAX_PEAKS {
            return Err(AppError::invalid_input(
                format!("{}: at most {MAX_PEAKS} spectral peaks, got {}.", p.id, p.peaks.len()),
            ));
        }
        for peak in &p.peaks {
            ensure_non_negative(&format!("{} peak frequency", p.id), peak.freq_hz)?;
            ensure_non_negative(&format!("{} peak amplitude", p.id), peak.amp)?;
        }
    }

    let missing: Vec<String> = PointId::ALL
        .into_iter()
        .filter(|id| !seen.contains(id))
        .map(|id| id.label())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::invalid_input(
            format!("Missing measurement points: {}.", missing.join(", ")),
        ));
    }

    Ok(())
}

fn ensure_non_negative(name: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!("{name} must be a finite value >= 0, got {value}.")))
    }
}
