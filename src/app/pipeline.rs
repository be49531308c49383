//! The analysis workflow shared by every front-end:
//! validate -> classify points (parallel) -> aggregate + hydraulic + electrical
//! (parallel) -> correlate -> triage.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::ThresholdCatalog;
use crate::diagnose::{
    SystemSummary, SystemVerdict, aggregate_system, classify_electrical, classify_hydraulic,
    classify_point, correlate, points_requiring_spectrum, summarize,
};
use crate::domain::{DomainResult, IntegratedResult, MeasurementPoint, PointId, RunInput};
use crate::error::AppError;
use crate::io::run_file::validate_run;

/// Everything computed for one run. Serialized as the `--export` JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub machine_id: String,
    pub rpm: f64,
    pub generated_at: chrono::DateTime<chrono::Local>,
    /// Measurement points in survey order.
    pub points: Vec<MeasurementPoint>,
    /// Per-point mechanical verdicts, aligned with `points`.
    pub point_results: Vec<DomainResult>,
    pub mechanical: SystemVerdict,
    pub integrated: IntegratedResult,
    pub summary: SystemSummary,
    pub spectrum_requests: Vec<PointId>,
}

impl AnalysisOutput {
    pub fn hydraulic(&self) -> &DomainResult {
        &self.integrated.domain_breakdown.hydraulic
    }

    pub fn electrical(&self) -> &DomainResult {
        &self.integrated.domain_breakdown.electrical
    }
}

/// Run the full analysis for one validated input.
pub fn run_analysis(input: &RunInput, catalog: &ThresholdCatalog) -> Result<AnalysisOutput, AppError> {
    validate_run(input)?;

    let fluid = catalog.fluid(&input.hydraulic.fluid).ok_or_else(|| {
        let known: Vec<&str> = catalog.fluids.keys().map(String::as_str).collect();
        AppError::invalid_input(
            format!(
                "Unknown fluid '{}'. Known fluids: {}.",
                input.hydraulic.fluid,
                known.join(", ")
            ),
        )
    })?;

    let mut points = input.points.clone();
    points.sort_by_key(|p| p.id);

    let rpm_hz = input.rpm_hz();
    let temps = &input.bearing_temps;

    let point_results: Vec<DomainResult> = points
        .par_iter()
        .map(|p| classify_point(p, rpm_hz, p.has_spectrum(), temps, catalog))
        .collect();

    let h = &input.hydraulic;
    let e = &input.electrical;
    let (mechanical, (hydraulic, electrical)) = rayon::join(
        || aggregate_system(&point_results, catalog),
        || {
            rayon::join(
                || classify_hydraulic(&h.measurements, &h.design, fluid, &h.observations, catalog),
                || classify_electrical(&e.readings, &e.rated, catalog),
            )
        },
    );

    let integrated = correlate(&mechanical.result, &hydraulic, &electrical, temps, catalog);

    tracing::info!(
        machine = %input.machine_id,
        diagnosis = %integrated.diagnosis,
        confidence = integrated.confidence,
        severity = %integrated.severity,
        "Analysis complete"
    );

    Ok(AnalysisOutput {
        machine_id: input.machine_id.clone(),
        rpm: input.rpm,
        generated_at: chrono::Local::now(),
        summary: summarize(&points, catalog),
        spectrum_requests: points_requiring_spectrum(&points, catalog),
        points,
        point_results,
        mechanical,
        integrated,
    })
}
