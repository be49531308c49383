//! Survey triage: which points need a spectrum, and headline counts.

use serde::{Deserialize, Serialize};

use crate::catalog::ThresholdCatalog;
use crate::domain::{MeasurementPoint, PointId};

/// Headline counts over one survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemSummary {
    pub points: usize,
    /// Velocity above Zone B.
    pub above_zone_b: usize,
    /// Velocity above the Zone D danger limit.
    pub danger: usize,
    /// Band3 above twice its baseline.
    pub band3_alerts: usize,
    pub with_spectrum: usize,
}

fn needs_spectrum(point: &MeasurementPoint, catalog: &ThresholdCatalog) -> bool {
    point.velocity_mm_s > catalog.velocity.zone_b
        || point.bands.band3 > 2.0 * catalog.accel_baseline.band3
}

/// Points whose overall readings warrant an FFT before the verdict is trusted.
///
/// Points that already carry a spectrum are included; the caller decides
/// whether to re-measure.
pub fn points_requiring_spectrum(points: &[MeasurementPoint], catalog: &ThresholdCatalog) -> Vec<PointId> {
    points
        .iter()
        .filter(|p| needs_spectrum(p, catalog))
        .map(|p| p.id)
        .collect()
}

pub fn summarize(points: &[MeasurementPoint], catalog: &ThresholdCatalog) -> SystemSummary {
    let zones = &catalog.velocity;
    let band3_limit = 2.0 * catalog.accel_baseline.band3;
    SystemSummary {
        points: points.len(),
        above_zone_b: points.iter().filter(|p| p.velocity_mm_s > zones.zone_b).count(),
        danger: points.iter().filter(|p| p.velocity_mm_s > zones.zone_d).count(),
        band3_alerts: points.iter().filter(|p| p.bands.band3 > band3_limit).count(),
        with_spectrum: points.iter().filter(|p| p.has_spectrum()).count(),
    }
}
