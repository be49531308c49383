//! Per-point mechanical rule engine.
//!
//! A point is checked against an ordered rule table. Low-frequency rules read
//! the spectral peaks (and only run when a spectrum was taken); bearing rules
//! read the acceleration band energies. The first rule that matches decides
//! the point; when none match the point is either Normal (velocity within
//! Zone B) or Unclassified.
//!
//! | order | rule              | applies to     | evidence                         |
//! |-------|-------------------|----------------|----------------------------------|
//! | 1     | unbalance         | radial, FFT    | 1× dominates total peak energy   |
//! | 2     | misalignment      | axial, FFT     | strong 2× relative to 1×         |
//! | 3     | looseness         | vertical, FFT  | slow decay of 1×/2×/3× harmonics |
//! | 4     | bearing early     | any            | Band3 high, Band1/2 quiet        |
//! | 5     | bearing developed | any            | Band2 high, Band3 still raised   |
//! | 6     | bearing severe    | any            | Band1 high with Band2 raised     |

use crate::catalog::ThresholdCatalog;
use crate::domain::{
    BandRatios, BearingTemps, Diagnosis, Direction, Domain, DomainDetails, DomainResult,
    FaultType, Harmonics, MeasurementPoint, MechanicalDetails, MechanicalDiagnosis,
    MechanicalRule, Severity, SpectralPeak,
};

/// Rule precedence. Earlier entries shadow later ones.
pub const RULES: [MechanicalRule; 6] = [
    MechanicalRule::Unbalance,
    MechanicalRule::Misalignment,
    MechanicalRule::Looseness,
    MechanicalRule::BearingEarly,
    MechanicalRule::BearingDeveloped,
    MechanicalRule::BearingSevere,
];

/// Inputs shared by every rule for one point.
struct PointContext<'a> {
    point: &'a MeasurementPoint,
    has_spectrum: bool,
    bearing_temp: Option<f64>,
    harmonics: Harmonics,
    total_peak_amp: f64,
    ratios: BandRatios,
    catalog: &'a ThresholdCatalog,
}

#[derive(Debug, Clone, Copy)]
struct Verdict {
    diagnosis: MechanicalDiagnosis,
    confidence: u8,
    severity: Severity,
}

/// Classify one measurement point.
///
/// `rpm_hz` is the running frequency (1×). `has_spectrum` gates the
/// low-frequency rules; without it the peaks are ignored.
pub fn classify_point(
    point: &MeasurementPoint,
    rpm_hz: f64,
    has_spectrum: bool,
    temps: &BearingTemps,
    catalog: &ThresholdCatalog,
) -> DomainResult {
    let tolerance = catalog.rules.harmonic_tolerance;
    let harmonics = if has_spectrum {
        Harmonics {
            one_x: harmonic_amp(&point.peaks, 1, rpm_hz, tolerance),
            two_x: harmonic_amp(&point.peaks, 2, rpm_hz, tolerance),
            three_x: harmonic_amp(&point.peaks, 3, rpm_hz, tolerance),
        }
    } else {
        Harmonics::default()
    };

    let ctx = PointContext {
        point,
        has_spectrum,
        bearing_temp: temps.get(point.id.machine, point.id.end),
        harmonics,
        total_peak_amp: point.peaks.iter().map(|p| p.amp).sum(),
        ratios: band_ratios(point, catalog),
        catalog,
    };

    let fired = RULES
        .iter()
        .find_map(|&rule| evaluate(rule, &ctx).map(|verdict| (rule, verdict)));

    match fired {
        Some((rule, verdict)) => {
            tracing::debug!(
                point = %point.id,
                rule = ?rule,
                confidence = verdict.confidence,
                severity = %verdict.severity,
                "Mechanical rule fired"
            );
            build_result(&ctx, Some(rule), verdict)
        }
        None => build_result(&ctx, None, default_verdict(&ctx)),
    }
}

fn evaluate(rule: MechanicalRule, ctx: &PointContext<'_>) -> Option<Verdict> {
    match rule {
        MechanicalRule::Unbalance => unbalance(ctx),
        MechanicalRule::Misalignment => misalignment(ctx),
        MechanicalRule::Looseness => looseness(ctx),
        MechanicalRule::BearingEarly => bearing_early(ctx),
        MechanicalRule::BearingDeveloped => bearing_developed(ctx),
        MechanicalRule::BearingSevere => bearing_severe(ctx),
    }
}

fn unbalance(ctx: &PointContext<'_>) -> Option<Verdict> {
    if !(ctx.has_spectrum && ctx.point.id.is_radial()) {
        return None;
    }
    let rules = &ctx.catalog.rules;
    let a1 = ctx.harmonics.one_x.filter(|&a| a > 0.0)?;
    if a1 <= rules.unbalance_energy_share * ctx.total_peak_amp {
        return None;
    }

    let zones = &ctx.catalog.velocity;
    let v = ctx.point.velocity_mm_s;
    let severity = if v > zones.zone_c {
        Severity::High
    } else if v > zones.zone_b {
        Severity::Medium
    } else {
        Severity::Low
    };

    Some(Verdict {
        diagnosis: MechanicalDiagnosis::Unbalance,
        confidence: rules.unbalance.score(a1 / rules.unbalance_amp_reference, 0),
        severity,
    })
}

fn misalignment(ctx: &PointContext<'_>) -> Option<Verdict> {
    if !(ctx.has_spectrum && ctx.point.id.direction == Direction::Axial) {
        return None;
    }
    let a1 = ctx.harmonics.one_x?;
    let a2 = ctx.harmonics.two_x?;
    if a2 <= 0.5 * a1 {
        return None;
    }

    let rules = &ctx.catalog.rules;
    let confidence = if a1 > 0.0 {
        rules.misalignment.score(a2 / a1, 0)
    } else {
        rules.misalignment.score(0.0, 0)
    };

    Some(Verdict {
        diagnosis: MechanicalDiagnosis::Misalignment,
        confidence,
        severity: above_zone_c(ctx),
    })
}

fn looseness(ctx: &PointContext<'_>) -> Option<Verdict> {
    if !(ctx.has_spectrum && ctx.point.id.direction == Direction::Vertical) {
        return None;
    }
    let a1 = ctx.harmonics.one_x?;
    let a2 = ctx.harmonics.two_x?;
    let a3 = ctx.harmonics.three_x?;
    if !(a1 > 0.0 && a2 > 0.5 * a1 && a3 > 0.3 * a1) {
        return None;
    }

    Some(Verdict {
        diagnosis: MechanicalDiagnosis::Looseness,
        confidence: ctx.catalog.rules.looseness.score(a2 / a1 + a3 / a1, 0),
        severity: above_zone_c(ctx),
    })
}

fn bearing_early(ctx: &PointContext<'_>) -> Option<Verdict> {
    let r = ctx.ratios;
    if !(r.band3 > 2.0 && r.band2 < 1.5 && r.band1 < 1.5) {
        return None;
    }

    Some(Verdict {
        diagnosis: MechanicalDiagnosis::BearingEarly,
        confidence: ctx
            .catalog
            .rules
            .bearing_early
            .score(r.band3 - 2.0, bearing_bonus(ctx)),
        severity: if r.band3 > 3.0 { Severity::Medium } else { Severity::Low },
    })
}

fn bearing_developed(ctx: &PointContext<'_>) -> Option<Verdict> {
    let r = ctx.ratios;
    if !(r.band2 > 2.0 && r.band3 > 1.5 && r.band1 < 1.5) {
        return None;
    }

    Some(Verdict {
        diagnosis: MechanicalDiagnosis::BearingDeveloped,
        confidence: ctx
            .catalog
            .rules
            .bearing_developed
            .score(r.band2 - 2.0, bearing_bonus(ctx)),
        severity: if r.band2 > 3.0 { Severity::High } else { Severity::Medium },
    })
}

fn bearing_severe(ctx: &PointContext<'_>) -> Option<Verdict> {
    let r = ctx.ratios;
    if !(r.band1 > 2.5 && r.band2 > 1.5) {
        return None;
    }

    Some(Verdict {
        diagnosis: MechanicalDiagnosis::BearingSevere,
        confidence: ctx.catalog.rules.bearing_severe.score(r.band1 - 2.5, 0),
        severity: Severity::High,
    })
}

fn default_verdict(ctx: &PointContext<'_>) -> Verdict {
    if ctx.point.velocity_mm_s <= ctx.catalog.velocity.zone_b {
        Verdict {
            diagnosis: MechanicalDiagnosis::Normal,
            confidence: 99,
            severity: Severity::Low,
        }
    } else {
        // A spectrum that matches no signature is itself evidence.
        Verdict {
            diagnosis: MechanicalDiagnosis::Unclassified,
            confidence: if ctx.has_spectrum { 40 } else { 30 },
            severity: Severity::Medium,
        }
    }
}

/// Confirmation bonus for band-only bearing calls.
fn bearing_bonus(ctx: &PointContext<'_>) -> i32 {
    let rules = &ctx.catalog.rules;
    let mut bonus = 0;
    if ctx.has_spectrum {
        bonus += rules.spectrum_bonus;
    }
    if ctx
        .bearing_temp
        .is_some_and(|t| t > ctx.catalog.temperature.elevated_min)
    {
        bonus += rules.temperature_bonus;
    }
    bonus
}

fn above_zone_c(ctx: &PointContext<'_>) -> Severity {
    if ctx.point.velocity_mm_s > ctx.catalog.velocity.zone_c {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn build_result(ctx: &PointContext<'_>, rule: Option<MechanicalRule>, verdict: Verdict) -> DomainResult {
    let fault_type = match rule {
        Some(MechanicalRule::Unbalance | MechanicalRule::Misalignment | MechanicalRule::Looseness) => {
            Some(FaultType::LowFreq)
        }
        Some(_) => Some(FaultType::HighFreq),
        None if verdict.diagnosis == MechanicalDiagnosis::Normal => Some(FaultType::Normal),
        None => None,
    };

    DomainResult {
        diagnosis: Diagnosis::Mechanical(verdict.diagnosis),
        confidence: verdict.confidence,
        severity: verdict.severity,
        fault_type,
        domain: Domain::Mechanical,
        location: ctx.point.id.label(),
        details: DomainDetails::Mechanical(MechanicalDetails {
            point: Some(ctx.point.id),
            velocity_mm_s: ctx.point.velocity_mm_s,
            zone: ctx.catalog.velocity.zone_of(ctx.point.velocity_mm_s),
            band_ratios: ctx.ratios,
            harmonics: ctx.harmonics,
            rule,
            supporting_points: Vec::new(),
        }),
    }
}

/// Amplitude of the first peak within `tolerance × rpm_hz` of the k-th harmonic.
pub fn harmonic_amp(peaks: &[SpectralPeak], k: u32, rpm_hz: f64, tolerance: f64) -> Option<f64> {
    if !(rpm_hz.is_finite() && rpm_hz > 0.0) {
        return None;
    }
    let target = k as f64 * rpm_hz;
    let window = tolerance * rpm_hz;
    peaks
        .iter()
        .find(|p| (p.freq_hz - target).abs() < window)
        .map(|p| p.amp)
}

fn band_ratios(point: &MeasurementPoint, catalog: &ThresholdCatalog) -> BandRatios {
    let base = &catalog.accel_baseline;
    BandRatios {
        band1: ratio(point.bands.band1, base.band1),
        band2: ratio(point.bands.band2, base.band2),
        band3: ratio(point.bands.band3, base.band3),
    }
}

fn ratio(value: f64, baseline: f64) -> f64 {
    if baseline > 0.0 { value / baseline } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::{BandEnergies, End, Machine, PointId};

    const RPM_HZ: f64 = 1780.0 / 60.0;

    fn point(direction: Direction, velocity: f64, bands: [f64; 3], peaks: &[(f64, f64)]) -> MeasurementPoint {
        MeasurementPoint {
            id: PointId::new(Machine::Pump, End::De, direction),
            velocity_mm_s: velocity,
            bands: BandEnergies {
                band1: bands[0],
                band2: bands[1],
                band3: bands[2],
            },
            peaks: peaks
                .iter()
                .map(|&(freq_hz, amp)| SpectralPeak { freq_hz, amp })
                .collect(),
        }
    }

    fn quiet_bands() -> [f64; 3] {
        [0.2, 0.15, 0.1]
    }

    fn classify(p: &MeasurementPoint) -> DomainResult {
        classify_point(p, RPM_HZ, p.has_spectrum(), &BearingTemps::default(), &ThresholdCatalog::default())
    }

    fn diagnosis(r: &DomainResult) -> MechanicalDiagnosis {
        r.diagnosis.as_mechanical().unwrap()
    }

    #[test]
    fn unbalance_example_medium_severity() {
        let p = point(
            Direction::Horizontal,
            6.0,
            quiet_bands(),
            &[(29.67, 4.0), (59.3, 0.5), (88.9, 0.2)],
        );
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Unbalance);
        assert_eq!(r.confidence, 79);
        assert_eq!(r.severity, Severity::Medium);
        assert_eq!(r.fault_type, Some(FaultType::LowFreq));
        assert_eq!(r.location, "Pump DE Horizontal");
    }

    #[test]
    fn unbalance_severity_follows_velocity_zones() {
        let peaks = [(29.67, 4.0), (59.3, 0.5)];
        let low = classify(&point(Direction::Vertical, 3.0, quiet_bands(), &peaks));
        let high = classify(&point(Direction::Vertical, 8.0, quiet_bands(), &peaks));
        assert_eq!(low.severity, Severity::Low);
        assert_eq!(high.severity, Severity::High);
    }

    #[test]
    fn unbalance_ignored_on_axial_points() {
        let p = point(Direction::Axial, 6.0, quiet_bands(), &[(29.67, 4.0), (59.3, 0.5)]);
        let r = classify(&p);
        assert_ne!(diagnosis(&r), MechanicalDiagnosis::Unbalance);
    }

    #[test]
    fn spectrum_rules_need_spectrum_flag() {
        let p = point(Direction::Horizontal, 6.0, quiet_bands(), &[(29.67, 4.0)]);
        let r = classify_point(&p, RPM_HZ, false, &BearingTemps::default(), &ThresholdCatalog::default());
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Unclassified);
        assert_eq!(r.confidence, 30);
        assert_eq!(r.fault_type, None);
    }

    #[test]
    fn misalignment_on_axial_point() {
        let p = point(Direction::Axial, 8.0, quiet_bands(), &[(29.7, 3.0), (59.3, 2.4), (120.0, 0.3)]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Misalignment);
        // 65 + round(0.8 × 20) = 81
        assert_eq!(r.confidence, 81);
        assert_eq!(r.severity, Severity::High);
    }

    #[test]
    fn weak_second_harmonic_is_not_misalignment() {
        let p = point(Direction::Axial, 3.0, quiet_bands(), &[(29.7, 3.0), (59.3, 1.0)]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Normal);
    }

    #[test]
    fn looseness_on_vertical_point() {
        // 1× is not dominant (2/4.4 < 70 %), so unbalance does not shadow it.
        let p = point(Direction::Vertical, 5.0, quiet_bands(), &[(29.7, 2.0), (59.3, 1.4), (89.0, 1.0)]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Looseness);
        // 60 + round((0.7 + 0.5) × 15) = 78
        assert_eq!(r.confidence, 78);
        assert_eq!(r.severity, Severity::Medium);
    }

    #[test]
    fn looseness_needs_all_three_harmonics() {
        let p = point(Direction::Vertical, 5.0, quiet_bands(), &[(29.7, 2.0), (59.3, 1.4), (140.0, 1.0)]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Unclassified);
        assert_eq!(r.confidence, 40);
    }

    #[test]
    fn bearing_early_from_band3_only() {
        // Band3 = 0.42 g → ratio 2.8.
        let p = point(Direction::Horizontal, 2.0, [0.2, 0.2, 0.42], &[]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::BearingEarly);
        // 60 + round(0.8 × 10) = 68
        assert_eq!(r.confidence, 68);
        assert_eq!(r.severity, Severity::Low);
        assert_eq!(r.fault_type, Some(FaultType::HighFreq));
    }

    #[test]
    fn bearing_early_gains_spectrum_and_temperature_bonus() {
        let p = point(Direction::Horizontal, 2.0, [0.2, 0.2, 0.42], &[(500.0, 0.3)]);
        let temps = BearingTemps {
            pump_de: 75.0,
            ..BearingTemps::default()
        };
        let r = classify_point(&p, RPM_HZ, true, &temps, &ThresholdCatalog::default());
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::BearingEarly);
        // 68 + 10 + 10, capped at 85
        assert_eq!(r.confidence, 85);
    }

    #[test]
    fn bearing_developed_from_band2() {
        // Band2 ratio 3.5, Band3 ratio 2.0 (not early because Band2 is high).
        let p = point(Direction::Axial, 3.0, [0.3, 0.7, 0.3], &[]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::BearingDeveloped);
        // 70 + round(1.5 × 8) = 82
        assert_eq!(r.confidence, 82);
        assert_eq!(r.severity, Severity::High);
    }

    #[test]
    fn bearing_severe_always_high() {
        let p = point(Direction::Horizontal, 3.0, [0.9, 0.4, 0.2], &[]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::BearingSevere);
        // 80 + round(0.5 × 6) = 83
        assert_eq!(r.confidence, 83);
        assert_eq!(r.severity, Severity::High);
    }

    #[test]
    fn low_frequency_rules_take_precedence_over_bearing_rules() {
        let p = point(Direction::Horizontal, 6.0, [0.2, 0.2, 0.6], &[(29.67, 4.0), (59.3, 0.5)]);
        let r = classify(&p);
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Unbalance);
        let details = r.details.as_mechanical().unwrap();
        assert_matches!(details.rule, Some(MechanicalRule::Unbalance));
    }

    #[test]
    fn quiet_point_is_normal() {
        let r = classify(&point(Direction::Horizontal, 1.0, quiet_bands(), &[]));
        assert_eq!(diagnosis(&r), MechanicalDiagnosis::Normal);
        assert_eq!(r.confidence, 99);
        assert_eq!(r.severity, Severity::Low);
        assert_eq!(r.fault_type, Some(FaultType::Normal));
        assert!(!r.is_fault());
    }

    #[test]
    fn zero_rpm_matches_no_harmonic() {
        assert_eq!(harmonic_amp(&[SpectralPeak { freq_hz: 0.0, amp: 1.0 }], 1, 0.0, 0.05), None);
    }

    #[test]
    fn classification_is_deterministic() {
        let p = point(Direction::Axial, 8.0, [0.5, 0.4, 0.3], &[(29.7, 3.0), (59.3, 2.4)]);
        assert_eq!(classify(&p), classify(&p));
    }
}
