//! Cross-domain correlation.
//!
//! Fuses the three finalized domain verdicts and the bearing temperatures into
//! one machine-level verdict. Known causal chains add confidence when every
//! link is present:
//!
//! - A: supply voltage problem → misalignment/looseness → head loss
//! - B: cavitation → bearing wear → current unbalance
//! - C: motor overload while the pump loses efficiency

use crate::catalog::ThresholdCatalog;
use crate::domain::{
    BearingTemps, CausalPattern, DomainBreakdown, DomainResult, ElectricalDiagnosis, FaultType,
    IntegratedResult, MechanicalDiagnosis, Severity,
};

use super::aggregate::SYSTEM_LOCATION;
use super::temperature::{TempZone, adjust_for_temperature};

pub const NO_CORRELATION: &str = "No Cross-Domain Correlation Detected";

/// Maximum integrated confidence.
pub const MAX_CONFIDENCE: i32 = 95;

const PATTERNS: [CausalPattern; 3] = [
    CausalPattern::ElectricalMechanicalHydraulic,
    CausalPattern::CavitationCascade,
    CausalPattern::InternalLoss,
];

pub fn correlate(
    mech: &DomainResult,
    hyd: &DomainResult,
    elec: &DomainResult,
    temps: &BearingTemps,
    catalog: &ThresholdCatalog,
) -> IntegratedResult {
    let rules = &catalog.rules;
    let mut patterns = Vec::new();
    let mut correlation_notes = Vec::new();
    let mut bonus = 0;

    for pattern in PATTERNS {
        if let Some(note) = check_pattern(pattern, mech, hyd, elec, catalog) {
            bonus += match pattern {
                CausalPattern::ElectricalMechanicalHydraulic => rules.pattern_a_bonus,
                CausalPattern::CavitationCascade => rules.pattern_b_bonus,
                CausalPattern::InternalLoss => rules.pattern_c_bonus,
            };
            tracing::debug!(pattern = pattern.label(), "Causal pattern matched");
            patterns.push(pattern);
            correlation_notes.push(note);
        }
    }

    let domains = [mech, hyd, elec];
    if patterns.is_empty() {
        let faults: Vec<&str> = domains
            .iter()
            .filter(|r| r.is_fault())
            .map(|r| r.domain.label())
            .collect();
        if faults.len() > 1 {
            correlation_notes.push(format!(
                "{} faults show no known causal link; treat them independently",
                faults.join(" and ")
            ));
        }
    }

    let temperature = adjust_for_temperature(temps, mech.is_fault(), catalog);

    let base = floor_mean_nonzero(domains.iter().map(|r| r.confidence));
    let confidence = (base + bonus + temperature.bonus).clamp(0, MAX_CONFIDENCE) as u8;

    let mut severity = domains
        .iter()
        .map(|r| r.severity)
        .max()
        .unwrap_or(Severity::Low);
    if temperature.max_zone == Some(TempZone::Critical) {
        severity = Severity::High;
    }

    let (diagnosis, location) = match patterns.first() {
        Some(&pattern) => (pattern.label().to_string(), pattern_origin(pattern, hyd, elec).location.clone()),
        None => (
            NO_CORRELATION.to_string(),
            dominant(&domains).map_or_else(|| SYSTEM_LOCATION.to_string(), |r| r.location.clone()),
        ),
    };

    IntegratedResult {
        diagnosis,
        confidence,
        severity,
        location,
        patterns,
        correlation_notes,
        temperature_adjustment: temperature.bonus,
        temperature_notes: temperature.notes,
        domain_breakdown: DomainBreakdown {
            mechanical: mech.clone(),
            hydraulic: hyd.clone(),
            electrical: elec.clone(),
        },
    }
}

/// Returns the explanatory note when every link of `pattern` is present.
fn check_pattern(
    pattern: CausalPattern,
    mech: &DomainResult,
    hyd: &DomainResult,
    elec: &DomainResult,
    catalog: &ThresholdCatalog,
) -> Option<String> {
    let mech_diag = mech.diagnosis.as_mechanical();
    match pattern {
        CausalPattern::ElectricalMechanicalHydraulic => {
            let head_dev = hyd.details.as_hydraulic()?.head_deviation_pct;
            let coupled = matches!(
                mech_diag,
                Some(MechanicalDiagnosis::Misalignment | MechanicalDiagnosis::Looseness)
            );
            (elec.fault_type == Some(FaultType::Voltage)
                && coupled
                && head_dev < -catalog.rules.deviation_band_pct)
                .then(|| {
                    format!(
                        "{} is driving {} and a {head_dev:.1} % head loss",
                        elec.diagnosis, mech.diagnosis
                    )
                })
        }
        CausalPattern::CavitationCascade => {
            let current_unbalance = elec.details.as_electrical()?.current_unbalance_pct;
            let wear = mech_diag.is_some_and(MechanicalDiagnosis::is_bearing_wear);
            (hyd.fault_type == Some(FaultType::Cavitation)
                && wear
                && current_unbalance > catalog.rules.pattern_b_current_unbalance_pct)
                .then(|| {
                    format!(
                        "Cavitation is wearing the bearings ({}) and unbalancing motor current ({current_unbalance:.1} %)",
                        mech.diagnosis
                    )
                })
        }
        CausalPattern::InternalLoss => (elec.diagnosis.as_electrical() == Some(ElectricalDiagnosis::OverLoad)
            && hyd.fault_type == Some(FaultType::Efficiency))
            .then(|| "Motor is overloaded while the pump loses efficiency; inspect for internal recirculation or rubbing".to_string()),
    }
}

fn pattern_origin<'a>(pattern: CausalPattern, hyd: &'a DomainResult, elec: &'a DomainResult) -> &'a DomainResult {
    match pattern {
        CausalPattern::ElectricalMechanicalHydraulic | CausalPattern::InternalLoss => elec,
        CausalPattern::CavitationCascade => hyd,
    }
}

/// Most severe faulty domain; ties go to higher confidence, then input order.
fn dominant<'a>(domains: &[&'a DomainResult]) -> Option<&'a DomainResult> {
    let mut best: Option<&DomainResult> = None;
    for &r in domains.iter().filter(|r| r.is_fault()) {
        if best.is_none_or(|b| (r.severity, r.confidence) > (b.severity, b.confidence)) {
            best = Some(r);
        }
    }
    best
}

fn floor_mean_nonzero(values: impl Iterator<Item = u8>) -> i32 {
    let (sum, n) = values
        .filter(|&v| v > 0)
        .fold((0i32, 0i32), |(s, n), v| (s + v as i32, n + 1));
    if n == 0 { 0 } else { sum / n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnose::electrical::classify_electrical;
    use crate::diagnose::hydraulic::classify_hydraulic;
    use crate::domain::{
        DesignReference, Diagnosis, Domain, DomainDetails, FluidProperties, FluidRisk,
        HydraulicDiagnosis, HydraulicMeasurements, MechanicalDetails, NoiseType, Observations,
        RatedElectrical, ThreePhaseReadings, VelocityZone,
    };

    fn mech(diagnosis: MechanicalDiagnosis, confidence: u8, severity: Severity) -> DomainResult {
        let fault_type = match diagnosis {
            MechanicalDiagnosis::Normal => Some(FaultType::Normal),
            MechanicalDiagnosis::Unclassified => None,
            d if d.is_bearing_wear() => Some(FaultType::HighFreq),
            _ => Some(FaultType::LowFreq),
        };
        DomainResult {
            diagnosis: Diagnosis::Mechanical(diagnosis),
            confidence,
            severity,
            fault_type,
            domain: Domain::Mechanical,
            location: SYSTEM_LOCATION.to_string(),
            details: DomainDetails::Mechanical(MechanicalDetails {
                point: None,
                velocity_mm_s: 0.0,
                zone: VelocityZone::A,
                band_ratios: Default::default(),
                harmonics: Default::default(),
                rule: None,
                supporting_points: Vec::new(),
            }),
        }
    }

    fn diesel() -> FluidProperties {
        FluidProperties {
            specific_gravity: 0.84,
            vapor_pressure_kpa: 0.4,
            risk: FluidRisk::Moderate,
        }
    }

    fn design() -> DesignReference {
        DesignReference {
            rated_flow_m3h: 100.0,
            rated_head_m: 85.0,
            bep_efficiency_pct: 78.0,
            npsh_required_m: 3.0,
        }
    }

    fn hyd(discharge_bar: f64, motor_power_kw: f64, noise: NoiseType, npsh_required_m: f64) -> DomainResult {
        let design = DesignReference {
            npsh_required_m,
            ..design()
        };
        classify_hydraulic(
            &HydraulicMeasurements {
                suction_bar: 1.0,
                discharge_bar,
                flow_m3h: 100.0,
                motor_power_kw,
            },
            &design,
            &diesel(),
            &Observations {
                noise,
                ..Observations::default()
            },
            &ThresholdCatalog::default(),
        )
    }

    fn normal_hyd() -> DomainResult {
        hyd(1.0 + 85.0 * 0.84 / 10.2, 24.95, NoiseType::Normal, 3.0)
    }

    fn elec(voltages: [f64; 3], currents: [f64; 3]) -> DomainResult {
        classify_electrical(
            &ThreePhaseReadings { voltages, currents },
            &RatedElectrical {
                voltage_v: 400.0,
                current_a: 85.0,
            },
            &ThresholdCatalog::default(),
        )
    }

    fn normal_elec() -> DomainResult {
        elec([400.0, 402.0, 398.0], [70.0, 71.0, 69.0])
    }

    fn run(m: &DomainResult, h: &DomainResult, e: &DomainResult, temps: BearingTemps) -> IntegratedResult {
        correlate(m, h, e, &temps, &ThresholdCatalog::default())
    }

    #[test]
    fn healthy_machine_has_no_correlation() {
        let m = mech(MechanicalDiagnosis::Normal, 99, Severity::Low);
        let r = run(&m, &normal_hyd(), &normal_elec(), BearingTemps::default());
        assert_eq!(r.diagnosis, NO_CORRELATION);
        // floor((99 + 95 + 95) / 3) = 96, clamped to 95
        assert_eq!(r.confidence, 95);
        assert_eq!(r.severity, Severity::Low);
        assert_eq!(r.location, SYSTEM_LOCATION);
        assert!(r.patterns.is_empty());
    }

    #[test]
    fn voltage_fault_with_misalignment_and_head_loss_is_pattern_a() {
        let m = mech(MechanicalDiagnosis::Misalignment, 60, Severity::Medium);
        // Head 68 m (−20 %) with clean fluid → impeller wear.
        let h = hyd(1.0 + 68.0 * 0.84 / 10.2, 45.0, NoiseType::Normal, 3.0);
        let e = elec([350.0, 352.0, 348.0], [60.0, 60.0, 60.0]);
        assert_eq!(e.fault_type, Some(FaultType::Voltage));

        let r = run(&m, &h, &e, BearingTemps::default());
        assert_eq!(r.patterns, vec![CausalPattern::ElectricalMechanicalHydraulic]);
        assert_eq!(r.diagnosis, "Electrical-Mechanical-Hydraulic Coupled Fault");
        assert_eq!(r.location, e.location);
        // floor((60 + 80 + 85) / 3) + 15 = 75 + 15
        assert_eq!(r.confidence, 90);
        assert_eq!(r.severity, Severity::High);
    }

    #[test]
    fn cavitation_with_bearing_wear_and_current_unbalance_is_pattern_b() {
        let m = mech(MechanicalDiagnosis::BearingDeveloped, 70, Severity::Medium);
        let h = hyd(8.0, 45.0, NoiseType::Crackling, 24.0);
        assert_eq!(h.diagnosis, Diagnosis::Hydraulic(HydraulicDiagnosis::Cavitation));
        // avg 70, max dev 4.2 → 6 %
        let e = elec([400.0, 400.0, 400.0], [65.8, 72.1, 72.1]);
        assert_eq!(e.fault_type, Some(FaultType::Current));

        let r = run(&m, &h, &e, BearingTemps::default());
        assert_eq!(r.patterns, vec![CausalPattern::CavitationCascade]);
        assert_eq!(r.diagnosis, "Cascading Failure: Cavitation Origin");
        assert_eq!(r.location, h.location);
        assert!(r.confidence >= 90);
    }

    #[test]
    fn overload_with_efficiency_drop_is_pattern_c() {
        let m = mech(MechanicalDiagnosis::Normal, 99, Severity::Low);
        // On-design head, 45 kW shaft → efficiency ≈ 43 %.
        let h = hyd(1.0 + 85.0 * 0.84 / 10.2, 45.0, NoiseType::Normal, 3.0);
        let e = elec([400.0, 400.0, 400.0], [90.0, 90.0, 90.0]);

        let r = run(&m, &h, &e, BearingTemps::default());
        assert_eq!(r.patterns, vec![CausalPattern::InternalLoss]);
        assert_eq!(r.diagnosis, "Internal Loss Investigation Required");
        assert_eq!(r.location, e.location);
        assert_eq!(r.confidence, 95);
    }

    #[test]
    fn critical_bearing_forces_high_severity() {
        let m = mech(MechanicalDiagnosis::BearingEarly, 68, Severity::Low);
        let temps = BearingTemps {
            pump_de: 96.0,
            pump_nde: 62.0,
            ..BearingTemps::default()
        };
        let r = run(&m, &normal_hyd(), &normal_elec(), temps);
        assert_eq!(r.severity, Severity::High);
        assert_eq!(r.temperature_adjustment, 20);
        // floor((68 + 95 + 95) / 3) + 20 = 86 + 20, clamped to 95
        assert_eq!(r.confidence, 95);
        assert_eq!(r.diagnosis, NO_CORRELATION);
        assert_eq!(r.location, m.location);
        assert!(!r.temperature_notes.is_empty());
    }

    #[test]
    fn severity_never_below_worst_domain() {
        let m = mech(MechanicalDiagnosis::Normal, 99, Severity::Low);
        let e = elec([400.0, 400.0, 400.0], [100.0, 100.0, 100.0]);
        assert_eq!(e.severity, Severity::High);
        let r = run(&m, &normal_hyd(), &e, BearingTemps::default());
        assert!(r.severity >= e.severity);
        assert_eq!(r.location, e.location);
    }

    #[test]
    fn unclassified_domain_is_never_dominant() {
        let m = mech(MechanicalDiagnosis::Unclassified, 30, Severity::Medium);
        let r = run(&m, &normal_hyd(), &normal_elec(), BearingTemps::default());
        assert_eq!(r.location, SYSTEM_LOCATION);
        assert_eq!(r.severity, Severity::Medium);
    }

    #[test]
    fn zero_confidences_are_excluded_from_mean() {
        let m = mech(MechanicalDiagnosis::Unbalance, 0, Severity::Low);
        let r = run(&m, &normal_hyd(), &normal_elec(), BearingTemps::default());
        assert_eq!(r.confidence, 95);
        assert_eq!(floor_mean_nonzero([0u8, 80, 81].into_iter()), 80);
        assert_eq!(floor_mean_nonzero([0u8, 0, 0].into_iter()), 0);
    }
}
