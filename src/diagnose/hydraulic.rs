//! Single-point hydraulic classifier.
//!
//! Head, hydraulic power and efficiency are derived from one pressure/flow/power
//! reading and compared against the design duty point. The deviation pattern
//! and the operator's observations then feed an ordered rule table.

use crate::catalog::ThresholdCatalog;
use crate::domain::{
    DesignReference, DeviationPattern, Diagnosis, Domain, DomainDetails, DomainResult, FaultType,
    FluidClarity, FluidProperties, HydraulicDetails, HydraulicDiagnosis, HydraulicMeasurements,
    NoiseType, Observations, Severity,
};

pub const LOCATION: &str = "Pump Hydraulics";

/// Metres of water column per bar.
const M_PER_BAR: f64 = 10.2;
const GRAVITY: f64 = 9.81;
const ATMOSPHERE_BAR: f64 = 1.013;

/// Rule precedence. Anything unmatched is Unclassified.
pub const HYDRAULIC_RULES: [HydraulicDiagnosis; 5] = [
    HydraulicDiagnosis::Cavitation,
    HydraulicDiagnosis::ImpellerWear,
    HydraulicDiagnosis::SystemResistanceHigh,
    HydraulicDiagnosis::EfficiencyDrop,
    HydraulicDiagnosis::NormalOperation,
];

/// Classify the hydraulic condition of the pump.
pub fn classify_hydraulic(
    measurements: &HydraulicMeasurements,
    design: &DesignReference,
    fluid: &FluidProperties,
    observations: &Observations,
    catalog: &ThresholdCatalog,
) -> DomainResult {
    let details = derive(measurements, design, fluid, catalog);

    // Without a duty point only cavitation can still be judged.
    let comparable = has_duty_point(design, fluid);
    let fired = HYDRAULIC_RULES
        .iter()
        .filter(|&&rule| comparable || rule == HydraulicDiagnosis::Cavitation)
        .find_map(|&rule| evaluate(rule, &details, observations, catalog));

    let (diagnosis, confidence, severity) = match fired {
        Some(v) => v,
        None => (HydraulicDiagnosis::Unclassified, 40, Severity::Medium),
    };

    tracing::debug!(
        diagnosis = diagnosis.label(),
        pattern = ?details.pattern,
        head_dev = details.head_deviation_pct,
        eff_dev = details.efficiency_deviation_pct,
        npsh_margin = details.npsh_margin_m,
        "Hydraulic classification"
    );

    DomainResult {
        diagnosis: Diagnosis::Hydraulic(diagnosis),
        confidence,
        severity,
        fault_type: fault_type(diagnosis),
        domain: Domain::Hydraulic,
        location: LOCATION.to_string(),
        details: DomainDetails::Hydraulic(details),
    }
}

fn evaluate(
    rule: HydraulicDiagnosis,
    d: &HydraulicDetails,
    obs: &Observations,
    catalog: &ThresholdCatalog,
) -> Option<(HydraulicDiagnosis, u8, Severity)> {
    let rules = &catalog.rules;
    match rule {
        HydraulicDiagnosis::Cavitation => {
            let margin = d.npsh_margin_m;
            if !(obs.noise == NoiseType::Crackling && margin < rules.cavitation_margin_m) {
                return None;
            }
            let severity = if margin < rules.cavitation_severe_margin_m {
                Severity::High
            } else {
                Severity::Medium
            };
            let deficit = rules.cavitation_margin_m - margin;
            Some((rule, rules.cavitation.score(deficit, 0), severity))
        }
        HydraulicDiagnosis::ImpellerWear => {
            let clear = matches!(obs.clarity, FluidClarity::Clear | FluidClarity::SlightlyTurbid);
            if !(d.pattern == DeviationPattern::UnderPerformance && obs.noise == NoiseType::Normal && clear) {
                return None;
            }
            let severity = if d.head_deviation_pct < -15.0 {
                Severity::High
            } else {
                Severity::Medium
            };
            Some((rule, rules.impeller_wear.score(d.head_deviation_pct.abs(), 0), severity))
        }
        HydraulicDiagnosis::SystemResistanceHigh => {
            (d.pattern == DeviationPattern::OverResistance).then_some((rule, 70, Severity::Medium))
        }
        HydraulicDiagnosis::EfficiencyDrop => {
            if d.pattern != DeviationPattern::EfficiencyDrop {
                return None;
            }
            let severity = if d.efficiency_deviation_pct < -25.0 {
                Severity::High
            } else {
                Severity::Medium
            };
            Some((rule, rules.efficiency_drop.score(d.efficiency_deviation_pct.abs(), 0), severity))
        }
        HydraulicDiagnosis::NormalOperation => {
            (d.pattern == DeviationPattern::Normal).then_some((rule, 95, Severity::Low))
        }
        HydraulicDiagnosis::Unclassified => None,
    }
}

fn fault_type(diagnosis: HydraulicDiagnosis) -> Option<FaultType> {
    match diagnosis {
        HydraulicDiagnosis::Cavitation => Some(FaultType::Cavitation),
        HydraulicDiagnosis::ImpellerWear => Some(FaultType::Wear),
        HydraulicDiagnosis::SystemResistanceHigh => Some(FaultType::Resistance),
        HydraulicDiagnosis::EfficiencyDrop => Some(FaultType::Efficiency),
        HydraulicDiagnosis::NormalOperation => Some(FaultType::Normal),
        HydraulicDiagnosis::Unclassified => None,
    }
}

/// Derived parameters and deviation pattern for one reading.
pub fn derive(
    m: &HydraulicMeasurements,
    design: &DesignReference,
    fluid: &FluidProperties,
    catalog: &ThresholdCatalog,
) -> HydraulicDetails {
    let sg = fluid.specific_gravity;
    let delta_p = m.discharge_bar - m.suction_bar;
    let head_m = if sg > 0.0 { delta_p * M_PER_BAR / sg } else { 0.0 };
    let hydraulic_power_kw = m.flow_m3h * head_m * sg * GRAVITY / 3600.0;
    let efficiency_pct = if m.motor_power_kw > 0.0 {
        hydraulic_power_kw / m.motor_power_kw * 100.0
    } else {
        0.0
    };

    let head_deviation_pct = deviation_pct(head_m, design.rated_head_m);
    let efficiency_deviation_pct = deviation_pct(efficiency_pct, design.bep_efficiency_pct);
    let flow_deviation_pct = deviation_pct(m.flow_m3h, design.rated_flow_m3h);

    let npsh_available = if sg > 0.0 {
        ((m.suction_bar + ATMOSPHERE_BAR) * 100.0 - fluid.vapor_pressure_kpa) / (sg * GRAVITY)
    } else {
        0.0
    };

    HydraulicDetails {
        head_m,
        hydraulic_power_kw,
        efficiency_pct,
        head_deviation_pct,
        efficiency_deviation_pct,
        flow_deviation_pct,
        npsh_margin_m: npsh_available - design.npsh_required_m,
        pattern: if has_duty_point(design, fluid) {
            deviation_pattern(head_deviation_pct, efficiency_deviation_pct, flow_deviation_pct, catalog)
        } else {
            DeviationPattern::MixedDeviation
        },
    }
}

/// Rated head, flow, BEP efficiency and specific gravity are all known.
fn has_duty_point(design: &DesignReference, fluid: &FluidProperties) -> bool {
    design.rated_head_m > 0.0
        && design.rated_flow_m3h > 0.0
        && design.bep_efficiency_pct > 0.0
        && fluid.specific_gravity > 0.0
}

fn deviation_pattern(head: f64, eff: f64, flow: f64, catalog: &ThresholdCatalog) -> DeviationPattern {
    let band = catalog.rules.deviation_band_pct;
    if head < -band && eff < -band {
        DeviationPattern::UnderPerformance
    } else if head > band && flow < -band {
        DeviationPattern::OverResistance
    } else if eff < -catalog.rules.efficiency_drop_pct && head.abs() <= band {
        DeviationPattern::EfficiencyDrop
    } else if head.abs() <= band && eff.abs() <= band && flow.abs() <= band {
        DeviationPattern::Normal
    } else {
        DeviationPattern::MixedDeviation
    }
}

fn deviation_pct(actual: f64, design: f64) -> f64 {
    if design > 0.0 {
        (actual - design) / design * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::FluidRisk;

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

    fn classify(m: HydraulicMeasurements, obs: Observations) -> DomainResult {
        classify_hydraulic(&m, &design(), &diesel(), &obs, &ThresholdCatalog::default())
    }

    fn diagnosis(r: &DomainResult) -> Diagnosis {
        r.diagnosis
    }

    #[test]
    fn efficiency_drop_example() {
        let r = classify(
            HydraulicMeasurements {
                suction_bar: 1.2,
                discharge_bar: 8.5,
                flow_m3h: 100.0,
                motor_power_kw: 45.0,
            },
            Observations::default(),
        );
        let d = r.details.as_hydraulic().unwrap();
        assert!((d.head_m - 88.64).abs() < 0.01);
        assert!((d.head_deviation_pct - 4.29).abs() < 0.01);
        assert!((d.hydraulic_power_kw - 20.29).abs() < 0.01);
        assert!((d.efficiency_pct - 45.09).abs() < 0.01);
        assert!(d.efficiency_deviation_pct < -40.0);
        assert_eq!(d.pattern, DeviationPattern::EfficiencyDrop);

        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::EfficiencyDrop));
        // 60 + round(42.19 / 2) = 81
        assert_eq!(r.confidence, 81);
        assert_eq!(r.severity, Severity::High);
        assert_eq!(r.fault_type, Some(FaultType::Efficiency));
    }

    #[test]
    fn crackling_with_low_margin_is_cavitation() {
        let mut tight = design();
        tight.npsh_required_m = 26.6;
        let m = HydraulicMeasurements {
            suction_bar: 1.2,
            discharge_bar: 8.5,
            flow_m3h: 100.0,
            motor_power_kw: 45.0,
        };
        let obs = Observations {
            noise: NoiseType::Crackling,
            ..Observations::default()
        };
        let r = classify_hydraulic(&m, &tight, &diesel(), &obs, &ThresholdCatalog::default());
        let margin = r.details.as_hydraulic().unwrap().npsh_margin_m;
        // NPSHa = (2.213 × 100 − 0.4) / (0.84 × 9.81) ≈ 26.80 m
        assert!((margin - 0.2).abs() < 0.01);
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Cavitation));
        // 70 + round(0.3 × 50) = 85
        assert_eq!(r.confidence, 85);
        assert_eq!(r.severity, Severity::High);
        assert_eq!(r.fault_type, Some(FaultType::Cavitation));
    }

    #[test]
    fn crackling_with_ample_margin_is_not_cavitation() {
        let r = classify(
            HydraulicMeasurements {
                suction_bar: 1.2,
                discharge_bar: 8.5,
                flow_m3h: 100.0,
                motor_power_kw: 45.0,
            },
            Observations {
                noise: NoiseType::Crackling,
                ..Observations::default()
            },
        );
        assert_ne!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Cavitation));
    }

    #[test]
    fn under_performance_with_clean_fluid_is_impeller_wear() {
        // Head ≈ 68.0 m (−20 %), efficiency well below BEP.
        let r = classify(
            HydraulicMeasurements {
                suction_bar: 1.0,
                discharge_bar: 6.6,
                flow_m3h: 100.0,
                motor_power_kw: 45.0,
            },
            Observations {
                noise: NoiseType::Normal,
                clarity: FluidClarity::SlightlyTurbid,
            },
        );
        let d = r.details.as_hydraulic().unwrap();
        assert_eq!(d.pattern, DeviationPattern::UnderPerformance);
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::ImpellerWear));
        assert_eq!(r.confidence, 80);
        assert_eq!(r.severity, Severity::High);
        assert_eq!(r.fault_type, Some(FaultType::Wear));
    }

    #[test]
    fn turbid_fluid_blocks_impeller_wear() {
        let r = classify(
            HydraulicMeasurements {
                suction_bar: 1.0,
                discharge_bar: 6.6,
                flow_m3h: 100.0,
                motor_power_kw: 45.0,
            },
            Observations {
                noise: NoiseType::Normal,
                clarity: FluidClarity::Turbid,
            },
        );
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Unclassified));
        assert_eq!(r.confidence, 40);
        assert_eq!(r.fault_type, None);
    }

    #[test]
    fn high_head_low_flow_is_system_resistance() {
        // Head ≈ 97.1 m (+14 %), flow −20 %.
        let r = classify(
            HydraulicMeasurements {
                suction_bar: 1.0,
                discharge_bar: 9.0,
                flow_m3h: 80.0,
                motor_power_kw: 30.0,
            },
            Observations::default(),
        );
        assert_eq!(
            r.details.as_hydraulic().unwrap().pattern,
            DeviationPattern::OverResistance
        );
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::SystemResistanceHigh));
        assert_eq!(r.confidence, 70);
        assert_eq!(r.severity, Severity::Medium);
    }

    #[test]
    fn on_design_point_is_normal() {
        // Head 85 m at 100 m³/h needs ≈ 19.46 kW hydraulic; 78 % → ≈ 24.95 kW shaft.
        let head_bar = 85.0 * 0.84 / 10.2;
        let r = classify(
            HydraulicMeasurements {
                suction_bar: 1.0,
                discharge_bar: 1.0 + head_bar,
                flow_m3h: 100.0,
                motor_power_kw: 24.95,
            },
            Observations::default(),
        );
        assert_eq!(r.details.as_hydraulic().unwrap().pattern, DeviationPattern::Normal);
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::NormalOperation));
        assert_eq!(r.confidence, 95);
        assert_eq!(r.severity, Severity::Low);
        assert!(!r.is_fault());
    }

    #[test]
    fn zero_guards_do_not_panic() {
        let fluid = FluidProperties {
            specific_gravity: 0.0,
            vapor_pressure_kpa: 0.0,
            risk: FluidRisk::Low,
        };
        let zero_design = DesignReference {
            rated_flow_m3h: 0.0,
            rated_head_m: 0.0,
            bep_efficiency_pct: 0.0,
            npsh_required_m: 0.0,
        };
        let m = HydraulicMeasurements {
            suction_bar: 1.0,
            discharge_bar: 5.0,
            flow_m3h: 50.0,
            motor_power_kw: 0.0,
        };
        let r = classify_hydraulic(&m, &zero_design, &fluid, &Observations::default(), &ThresholdCatalog::default());
        let d = r.details.as_hydraulic().unwrap();
        assert_eq!(d.head_m, 0.0);
        assert_eq!(d.efficiency_pct, 0.0);
        assert_eq!(d.npsh_margin_m, 0.0);
        assert_matches!(d.pattern, DeviationPattern::MixedDeviation);
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Unclassified));
    }

    #[test]
    fn missing_design_reference_is_inconclusive() {
        let head_bar = 85.0 * 0.84 / 10.2;
        let m = HydraulicMeasurements {
            suction_bar: 1.0,
            discharge_bar: 1.0 + head_bar,
            flow_m3h: 100.0,
            motor_power_kw: 24.95,
        };
        for blank in [
            DesignReference { rated_head_m: 0.0, ..design() },
            DesignReference { rated_flow_m3h: 0.0, ..design() },
            DesignReference { bep_efficiency_pct: 0.0, ..design() },
        ] {
            let r = classify_hydraulic(&m, &blank, &diesel(), &Observations::default(), &ThresholdCatalog::default());
            assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Unclassified));
            assert_eq!(r.confidence, 40);
            assert_eq!(r.severity, Severity::Medium);
            assert_eq!(r.fault_type, None);
        }
    }

    #[test]
    fn cavitation_is_judged_without_a_duty_point() {
        let blank = DesignReference {
            rated_head_m: 0.0,
            rated_flow_m3h: 0.0,
            bep_efficiency_pct: 0.0,
            npsh_required_m: 26.6,
        };
        let m = HydraulicMeasurements {
            suction_bar: 1.2,
            discharge_bar: 8.5,
            flow_m3h: 100.0,
            motor_power_kw: 45.0,
        };
        let obs = Observations {
            noise: NoiseType::Crackling,
            ..Observations::default()
        };
        let r = classify_hydraulic(&m, &blank, &diesel(), &obs, &ThresholdCatalog::default());
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Cavitation));
    }

    #[test]
    fn absurd_npsh_requirement_caps_confidence() {
        let mut tight = design();
        tight.npsh_required_m = 1e9;
        let m = HydraulicMeasurements {
            suction_bar: 1.2,
            discharge_bar: 8.5,
            flow_m3h: 100.0,
            motor_power_kw: 45.0,
        };
        let obs = Observations {
            noise: NoiseType::Crackling,
            ..Observations::default()
        };
        let r = classify_hydraulic(&m, &tight, &diesel(), &obs, &ThresholdCatalog::default());
        assert_eq!(diagnosis(&r), Diagnosis::Hydraulic(HydraulicDiagnosis::Cavitation));
        assert_eq!(r.confidence, 95);
        assert_eq!(r.severity, Severity::High);
    }
}
