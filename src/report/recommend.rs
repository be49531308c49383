//! Maintenance recommendations per diagnosis.

use crate::domain::{
    Diagnosis, DomainResult, ElectricalDiagnosis, HydraulicDiagnosis, MechanicalDiagnosis, Severity,
};

/// A titled list of maintenance actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub actions: Vec<String>,
}

impl Recommendation {
    fn new(title: String, actions: &[&str]) -> Self {
        Self {
            title,
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn then(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

/// Recommendation for a domain verdict. `None` for healthy results.
pub fn recommend(result: &DomainResult) -> Option<Recommendation> {
    let location = &result.location;
    let severity = result.severity;
    match result.diagnosis {
        Diagnosis::Mechanical(d) => mechanical(d, location, severity),
        Diagnosis::Hydraulic(d) => hydraulic(d, severity),
        Diagnosis::Electrical(d) => electrical(d, severity),
    }
}

fn mechanical(d: MechanicalDiagnosis, location: &str, severity: Severity) -> Option<Recommendation> {
    let rec = match d {
        MechanicalDiagnosis::Normal => return None,
        MechanicalDiagnosis::Unbalance => Recommendation::new(
            format!("{location}: Unbalance"),
            &[
                "Balance the rotor in one or two planes",
                "Inspect for impeller deposits, blade corrosion and keyway wear",
                "Target residual unbalance per ISO 1940-1 (G2.5)",
            ],
        )
        .then(if severity == Severity::Low {
            "Monitor the trend"
        } else {
            "Schedule balancing now"
        }),
        MechanicalDiagnosis::Misalignment => Recommendation::new(
            format!("{location}: Misalignment"),
            &[
                "Laser-align the pump/motor coupling",
                "Target < 0.05 mm offset and < 0.05 mm/m angularity",
                "Check pipe strain, soft foot and coupling wear",
            ],
        )
        .then(if severity == Severity::High {
            "Stop and align immediately"
        } else {
            "Schedule alignment"
        }),
        MechanicalDiagnosis::Looseness => Recommendation::new(
            format!("{location}: Mechanical looseness"),
            &[
                "Torque-check foundation, bearing housing and baseplate bolts",
                "Look for structural cracks, worn dowel pins and grout deterioration",
                "Use the manufacturer's torque values",
            ],
        )
        .then(if severity == Severity::High {
            "Secure before further operation"
        } else {
            "Schedule re-tightening"
        }),
        MechanicalDiagnosis::BearingEarly => Recommendation::new(
            format!("{location}: Early bearing fault / lubrication"),
            &[
                "Check grease type, quantity and relubrication interval",
                "Take an oil sample where applicable (particle count, viscosity)",
                "Trend Band3 weekly",
            ],
        )
        .then(if severity == Severity::Low {
            "Continue monitoring"
        } else {
            "Regrease and monitor closely"
        }),
        MechanicalDiagnosis::BearingDeveloped => Recommendation::new(
            format!("{location}: Developed bearing fault"),
            &[
                "Plan bearing replacement within 1-3 months",
                "Stage a spare bearing with the specified clearance and fit",
                "Monitor weekly; bring the replacement forward if Band1 rises sharply",
            ],
        )
        .then(if severity == Severity::High {
            "Plan a shutdown now"
        } else {
            "Raise a work order"
        }),
        MechanicalDiagnosis::BearingSevere => Recommendation::new(
            format!("{location}: Severe bearing damage"),
            &[
                "Risk of catastrophic failure; consider an immediate shutdown",
                "If running on, monitor hourly and prepare an emergency replacement",
                "Investigate root cause: lubrication, installation, loading",
                "Action required within 24 hours",
            ],
        ),
        MechanicalDiagnosis::Unclassified => Recommendation::new(
            "Inconsistent vibration pattern".to_string(),
            &[
                "Readings match no standard mechanical signature",
                "Possible multi-fault interaction, measurement error or an unusual fault",
                "Have a Category II+ vibration analyst review the full spectrum",
            ],
        ),
    };
    Some(rec)
}

fn hydraulic(d: HydraulicDiagnosis, severity: Severity) -> Option<Recommendation> {
    let rec = match d {
        HydraulicDiagnosis::NormalOperation => return None,
        HydraulicDiagnosis::Cavitation => Recommendation::new(
            "Cavitation".to_string(),
            &[
                "Raise suction head or lower fluid temperature to restore NPSH margin",
                "Check suction strainer and valves for restriction",
                "Inspect the impeller eye for pitting at the next opportunity",
            ],
        )
        .then(if severity == Severity::High {
            "Reduce flow or stop until the margin is restored"
        } else {
            "Trend suction pressure daily"
        }),
        HydraulicDiagnosis::ImpellerWear => Recommendation::new(
            "Impeller / wear ring wear".to_string(),
            &[
                "Measure wear ring clearances at the next shutdown",
                "Compare against the performance curve to size the loss",
                "Plan impeller or wear ring replacement",
            ],
        ),
        HydraulicDiagnosis::SystemResistanceHigh => Recommendation::new(
            "High system resistance".to_string(),
            &[
                "Check discharge valves, strainers and filters for blockage",
                "Confirm the operating point against the system curve",
            ],
        ),
        HydraulicDiagnosis::EfficiencyDrop => Recommendation::new(
            "Efficiency drop".to_string(),
            &[
                "Check for internal recirculation and worn clearances",
                "Verify motor power measurement and fluid density",
                "Trend efficiency against the BEP",
            ],
        ),
        HydraulicDiagnosis::Unclassified => Recommendation::new(
            "Inconsistent hydraulic pattern".to_string(),
            &[
                "Deviation from the design point matches no standard pattern",
                "Verify gauges, flow meter and the design reference",
            ],
        ),
    };
    Some(rec)
}

fn electrical(d: ElectricalDiagnosis, severity: Severity) -> Option<Recommendation> {
    let rec = match d {
        ElectricalDiagnosis::NormalElectrical => return None,
        ElectricalDiagnosis::UnderVoltage | ElectricalDiagnosis::OverVoltage => Recommendation::new(
            "Supply voltage out of tolerance".to_string(),
            &[
                "Check transformer tap settings and supply cable sizing",
                "Log voltage over a full duty cycle",
            ],
        )
        .then(if severity == Severity::High {
            "Reduce load until the supply is corrected"
        } else {
            "Raise with the electrical team"
        }),
        ElectricalDiagnosis::VoltageUnbalance => Recommendation::new(
            "Voltage unbalance".to_string(),
            &[
                "Check for single-phase loads on the same bus",
                "Inspect terminations and contactors for high resistance",
                "Derate the motor per NEMA MG-1 while unbalance persists",
            ],
        ),
        ElectricalDiagnosis::CurrentUnbalance => Recommendation::new(
            "Current unbalance".to_string(),
            &[
                "Rule out supply unbalance first",
                "Test stator windings (insulation resistance, winding resistance)",
                "Check for rotor bar defects with current signature analysis",
            ],
        ),
        ElectricalDiagnosis::OverLoad => Recommendation::new(
            "Motor overload".to_string(),
            &[
                "Confirm the pump operating point and fluid density",
                "Check for mechanical drag (bearings, rubbing)",
                "Verify overload relay settings",
            ],
        ),
        ElectricalDiagnosis::UnderLoad => Recommendation::new(
            "Motor under-loaded".to_string(),
            &[
                "Check for dry running or a closed discharge",
                "Review pump and motor sizing for the duty",
            ],
        ),
        ElectricalDiagnosis::Unclassified => Recommendation::new(
            "No electrical readings".to_string(),
            &["Record three-phase voltages and currents under load"],
        ),
    };
    Some(rec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Domain, DomainDetails, ElectricalDetails, FaultType, MechanicalDetails, VelocityZone,
    };

    fn mech(d: MechanicalDiagnosis, severity: Severity) -> DomainResult {
        DomainResult {
            diagnosis: Diagnosis::Mechanical(d),
            confidence: 80,
            severity,
            fault_type: Some(FaultType::LowFreq),
            domain: Domain::Mechanical,
            location: "Pump-Motor System".to_string(),
            details: DomainDetails::Mechanical(MechanicalDetails {
                point: None,
                velocity_mm_s: 6.0,
                zone: VelocityZone::C,
                band_ratios: Default::default(),
                harmonics: Default::default(),
                rule: None,
                supporting_points: Vec::new(),
            }),
        }
    }

    #[test]
    fn normal_has_no_recommendation() {
        assert_eq!(recommend(&mech(MechanicalDiagnosis::Normal, Severity::Low)), None);
    }

    #[test]
    fn severity_changes_the_final_action() {
        let low = recommend(&mech(MechanicalDiagnosis::Unbalance, Severity::Low)).unwrap();
        let high = recommend(&mech(MechanicalDiagnosis::Unbalance, Severity::High)).unwrap();
        assert_eq!(low.title, "Pump-Motor System: Unbalance");
        assert_eq!(low.actions.last().unwrap(), "Monitor the trend");
        assert_eq!(high.actions.last().unwrap(), "Schedule balancing now");
    }

    #[test]
    fn unclassified_asks_for_manual_review() {
        let rec = recommend(&mech(MechanicalDiagnosis::Unclassified, Severity::Medium)).unwrap();
        assert!(rec.actions.iter().any(|a| a.contains("vibration analyst")));
    }

    #[test]
    fn electrical_recommendations() {
        let result = DomainResult {
            diagnosis: Diagnosis::Electrical(ElectricalDiagnosis::CurrentUnbalance),
            confidence: 75,
            severity: Severity::Medium,
            fault_type: Some(FaultType::Current),
            domain: Domain::Electrical,
            location: "Motor Supply".to_string(),
            details: DomainDetails::Electrical(ElectricalDetails {
                avg_voltage_v: 400.0,
                avg_current_a: 70.0,
                voltage_unbalance_pct: 0.5,
                current_unbalance_pct: 7.0,
                load_pct: 82.0,
                voltage_in_tolerance: true,
                high_load: false,
            }),
        };
        let rec = recommend(&result).unwrap();
        assert_eq!(rec.title, "Current unbalance");
    }
}
