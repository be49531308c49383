//! Three-phase supply and loading classifier.

use crate::catalog::ThresholdCatalog;
use crate::domain::{
    Diagnosis, Domain, DomainDetails, DomainResult, ElectricalDetails, ElectricalDiagnosis,
    FaultType, RatedElectrical, Severity, ThreePhaseReadings,
};

pub const LOCATION: &str = "Motor Supply";

/// Rule precedence. Supply quality is checked before loading.
pub const ELECTRICAL_RULES: [ElectricalDiagnosis; 7] = [
    ElectricalDiagnosis::UnderVoltage,
    ElectricalDiagnosis::OverVoltage,
    ElectricalDiagnosis::VoltageUnbalance,
    ElectricalDiagnosis::CurrentUnbalance,
    ElectricalDiagnosis::OverLoad,
    ElectricalDiagnosis::UnderLoad,
    ElectricalDiagnosis::NormalElectrical,
];

/// Load above which an under-voltage condition is rated High.
const UNDER_VOLTAGE_HIGH_LOAD_PCT: f64 = 80.0;
/// Overload margin (×critical) beyond which the overload is High.
const OVERLOAD_HIGH_FACTOR: f64 = 1.15;

pub fn classify_electrical(
    readings: &ThreePhaseReadings,
    rated: &RatedElectrical,
    catalog: &ThresholdCatalog,
) -> DomainResult {
    let details = derive(readings, rated, catalog);

    let (diagnosis, confidence, severity) = if details.avg_voltage_v == 0.0 && details.avg_current_a == 0.0 {
        (ElectricalDiagnosis::Unclassified, 30, Severity::Medium)
    } else {
        ELECTRICAL_RULES
            .iter()
            .find_map(|&rule| evaluate(rule, &details, rated, catalog))
            .unwrap_or((ElectricalDiagnosis::Unclassified, 30, Severity::Medium))
    };

    tracing::debug!(
        diagnosis = diagnosis.label(),
        voltage_unbalance = details.voltage_unbalance_pct,
        current_unbalance = details.current_unbalance_pct,
        load = details.load_pct,
        "Electrical classification"
    );

    DomainResult {
        diagnosis: Diagnosis::Electrical(diagnosis),
        confidence,
        severity,
        fault_type: fault_type(diagnosis),
        domain: Domain::Electrical,
        location: LOCATION.to_string(),
        details: DomainDetails::Electrical(details),
    }
}

fn evaluate(
    rule: ElectricalDiagnosis,
    d: &ElectricalDetails,
    rated: &RatedElectrical,
    catalog: &ThresholdCatalog,
) -> Option<(ElectricalDiagnosis, u8, Severity)> {
    let limits = &catalog.electrical;
    let tolerance = limits.voltage_tolerance / 100.0;
    let has_voltage_rating = rated.voltage_v > 0.0;
    let has_current_rating = rated.current_a > 0.0;

    match rule {
        ElectricalDiagnosis::UnderVoltage => {
            if !(has_voltage_rating && d.avg_voltage_v < rated.voltage_v * (1.0 - tolerance)) {
                return None;
            }
            let severity = if d.load_pct > UNDER_VOLTAGE_HIGH_LOAD_PCT {
                Severity::High
            } else {
                Severity::Medium
            };
            Some((rule, 85, severity))
        }
        ElectricalDiagnosis::OverVoltage => (has_voltage_rating
            && d.avg_voltage_v > rated.voltage_v * (1.0 + tolerance))
            .then_some((rule, 85, Severity::Medium)),
        ElectricalDiagnosis::VoltageUnbalance => unbalance_verdict(
            rule,
            d.voltage_unbalance_pct,
            limits.voltage_unbalance_warning,
            limits.voltage_unbalance_critical,
        ),
        ElectricalDiagnosis::CurrentUnbalance => unbalance_verdict(
            rule,
            d.current_unbalance_pct,
            limits.current_unbalance_warning,
            limits.current_unbalance_critical,
        ),
        ElectricalDiagnosis::OverLoad => {
            if !(has_current_rating && d.load_pct > limits.load_critical) {
                return None;
            }
            let severity = if d.load_pct > limits.load_critical * OVERLOAD_HIGH_FACTOR {
                Severity::High
            } else {
                Severity::Medium
            };
            Some((rule, 85, severity))
        }
        ElectricalDiagnosis::UnderLoad => (has_current_rating && d.load_pct < limits.under_load)
            .then_some((rule, 70, Severity::Low)),
        // Tolerance and load cannot be confirmed without a nameplate.
        ElectricalDiagnosis::NormalElectrical => {
            (has_voltage_rating && has_current_rating).then_some((rule, 95, Severity::Low))
        }
        ElectricalDiagnosis::Unclassified => None,
    }
}

fn unbalance_verdict(
    rule: ElectricalDiagnosis,
    value: f64,
    warning: f64,
    critical: f64,
) -> Option<(ElectricalDiagnosis, u8, Severity)> {
    if value > critical {
        Some((rule, 90, Severity::High))
    } else if value > warning {
        Some((rule, 75, Severity::Medium))
    } else {
        None
    }
}

fn fault_type(diagnosis: ElectricalDiagnosis) -> Option<FaultType> {
    match diagnosis {
        ElectricalDiagnosis::UnderVoltage
        | ElectricalDiagnosis::OverVoltage
        | ElectricalDiagnosis::VoltageUnbalance => Some(FaultType::Voltage),
        ElectricalDiagnosis::CurrentUnbalance => Some(FaultType::Current),
        ElectricalDiagnosis::OverLoad | ElectricalDiagnosis::UnderLoad => Some(FaultType::Load),
        ElectricalDiagnosis::NormalElectrical => Some(FaultType::Normal),
        ElectricalDiagnosis::Unclassified => None,
    }
}

/// Averages, unbalance and load for one set of readings.
pub fn derive(
    readings: &ThreePhaseReadings,
    rated: &RatedElectrical,
    catalog: &ThresholdCatalog,
) -> ElectricalDetails {
    let avg_voltage_v = mean(&readings.voltages);
    let avg_current_a = mean(&readings.currents);
    let load_pct = if rated.current_a > 0.0 {
        avg_current_a / rated.current_a * 100.0
    } else {
        0.0
    };

    let tolerance = catalog.electrical.voltage_tolerance / 100.0;
    let voltage_in_tolerance = rated.voltage_v <= 0.0
        || (avg_voltage_v >= rated.voltage_v * (1.0 - tolerance)
            && avg_voltage_v <= rated.voltage_v * (1.0 + tolerance));

    ElectricalDetails {
        avg_voltage_v,
        avg_current_a,
        voltage_unbalance_pct: unbalance_pct(&readings.voltages),
        current_unbalance_pct: unbalance_pct(&readings.currents),
        load_pct,
        voltage_in_tolerance,
        high_load: rated.current_a > 0.0 && load_pct > catalog.electrical.load_warning,
    }
}

fn mean(values: &[f64; 3]) -> f64 {
    values.iter().sum::<f64>() / 3.0
}

/// Maximum deviation from the average, as % of the average (NEMA definition).
pub fn unbalance_pct(values: &[f64; 3]) -> f64 {
    let avg = mean(values);
    if avg <= 0.0 {
        return 0.0;
    }
    let max_dev = values.iter().map(|v| (v - avg).abs()).fold(0.0, f64::max);
    max_dev / avg * 100.0
}
