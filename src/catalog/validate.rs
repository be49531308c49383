//! Consistency checks for a loaded catalog.

use thiserror::Error;

use super::ThresholdCatalog;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("{group} thresholds must be finite and strictly ascending: {values:?}")]
    NotAscending { group: &'static str, values: Vec<f64> },

    #[error("{name} must be finite and > 0, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name}: warning limit {warning} exceeds critical limit {critical}")]
    WarningAboveCritical {
        name: &'static str,
        warning: f64,
        critical: f64,
    },

    #[error("fluid '{name}': {reason}")]
    Fluid { name: String, reason: String },

    #[error("quorum must be between 1 and 12, got {0}")]
    Quorum(usize),
}

/// Validate internal consistency. Called on every catalog loaded from disk.
pub fn validate_catalog(catalog: &ThresholdCatalog) -> Result<(), CatalogError> {
    let v = &catalog.velocity;
    ensure_ascending("velocity zone", &[v.zone_a, v.zone_b, v.zone_c, v.zone_d])?;

    let t = &catalog.temperature;
    ensure_ascending(
        "bearing temperature zone",
        &[t.normal_max, t.elevated_min, t.warning_min, t.critical_min],
    )?;
    ensure_positive("temperature.delta_t", t.delta_t)?;
    ensure_positive("temperature.motor_over_pump", t.motor_over_pump)?;

    let b = &catalog.accel_baseline;
    ensure_positive("accel_baseline.band1", b.band1)?;
    ensure_positive("accel_baseline.band2", b.band2)?;
    ensure_positive("accel_baseline.band3", b.band3)?;

    let e = &catalog.electrical;
    ensure_positive("electrical.voltage_unbalance_warning", e.voltage_unbalance_warning)?;
    ensure_positive("electrical.current_unbalance_warning", e.current_unbalance_warning)?;
    ensure_positive("electrical.voltage_tolerance", e.voltage_tolerance)?;
    ensure_positive("electrical.load_critical", e.load_critical)?;
    ensure_positive("electrical.under_load", e.under_load)?;
    ensure_ordered(
        "voltage unbalance",
        e.voltage_unbalance_warning,
        e.voltage_unbalance_critical,
    )?;
    ensure_ordered(
        "current unbalance",
        e.current_unbalance_warning,
        e.current_unbalance_critical,
    )?;
    ensure_ordered("load", e.load_warning, e.load_critical)?;

    for (name, fluid) in &catalog.fluids {
        if !(fluid.specific_gravity.is_finite() && fluid.specific_gravity > 0.0) {
            return Err(CatalogError::Fluid {
                name: name.clone(),
                reason: format!("specific gravity must be > 0, got {}", fluid.specific_gravity),
            });
        }
        if !(fluid.vapor_pressure_kpa.is_finite() && fluid.vapor_pressure_kpa >= 0.0) {
            return Err(CatalogError::Fluid {
                name: name.clone(),
                reason: format!("vapor pressure must be >= 0, got {}", fluid.vapor_pressure_kpa),
            });
        }
    }

    let r = &catalog.rules;
    if r.quorum == 0 || r.quorum > 12 {
        return Err(CatalogError::Quorum(r.quorum));
    }
    ensure_positive("rules.harmonic_tolerance", r.harmonic_tolerance)?;
    ensure_positive("rules.unbalance_amp_reference", r.unbalance_amp_reference)?;

    Ok(())
}

fn ensure_ascending(group: &'static str, values: &[f64]) -> Result<(), CatalogError> {
    let finite = values.iter().all(|v| v.is_finite());
    let ascending = values.windows(2).all(|w| w[0] < w[1]);
    if finite && ascending {
        Ok(())
    } else {
        Err(CatalogError::NotAscending {
            group,
            values: values.to_vec(),
        })
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::NonPositive { name, value })
    }
}

fn ensure_ordered(name: &'static str, warning: f64, critical: f64) -> Result<(), CatalogError> {
    if warning <= critical {
        Ok(())
    } else {
        Err(CatalogError::WarningAboveCritical {
            name,
            warning,
            critical,
        })
    }
}
