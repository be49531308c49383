//! Threshold catalog: every reference constant the classifiers consult.
//!
//! The catalog is an immutable value. It is built once at startup (defaults,
//! optionally overlaid from a JSON file) and then passed by reference into
//! every classifier call.
//!
//! Defaults follow ISO 10816-3 velocity zones for fixed-speed pump trains,
//! acceleration-band baselines for rolling element bearings, and NEMA MG-1
//! style supply limits. The rule constants (quorum, confidence formulas) are
//! empirical and kept here so they can be tuned without touching rule code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{FluidProperties, FluidRisk, VelocityZone};

pub mod load;
pub mod validate;

pub use load::*;
pub use validate::*;

/// Velocity zone upper bounds (mm/s RMS).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityZones {
    pub zone_a: f64,
    pub zone_b: f64,
    pub zone_c: f64,
    /// Danger limit; readings above it are reported separately.
    pub zone_d: f64,
}

impl Default for VelocityZones {
    fn default() -> Self {
        Self {
            zone_a: 2.8,
            zone_b: 4.5,
            zone_c: 7.1,
            zone_d: 11.0,
        }
    }
}

impl VelocityZones {
    pub fn zone_of(&self, velocity_mm_s: f64) -> VelocityZone {
        if velocity_mm_s <= self.zone_a {
            VelocityZone::A
        } else if velocity_mm_s <= self.zone_b {
            VelocityZone::B
        } else if velocity_mm_s <= self.zone_c {
            VelocityZone::C
        } else {
            VelocityZone::D
        }
    }
}

/// Healthy acceleration energy per band (g).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelBaseline {
    pub band1: f64,
    pub band2: f64,
    pub band3: f64,
}

impl Default for AccelBaseline {
    fn default() -> Self {
        Self {
            band1: 0.30,
            band2: 0.20,
            band3: 0.15,
        }
    }
}

/// Bearing temperature zone floors (°C) and asymmetry limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureZones {
    /// Upper end of the comfortable operating band; still the Normal zone.
    pub normal_max: f64,
    pub elevated_min: f64,
    pub warning_min: f64,
    pub critical_min: f64,
    /// DE/NDE difference on one machine that localizes a fault.
    pub delta_t: f64,
    /// Motor DE running hotter than pump DE by more than this hints at an electrical origin.
    pub motor_over_pump: f64,
}

impl Default for TemperatureZones {
    fn default() -> Self {
        Self {
            normal_max: 60.0,
            elevated_min: 70.0,
            warning_min: 80.0,
            critical_min: 90.0,
            delta_t: 15.0,
            motor_over_pump: 10.0,
        }
    }
}

/// Supply and loading limits (percentages).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalLimits {
    pub voltage_unbalance_warning: f64,
    pub voltage_unbalance_critical: f64,
    pub current_unbalance_warning: f64,
    pub current_unbalance_critical: f64,
    /// Allowed deviation of the average voltage from rated, e.g. `10.0` for ±10 %.
    pub voltage_tolerance: f64,
    pub load_warning: f64,
    /// Overload limit as % of full-load amps. No service factor is applied.
    pub load_critical: f64,
    pub under_load: f64,
}

impl Default for ElectricalLimits {
    fn default() -> Self {
        Self {
            voltage_unbalance_warning: 2.0,
            voltage_unbalance_critical: 3.0,
            current_unbalance_warning: 5.0,
            current_unbalance_critical: 10.0,
            voltage_tolerance: 10.0,
            load_warning: 90.0,
            load_critical: 100.0,
            under_load: 50.0,
        }
    }
}

/// Bound on the scaled term before the integer cast.
const SCALED_LIMIT: f64 = 1000.0;

/// `base + round(x * scale)` capped at `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRule {
    pub base: i32,
    pub scale: f64,
    pub cap: i32,
}

impl ConfidenceRule {
    pub const fn new(base: i32, scale: f64, cap: i32) -> Self {
        Self { base, scale, cap }
    }

    /// Score a rule given its driving quantity `x` and any additive bonus.
    ///
    /// The result is always within the per-domain range `0..=99`.
    pub fn score(&self, x: f64, bonus: i32) -> u8 {
        let scaled = if x.is_finite() {
            (x * self.scale).round().clamp(-SCALED_LIMIT, SCALED_LIMIT)
        } else {
            0.0
        };
        let raw = self.base.saturating_add(scaled as i32).saturating_add(bonus);
        clamp_domain_confidence(raw.min(self.cap))
    }
}

/// Clamp any integer score into the per-domain confidence range.
pub fn clamp_domain_confidence(value: i32) -> u8 {
    value.clamp(0, 99) as u8
}

/// Empirical rule constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConstants {
    /// Relative window (fraction of 1×) for matching a peak to a harmonic.
    pub harmonic_tolerance: f64,
    /// Share of total peak amplitude the 1× line must exceed for unbalance.
    pub unbalance_energy_share: f64,
    /// Amplitude (mm/s) that normalizes the unbalance confidence.
    pub unbalance_amp_reference: f64,
    /// Points that must agree before a low-frequency fault is accepted system-wide.
    pub quorum: usize,
    /// System confidence below which more spectral data is requested.
    pub needs_more_data_below: u8,
    pub spectrum_bonus: i32,
    pub temperature_bonus: i32,
    pub unbalance: ConfidenceRule,
    pub misalignment: ConfidenceRule,
    pub looseness: ConfidenceRule,
    pub bearing_early: ConfidenceRule,
    pub bearing_developed: ConfidenceRule,
    pub bearing_severe: ConfidenceRule,
    /// Deviation band (%) considered on-design for head, flow and efficiency.
    pub deviation_band_pct: f64,
    /// Efficiency loss (%) that alone indicates an efficiency drop.
    pub efficiency_drop_pct: f64,
    /// NPSH margin (m) below which crackling noise means cavitation.
    pub cavitation_margin_m: f64,
    /// NPSH margin (m) below which cavitation is severe.
    pub cavitation_severe_margin_m: f64,
    pub cavitation: ConfidenceRule,
    pub impeller_wear: ConfidenceRule,
    pub efficiency_drop: ConfidenceRule,
    pub pattern_a_bonus: i32,
    pub pattern_b_bonus: i32,
    pub pattern_c_bonus: i32,
    /// Current unbalance (%) that links cavitation-driven wear to the motor.
    pub pattern_b_current_unbalance_pct: f64,
}

impl Default for RuleConstants {
    fn default() -> Self {
        Self {
            harmonic_tolerance: 0.05,
            unbalance_energy_share: 0.70,
            unbalance_amp_reference: 4.5,
            quorum: 3,
            needs_more_data_below: 70,
            spectrum_bonus: 10,
            temperature_bonus: 10,
            unbalance: ConfidenceRule::new(70, 10.0, 95),
            misalignment: ConfidenceRule::new(65, 20.0, 95),
            looseness: ConfidenceRule::new(60, 15.0, 90),
            bearing_early: ConfidenceRule::new(60, 10.0, 85),
            bearing_developed: ConfidenceRule::new(70, 8.0, 90),
            bearing_severe: ConfidenceRule::new(80, 6.0, 95),
            deviation_band_pct: 5.0,
            efficiency_drop_pct: 10.0,
            cavitation_margin_m: 0.5,
            cavitation_severe_margin_m: 0.3,
            cavitation: ConfidenceRule::new(70, 50.0, 95),
            impeller_wear: ConfidenceRule::new(60, 1.0, 90),
            efficiency_drop: ConfidenceRule::new(60, 0.5, 90),
            pattern_a_bonus: 15,
            pattern_b_bonus: 20,
            pattern_c_bonus: 10,
            pattern_b_current_unbalance_pct: 5.0,
        }
    }
}

/// All reference constants for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdCatalog {
    pub velocity: VelocityZones,
    pub accel_baseline: AccelBaseline,
    pub temperature: TemperatureZones,
    pub electrical: ElectricalLimits,
    /// Fluid properties keyed by lowercase fluid name.
    pub fluids: BTreeMap<String, FluidProperties>,
    pub rules: RuleConstants,
}

impl Default for ThresholdCatalog {
    fn default() -> Self {
        Self {
            velocity: VelocityZones::default(),
            accel_baseline: AccelBaseline::default(),
            temperature: TemperatureZones::default(),
            electrical: ElectricalLimits::default(),
            fluids: default_fluids(),
            rules: RuleConstants::default(),
        }
    }
}

impl ThresholdCatalog {
    /// Look up a fluid by name (case-insensitive, `-`/space treated as `_`).
    pub fn fluid(&self, name: &str) -> Option<&FluidProperties> {
        self.fluids.get(&normalize_fluid_name(name))
    }
}

pub fn normalize_fluid_name(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

/// Vapor pressures are quoted near 40 °C process temperature.
fn default_fluids() -> BTreeMap<String, FluidProperties> {
    let entries = [
        ("water", 1.000, 7.38, FluidRisk::Low),
        ("seawater", 1.025, 7.20, FluidRisk::Low),
        ("diesel", 0.840, 0.40, FluidRisk::Moderate),
        ("crude_oil", 0.870, 20.0, FluidRisk::Moderate),
        ("gasoline", 0.740, 55.0, FluidRisk::High),
        ("condensate", 0.700, 80.0, FluidRisk::High),
    ];
    entries
        .into_iter()
        .map(|(name, specific_gravity, vapor_pressure_kpa, risk)| {
            (
                name.to_string(),
                FluidProperties {
                    specific_gravity,
                    vapor_pressure_kpa,
                    risk,
                },
            )
        })
        .collect()
}
