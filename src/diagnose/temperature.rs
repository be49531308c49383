//! Bearing temperature adjustment.
//!
//! Temperatures never produce a diagnosis on their own. They raise confidence
//! when they agree with a vibration fault, lower it when a bearing is hot with
//! no vibration evidence, and add notes that help localize the fault.

use serde::{Deserialize, Serialize};

use crate::catalog::{TemperatureZones, ThresholdCatalog};
use crate::domain::{BearingTemps, End, Machine};

/// Bounds of the total adjustment.
pub const MIN_ADJUSTMENT: i32 = -10;
pub const MAX_ADJUSTMENT: i32 = 20;

const DELTA_T_BONUS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempZone {
    Normal,
    Elevated,
    Warning,
    Critical,
}

impl TempZone {
    pub fn classify(temp_c: f64, zones: &TemperatureZones) -> Self {
        if temp_c >= zones.critical_min {
            TempZone::Critical
        } else if temp_c >= zones.warning_min {
            TempZone::Warning
        } else if temp_c >= zones.elevated_min {
            TempZone::Elevated
        } else {
            TempZone::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TempZone::Normal => "Normal",
            TempZone::Elevated => "Elevated",
            TempZone::Warning => "Warning",
            TempZone::Critical => "Critical",
        }
    }

    /// Score change when the zone does / does not agree with a vibration fault.
    fn score(self, consistent: bool) -> i32 {
        match (self, consistent) {
            (TempZone::Critical, true) => 20,
            (TempZone::Critical, false) => -10,
            (TempZone::Warning, true) => 15,
            (TempZone::Warning, false) => -5,
            (TempZone::Elevated, true) => 10,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingReading {
    pub machine: Machine,
    pub end: End,
    pub temp_c: f64,
    pub zone: TempZone,
}

impl BearingReading {
    pub fn label(&self) -> String {
        format!("{} {}", self.machine.label(), self.end.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureAdjustment {
    /// Clamped to `MIN_ADJUSTMENT..=MAX_ADJUSTMENT`.
    pub bonus: i32,
    pub notes: Vec<String>,
    /// Hottest zone among measured bearings; `None` when nothing was measured.
    pub max_zone: Option<TempZone>,
    pub readings: Vec<BearingReading>,
}

/// Compute the confidence adjustment and notes for the bearing temperatures.
pub fn adjust_for_temperature(
    temps: &BearingTemps,
    mechanical_fault_present: bool,
    catalog: &ThresholdCatalog,
) -> TemperatureAdjustment {
    let zones = &catalog.temperature;
    let readings: Vec<BearingReading> = temps
        .measured()
        .into_iter()
        .map(|(machine, end, temp_c)| BearingReading {
            machine,
            end,
            temp_c,
            zone: TempZone::classify(temp_c, zones),
        })
        .collect();

    let mut raw = 0;
    let mut notes = Vec::new();

    for r in &readings {
        let delta = r.zone.score(mechanical_fault_present);
        raw += delta;
        match r.zone {
            TempZone::Critical | TempZone::Warning if mechanical_fault_present => notes.push(format!(
                "{} bearing at {:.1} °C is in the {} zone and corroborates the vibration fault ({delta:+})",
                r.label(),
                r.temp_c,
                r.zone.label()
            )),
            TempZone::Critical | TempZone::Warning => notes.push(format!(
                "{} bearing at {:.1} °C is in the {} zone without a vibration fault; check lubrication and the sensor ({delta:+})",
                r.label(),
                r.temp_c,
                r.zone.label()
            )),
            TempZone::Elevated if mechanical_fault_present => notes.push(format!(
                "{} bearing at {:.1} °C is elevated ({delta:+})",
                r.label(),
                r.temp_c
            )),
            TempZone::Elevated => notes.push(format!("{} bearing at {:.1} °C is elevated", r.label(), r.temp_c)),
            TempZone::Normal if r.temp_c > zones.normal_max => notes.push(format!(
                "{} bearing at {:.1} °C is above {:.0} °C; watch the trend",
                r.label(),
                r.temp_c,
                zones.normal_max
            )),
            TempZone::Normal => {}
        }
    }

    let mut localized = false;
    for machine in Machine::ALL {
        let (Some(de), Some(nde)) = (temps.get(machine, End::De), temps.get(machine, End::Nde)) else {
            continue;
        };
        let delta_t = (de - nde).abs();
        if delta_t > zones.delta_t {
            localized = true;
            let hot_end = if de > nde { End::De } else { End::Nde };
            notes.push(format!(
                "{} DE/NDE differ by {delta_t:.1} °C; fault concentrated at the {} {} bearing",
                machine.label(),
                machine.label(),
                hot_end.label()
            ));
        }
    }
    if localized {
        raw += DELTA_T_BONUS;
    }

    if let (Some(motor_de), Some(pump_de)) = (
        temps.get(Machine::Motor, End::De),
        temps.get(Machine::Pump, End::De),
    ) {
        if motor_de - pump_de > zones.motor_over_pump {
            notes.push(format!(
                "Motor DE runs {:.1} °C hotter than Pump DE; consider an electrical origin",
                motor_de - pump_de
            ));
        }
    }

    let bonus = raw.clamp(MIN_ADJUSTMENT, MAX_ADJUSTMENT);
    tracing::debug!(raw, bonus, measured = readings.len(), "Temperature adjustment");

    TemperatureAdjustment {
        bonus,
        notes,
        max_zone: readings.iter().map(|r| r.zone).max(),
        readings,
    }
}
