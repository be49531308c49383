//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the classifiers by value
//! - loaded from a run file (JSON) or a points CSV
//! - exported to JSON after a run

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which half of the machine train a point sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Machine {
    Pump,
    Motor,
}

impl Machine {
    pub const ALL: [Machine; 2] = [Machine::Pump, Machine::Motor];

    pub fn label(self) -> &'static str {
        match self {
            Machine::Pump => "Pump",
            Machine::Motor => "Motor",
        }
    }
}

/// Drive end / non-drive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum End {
    #[serde(rename = "DE")]
    De,
    #[serde(rename = "NDE")]
    Nde,
}

impl End {
    pub const ALL: [End; 2] = [End::De, End::Nde];

    pub fn label(self) -> &'static str {
        match self {
            End::De => "DE",
            End::Nde => "NDE",
        }
    }
}

/// Transducer orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Horizontal,
    Vertical,
    Axial,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Horizontal, Direction::Vertical, Direction::Axial];

    pub fn label(self) -> &'static str {
        match self {
            Direction::Horizontal => "Horizontal",
            Direction::Vertical => "Vertical",
            Direction::Axial => "Axial",
        }
    }
}

/// One of the 12 fixed measurement locations.
///
/// Serialized as its label, e.g. `"Pump DE Horizontal"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PointId {
    pub machine: Machine,
    pub end: End,
    pub direction: Direction,
}

impl PointId {
    pub const fn new(machine: Machine, end: End, direction: Direction) -> Self {
        Self {
            machine,
            end,
            direction,
        }
    }

    /// All points in survey order: Pump DE, Pump NDE, Motor DE, Motor NDE,
    /// each as Horizontal / Vertical / Axial.
    pub const ALL: [PointId; 12] = [
        PointId::new(Machine::Pump, End::De, Direction::Horizontal),
        PointId::new(Machine::Pump, End::De, Direction::Vertical),
        PointId::new(Machine::Pump, End::De, Direction::Axial),
        PointId::new(Machine::Pump, End::Nde, Direction::Horizontal),
        PointId::new(Machine::Pump, End::Nde, Direction::Vertical),
        PointId::new(Machine::Pump, End::Nde, Direction::Axial),
        PointId::new(Machine::Motor, End::De, Direction::Horizontal),
        PointId::new(Machine::Motor, End::De, Direction::Vertical),
        PointId::new(Machine::Motor, End::De, Direction::Axial),
        PointId::new(Machine::Motor, End::Nde, Direction::Horizontal),
        PointId::new(Machine::Motor, End::Nde, Direction::Vertical),
        PointId::new(Machine::Motor, End::Nde, Direction::Axial),
    ];

    pub fn is_radial(self) -> bool {
        self.direction != Direction::Axial
    }

    pub fn label(self) -> String {
        format!(
            "{} {} {}",
            self.machine.label(),
            self.end.label(),
            self.direction.label()
        )
    }

    /// Parse a point label such as `"Pump DE Horizontal"` or `"motor nde a"`.
    ///
    /// Tokens may be separated by whitespace, `_` or `-`; the direction may be
    /// abbreviated to its first letter.
    pub fn parse(s: &str) -> Option<Self> {
        let tokens: Vec<String> = s
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_ascii_lowercase())
            .collect();
        let [machine, end, direction] = tokens.as_slice() else {
            return None;
        };

        let machine = match machine.as_str() {
            "pump" => Machine::Pump,
            "motor" => Machine::Motor,
            _ => return None,
        };
        let end = match end.as_str() {
            "de" => End::De,
            "nde" => End::Nde,
            _ => return None,
        };
        let direction = match direction.as_str() {
            "horizontal" | "h" => Direction::Horizontal,
            "vertical" | "v" => Direction::Vertical,
            "axial" | "a" => Direction::Axial,
            _ => return None,
        };
        Some(Self::new(machine, end, direction))
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl TryFrom<String> for PointId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PointId::parse(&value).ok_or_else(|| format!("Unknown measurement point '{value}'."))
    }
}

impl From<PointId> for String {
    fn from(value: PointId) -> Self {
        value.label()
    }
}

/// A single spectral line (frequency in Hz, amplitude in mm/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralPeak {
    pub freq_hz: f64,
    pub amp: f64,
}

/// Acceleration energy (g) in the three bearing-monitoring bands.
///
/// - Band1: 0.5–1.5 kHz (developed damage)
/// - Band2: 1.5–5 kHz (early damage)
/// - Band3: 5–16 kHz (incipient damage / lubrication)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandEnergies {
    pub band1: f64,
    pub band2: f64,
    pub band3: f64,
}

/// Raw readings taken at one measurement point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    pub id: PointId,
    /// Overall velocity (mm/s RMS).
    pub velocity_mm_s: f64,
    pub bands: BandEnergies,
    /// Up to three spectral peaks. Empty when no spectrum was taken.
    #[serde(default)]
    pub peaks: Vec<SpectralPeak>,
}

impl MeasurementPoint {
    pub fn has_spectrum(&self) -> bool {
        !self.peaks.is_empty()
    }
}

/// Bearing temperatures (°C). A value of `0` means "not measured".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingTemps {
    pub pump_de: f64,
    pub pump_nde: f64,
    pub motor_de: f64,
    pub motor_nde: f64,
}

impl BearingTemps {
    /// Reading for one bearing, `None` when it was not measured.
    pub fn get(&self, machine: Machine, end: End) -> Option<f64> {
        let value = match (machine, end) {
            (Machine::Pump, End::De) => self.pump_de,
            (Machine::Pump, End::Nde) => self.pump_nde,
            (Machine::Motor, End::De) => self.motor_de,
            (Machine::Motor, End::Nde) => self.motor_nde,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }

    /// All measured bearings in a fixed order (Pump DE, Pump NDE, Motor DE, Motor NDE).
    pub fn measured(&self) -> Vec<(Machine, End, f64)> {
        let mut out = Vec::with_capacity(4);
        for machine in Machine::ALL {
            for end in End::ALL {
                if let Some(t) = self.get(machine, end) {
                    out.push((machine, end, t));
                }
            }
        }
        out
    }
}

/// Ordinal severity. `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Mechanical,
    Hydraulic,
    Electrical,
}

impl Domain {
    pub fn label(self) -> &'static str {
        match self {
            Domain::Mechanical => "Mechanical",
            Domain::Hydraulic => "Hydraulic",
            Domain::Electrical => "Electrical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MechanicalDiagnosis {
    Normal,
    Unbalance,
    Misalignment,
    Looseness,
    BearingEarly,
    BearingDeveloped,
    BearingSevere,
    Unclassified,
}

impl MechanicalDiagnosis {
    pub fn label(self) -> &'static str {
        match self {
            MechanicalDiagnosis::Normal => "Normal",
            MechanicalDiagnosis::Unbalance => "UNBALANCE",
            MechanicalDiagnosis::Misalignment => "MISALIGNMENT",
            MechanicalDiagnosis::Looseness => "LOOSENESS",
            MechanicalDiagnosis::BearingEarly => "BEARING_EARLY",
            MechanicalDiagnosis::BearingDeveloped => "BEARING_DEVELOPED",
            MechanicalDiagnosis::BearingSevere => "BEARING_SEVERE",
            MechanicalDiagnosis::Unclassified => "Unclassified",
        }
    }

    /// Bearing diagnoses are the mechanical "wear" signature.
    pub fn is_bearing_wear(self) -> bool {
        matches!(
            self,
            MechanicalDiagnosis::BearingEarly
                | MechanicalDiagnosis::BearingDeveloped
                | MechanicalDiagnosis::BearingSevere
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HydraulicDiagnosis {
    Cavitation,
    ImpellerWear,
    SystemResistanceHigh,
    EfficiencyDrop,
    NormalOperation,
    Unclassified,
}

impl HydraulicDiagnosis {
    pub fn label(self) -> &'static str {
        match self {
            HydraulicDiagnosis::Cavitation => "CAVITATION",
            HydraulicDiagnosis::ImpellerWear => "IMPELLER_WEAR",
            HydraulicDiagnosis::SystemResistanceHigh => "SYSTEM_RESISTANCE_HIGH",
            HydraulicDiagnosis::EfficiencyDrop => "EFFICIENCY_DROP",
            HydraulicDiagnosis::NormalOperation => "NORMAL_OPERATION",
            HydraulicDiagnosis::Unclassified => "Unclassified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectricalDiagnosis {
    UnderVoltage,
    OverVoltage,
    VoltageUnbalance,
    CurrentUnbalance,
    OverLoad,
    UnderLoad,
    NormalElectrical,
    Unclassified,
}

impl ElectricalDiagnosis {
    pub fn label(self) -> &'static str {
        match self {
            ElectricalDiagnosis::UnderVoltage => "UNDER_VOLTAGE",
            ElectricalDiagnosis::OverVoltage => "OVER_VOLTAGE",
            ElectricalDiagnosis::VoltageUnbalance => "VOLTAGE_UNBALANCE",
            ElectricalDiagnosis::CurrentUnbalance => "CURRENT_UNBALANCE",
            ElectricalDiagnosis::OverLoad => "OVER_LOAD",
            ElectricalDiagnosis::UnderLoad => "UNDER_LOAD",
            ElectricalDiagnosis::NormalElectrical => "NORMAL_ELECTRICAL",
            ElectricalDiagnosis::Unclassified => "Unclassified",
        }
    }
}

/// Closed diagnosis vocabulary, tagged by domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagnosis {
    Mechanical(MechanicalDiagnosis),
    Hydraulic(HydraulicDiagnosis),
    Electrical(ElectricalDiagnosis),
}

impl Diagnosis {
    pub fn label(self) -> &'static str {
        match self {
            Diagnosis::Mechanical(d) => d.label(),
            Diagnosis::Hydraulic(d) => d.label(),
            Diagnosis::Electrical(d) => d.label(),
        }
    }

    pub fn as_mechanical(self) -> Option<MechanicalDiagnosis> {
        match self {
            Diagnosis::Mechanical(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_electrical(self) -> Option<ElectricalDiagnosis> {
        match self {
            Diagnosis::Electrical(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_unclassified(self) -> bool {
        matches!(
            self,
            Diagnosis::Mechanical(MechanicalDiagnosis::Unclassified)
                | Diagnosis::Hydraulic(HydraulicDiagnosis::Unclassified)
                | Diagnosis::Electrical(ElectricalDiagnosis::Unclassified)
        )
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse fault family used for voting and cross-domain matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    LowFreq,
    HighFreq,
    Cavitation,
    Wear,
    Resistance,
    Efficiency,
    Voltage,
    Current,
    Load,
    Normal,
}

/// Velocity severity zone (ISO 10816 style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VelocityZone {
    A,
    B,
    C,
    D,
}

/// Which mechanical rule produced a point verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanicalRule {
    Unbalance,
    Misalignment,
    Looseness,
    BearingEarly,
    BearingDeveloped,
    BearingSevere,
}

/// Amplitudes of the running-speed harmonics found in a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Harmonics {
    pub one_x: Option<f64>,
    pub two_x: Option<f64>,
    pub three_x: Option<f64>,
}

/// Band energies divided by their baselines.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandRatios {
    pub band1: f64,
    pub band2: f64,
    pub band3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalDetails {
    /// The point that produced (or best represents) the verdict.
    pub point: Option<PointId>,
    pub velocity_mm_s: f64,
    pub zone: VelocityZone,
    pub band_ratios: BandRatios,
    pub harmonics: Harmonics,
    pub rule: Option<MechanicalRule>,
    /// Points whose agreement established a system verdict.
    #[serde(default)]
    pub supporting_points: Vec<PointId>,
}

/// Shape of the deviation from the design duty point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviationPattern {
    UnderPerformance,
    OverResistance,
    EfficiencyDrop,
    Normal,
    MixedDeviation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicDetails {
    pub head_m: f64,
    pub hydraulic_power_kw: f64,
    pub efficiency_pct: f64,
    pub head_deviation_pct: f64,
    pub efficiency_deviation_pct: f64,
    pub flow_deviation_pct: f64,
    pub npsh_margin_m: f64,
    pub pattern: DeviationPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectricalDetails {
    pub avg_voltage_v: f64,
    pub avg_current_a: f64,
    pub voltage_unbalance_pct: f64,
    pub current_unbalance_pct: f64,
    pub load_pct: f64,
    pub voltage_in_tolerance: bool,
    /// Load above the warning limit while still below the overload limit.
    pub high_load: bool,
}

/// Typed per-domain explanation fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainDetails {
    Mechanical(MechanicalDetails),
    Hydraulic(HydraulicDetails),
    Electrical(ElectricalDetails),
}

impl DomainDetails {
    pub fn as_mechanical(&self) -> Option<&MechanicalDetails> {
        match self {
            DomainDetails::Mechanical(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_hydraulic(&self) -> Option<&HydraulicDetails> {
        match self {
            DomainDetails::Hydraulic(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_electrical(&self) -> Option<&ElectricalDetails> {
        match self {
            DomainDetails::Electrical(d) => Some(d),
            _ => None,
        }
    }
}

/// Output of any single-domain classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    pub diagnosis: Diagnosis,
    /// 0–99.
    pub confidence: u8,
    pub severity: Severity,
    pub fault_type: Option<FaultType>,
    pub domain: Domain,
    pub location: String,
    pub details: DomainDetails,
}

impl DomainResult {
    /// True when the result names an actual fault (not normal, not inconclusive).
    pub fn is_fault(&self) -> bool {
        !matches!(self.fault_type, None | Some(FaultType::Normal))
    }
}

/// The three finalized domain verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBreakdown {
    pub mechanical: DomainResult,
    pub hydraulic: DomainResult,
    pub electrical: DomainResult,
}

/// Named causal chains recognised across domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalPattern {
    /// Electrical supply problem driving a mechanical fault that degrades head.
    ElectricalMechanicalHydraulic,
    /// Cavitation wearing the bearings and unbalancing the motor current.
    CavitationCascade,
    /// Overloaded motor while the pump wastes energy internally.
    InternalLoss,
}

impl CausalPattern {
    pub fn label(self) -> &'static str {
        match self {
            CausalPattern::ElectricalMechanicalHydraulic => {
                "Electrical-Mechanical-Hydraulic Coupled Fault"
            }
            CausalPattern::CavitationCascade => "Cascading Failure: Cavitation Origin",
            CausalPattern::InternalLoss => "Internal Loss Investigation Required",
        }
    }
}

/// Machine-level verdict fused from all domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedResult {
    pub diagnosis: String,
    /// 0–95.
    pub confidence: u8,
    pub severity: Severity,
    pub location: String,
    pub patterns: Vec<CausalPattern>,
    pub correlation_notes: Vec<String>,
    pub temperature_adjustment: i32,
    pub temperature_notes: Vec<String>,
    pub domain_breakdown: DomainBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicMeasurements {
    pub suction_bar: f64,
    pub discharge_bar: f64,
    pub flow_m3h: f64,
    pub motor_power_kw: f64,
}

/// Design duty point from the pump datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignReference {
    pub rated_flow_m3h: f64,
    pub rated_head_m: f64,
    pub bep_efficiency_pct: f64,
    pub npsh_required_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidRisk {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    pub specific_gravity: f64,
    pub vapor_pressure_kpa: f64,
    pub risk: FluidRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    #[default]
    Normal,
    /// Gravel-like crackle from collapsing vapour bubbles.
    Crackling,
    Grinding,
    Whining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidClarity {
    #[default]
    Clear,
    SlightlyTurbid,
    Turbid,
}

/// Field observations recorded by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Observations {
    pub noise: NoiseType,
    pub clarity: FluidClarity,
}

/// Line-to-line voltages (V) and phase currents (A).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreePhaseReadings {
    pub voltages: [f64; 3],
    pub currents: [f64; 3],
}

/// Nameplate rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatedElectrical {
    pub voltage_v: f64,
    /// Full-load amps.
    pub current_a: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicInput {
    pub measurements: HydraulicMeasurements,
    pub design: DesignReference,
    /// Fluid name, resolved against the catalog's fluid table.
    pub fluid: String,
    #[serde(default)]
    pub observations: Observations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalInput {
    pub readings: ThreePhaseReadings,
    pub rated: RatedElectrical,
}

/// Everything collected for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    pub machine_id: String,
    /// Fixed operating speed.
    pub rpm: f64,
    /// The 12 survey points (may instead be supplied as a CSV).
    #[serde(default)]
    pub points: Vec<MeasurementPoint>,
    #[serde(default)]
    pub bearing_temps: BearingTemps,
    pub hydraulic: HydraulicInput,
    pub electrical: ElectricalInput,
}

impl RunInput {
    /// Running frequency (1×) in Hz.
    pub fn rpm_hz(&self) -> f64 {
        self.rpm / 60.0
    }
}
