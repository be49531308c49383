//! Multi-point voting: 12 point verdicts → one mechanical verdict.
//!
//! Low-frequency faults (unbalance, misalignment, looseness) act on the whole
//! rotor, so they must be seen at several points before they are accepted
//! (quorum). Bearing faults are local: a single point may carry them, and a
//! High-severity bearing fault overrides any low-frequency verdict.

use serde::{Deserialize, Serialize};

use crate::catalog::ThresholdCatalog;
use crate::domain::{
    Diagnosis, Domain, DomainDetails, DomainResult, FaultType, MechanicalDetails,
    MechanicalDiagnosis, Severity, VelocityZone,
};

pub const SYSTEM_LOCATION: &str = "Pump-Motor System";

/// Number of points voting for one low-frequency diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub diagnosis: MechanicalDiagnosis,
    pub count: usize,
}

/// Mechanical-domain verdict plus voting diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemVerdict {
    pub result: DomainResult,
    /// Confidence is too low to act on; take more spectra first.
    pub needs_more_data: bool,
    /// Low-frequency votes not reflected in the final verdict (short of
    /// quorum, or overridden by a bearing fault).
    pub unconfirmed: Vec<VoteTally>,
}

/// Aggregate per-point mechanical results into one system verdict.
pub fn aggregate_system(results: &[DomainResult], catalog: &ThresholdCatalog) -> SystemVerdict {
    let quorum = catalog.rules.quorum;

    let low_freq: Vec<&DomainResult> = results
        .iter()
        .filter(|r| r.fault_type == Some(FaultType::LowFreq))
        .collect();
    let high_freq: Vec<&DomainResult> = results
        .iter()
        .filter(|r| r.fault_type == Some(FaultType::HighFreq))
        .collect();

    let tallies = tally(&low_freq);
    let mut verdict: Option<DomainResult> = None;

    if let Some(winner) = plurality(&tallies) {
        if winner.count >= quorum {
            let supporting: Vec<&DomainResult> = low_freq
                .iter()
                .copied()
                .filter(|r| r.diagnosis == Diagnosis::Mechanical(winner.diagnosis))
                .collect();
            verdict = Some(vote_result(winner.diagnosis, &supporting));
        }
    }

    if let Some(worst) = worst_by_severity(&high_freq) {
        if worst.severity == Severity::High {
            if verdict.is_some() {
                tracing::debug!(point = %worst.location, "High-severity bearing fault overrides low-frequency vote");
            }
            verdict = Some(worst.clone());
        } else if verdict.is_none() {
            verdict = Some(worst.clone());
        }
    }

    let result = match verdict {
        Some(v) => v,
        None => fallback_result(results, quorum),
    };

    let unconfirmed: Vec<VoteTally> = tallies
        .into_iter()
        .filter(|t| result.diagnosis != Diagnosis::Mechanical(t.diagnosis))
        .collect();

    let needs_more_data = result.confidence < catalog.rules.needs_more_data_below
        && result.diagnosis != Diagnosis::Mechanical(MechanicalDiagnosis::Normal);

    tracing::debug!(
        diagnosis = %result.diagnosis,
        confidence = result.confidence,
        severity = %result.severity,
        needs_more_data,
        "Mechanical system verdict"
    );

    SystemVerdict {
        result,
        needs_more_data,
        unconfirmed,
    }
}

/// Count diagnoses, keeping first-seen order.
fn tally(results: &[&DomainResult]) -> Vec<VoteTally> {
    let mut out: Vec<VoteTally> = Vec::new();
    for r in results {
        let Some(diagnosis) = r.diagnosis.as_mechanical() else {
            continue;
        };
        match out.iter_mut().find(|t| t.diagnosis == diagnosis) {
            Some(t) => t.count += 1,
            None => out.push(VoteTally { diagnosis, count: 1 }),
        }
    }
    out
}

/// Highest count; ties go to the diagnosis seen first.
fn plurality(tallies: &[VoteTally]) -> Option<&VoteTally> {
    let mut best: Option<&VoteTally> = None;
    for t in tallies {
        if best.is_none_or(|b| t.count > b.count) {
            best = Some(t);
        }
    }
    best
}

/// Highest severity; ties go to the earliest point.
fn worst_by_severity<'a>(results: &[&'a DomainResult]) -> Option<&'a DomainResult> {
    let mut worst: Option<&DomainResult> = None;
    for &r in results {
        if worst.is_none_or(|w| r.severity > w.severity) {
            worst = Some(r);
        }
    }
    worst
}

fn vote_result(diagnosis: MechanicalDiagnosis, supporting: &[&DomainResult]) -> DomainResult {
    let confidence = floor_mean(supporting.iter().map(|r| r.confidence));
    let severity = supporting
        .iter()
        .map(|r| r.severity)
        .max()
        .unwrap_or(Severity::Low);

    // The strongest supporting point stands in for the spectral evidence.
    let mut representative: Option<&DomainResult> = None;
    for &r in supporting {
        if representative.is_none_or(|b| r.confidence > b.confidence) {
            representative = Some(r);
        }
    }

    let mut details = representative
        .and_then(|r| r.details.as_mechanical().cloned())
        .unwrap_or_else(empty_details);
    details.supporting_points = supporting
        .iter()
        .filter_map(|r| r.details.as_mechanical().and_then(|d| d.point))
        .collect();

    DomainResult {
        diagnosis: Diagnosis::Mechanical(diagnosis),
        confidence,
        severity,
        fault_type: Some(FaultType::LowFreq),
        domain: Domain::Mechanical,
        location: SYSTEM_LOCATION.to_string(),
        details: DomainDetails::Mechanical(details),
    }
}

/// No fault verdict: inconclusive if enough points are unclassified, else normal.
fn fallback_result(results: &[DomainResult], quorum: usize) -> DomainResult {
    let unclassified: Vec<&DomainResult> = results
        .iter()
        .filter(|r| r.diagnosis == Diagnosis::Mechanical(MechanicalDiagnosis::Unclassified))
        .collect();

    let mut details = empty_details();
    if unclassified.len() >= quorum {
        details.supporting_points = unclassified
            .iter()
            .filter_map(|r| r.details.as_mechanical().and_then(|d| d.point))
            .collect();
        return DomainResult {
            diagnosis: Diagnosis::Mechanical(MechanicalDiagnosis::Unclassified),
            confidence: floor_mean(unclassified.iter().map(|r| r.confidence)),
            severity: Severity::Medium,
            fault_type: None,
            domain: Domain::Mechanical,
            location: SYSTEM_LOCATION.to_string(),
            details: DomainDetails::Mechanical(details),
        };
    }

    DomainResult {
        diagnosis: Diagnosis::Mechanical(MechanicalDiagnosis::Normal),
        confidence: 99,
        severity: Severity::Low,
        fault_type: Some(FaultType::Normal),
        domain: Domain::Mechanical,
        location: SYSTEM_LOCATION.to_string(),
        details: DomainDetails::Mechanical(details),
    }
}

fn empty_details() -> MechanicalDetails {
    MechanicalDetails {
        point: None,
        velocity_mm_s: 0.0,
        zone: VelocityZone::A,
        band_ratios: Default::default(),
        harmonics: Default::default(),
        rule: None,
        supporting_points: Vec::new(),
    }
}

fn floor_mean(values: impl Iterator<Item = u8>) -> u8 {
    let (sum, n) = values.fold((0u32, 0u32), |(s, n), v| (s + v as u32, n + 1));
    if n == 0 { 0 } else { (sum / n) as u8 }
}
