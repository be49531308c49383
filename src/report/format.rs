//! Terminal report for one analysis run.

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{DomainResult, MeasurementPoint, MechanicalDetails};

use super::recommend::recommend;

/// Format the full report.
///
/// The per-point table lists only points with a non-normal verdict unless
/// `all_points` is set.
pub fn format_report(output: &AnalysisOutput, all_points: bool) -> String {
    let mut out = String::new();

    out.push_str("=== pdx - Pump-Motor Diagnostics ===\n");
    out.push_str(&format!("Machine: {}\n", output.machine_id));
    out.push_str(&format!("Speed: {:.0} rpm ({:.2} Hz)\n", output.rpm, output.rpm / 60.0));
    out.push_str(&format!(
        "Generated: {}\n",
        output.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out.push('\n');
    out.push_str(&format_verdict(output));
    out.push('\n');
    out.push_str(&format_breakdown(output));
    out.push('\n');
    out.push_str(&format_vote(output));

    let integrated = &output.integrated;
    if !integrated.correlation_notes.is_empty() {
        out.push_str("\nCorrelation notes:\n");
        for note in &integrated.correlation_notes {
            out.push_str(&format!("- {note}\n"));
        }
    }
    if !integrated.temperature_notes.is_empty() {
        out.push_str("\nTemperature notes:\n");
        for note in &integrated.temperature_notes {
            out.push_str(&format!("- {note}\n"));
        }
    }

    out.push('\n');
    out.push_str(&format_points(output, all_points));
    out.push('\n');
    out.push_str(&format_survey(output));
    out.push('\n');
    out.push_str(&format_recommendations(output));

    out.trim_end().to_string()
}

fn format_verdict(output: &AnalysisOutput) -> String {
    let r = &output.integrated;
    let mut out = String::new();
    out.push_str("Integrated verdict:\n");
    out.push_str(&format!("- diagnosis : {}\n", r.diagnosis));
    out.push_str(&format!("- confidence: {}%\n", r.confidence));
    out.push_str(&format!("- severity  : {}\n", r.severity.label()));
    out.push_str(&format!("- location  : {}\n", r.location));
    if r.temperature_adjustment != 0 {
        out.push_str(&format!("- temperature adjustment: {:+}\n", r.temperature_adjustment));
    }
    out
}

fn format_breakdown(output: &AnalysisOutput) -> String {
    let b = &output.integrated.domain_breakdown;
    let mut out = String::new();
    out.push_str("Domain breakdown:\n");
    out.push_str(&format!(
        "{:<11} {:<24} {:>5} {:<8} {}\n",
        "Domain", "Diagnosis", "Conf", "Severity", "Location"
    ));
    for r in [&b.mechanical, &b.hydraulic, &b.electrical] {
        out.push_str(&format_domain_row(r));
    }
    out
}

fn format_domain_row(r: &DomainResult) -> String {
    format!(
        "{:<11} {:<24} {:>4}% {:<8} {}\n",
        r.domain.label(),
        r.diagnosis.to_string(),
        r.confidence,
        r.severity.label(),
        r.location
    )
}

fn format_vote(output: &AnalysisOutput) -> String {
    let verdict = &output.mechanical;
    let mut out = String::new();
    out.push_str("Mechanical vote:\n");

    let supporting = verdict
        .result
        .details
        .as_mechanical()
        .map(|d| d.supporting_points.as_slice())
        .unwrap_or_default();
    if supporting.is_empty() {
        out.push_str(&format!("- {}\n", verdict.result.diagnosis));
    } else {
        let labels: Vec<String> = supporting.iter().map(|id| id.label()).collect();
        out.push_str(&format!(
            "- {} agreed at {} points: {}\n",
            verdict.result.diagnosis,
            supporting.len(),
            labels.join(", ")
        ));
    }
    if verdict.needs_more_data {
        out.push_str("- confidence below threshold: collect more data before acting\n");
    }
    for tally in &verdict.unconfirmed {
        out.push_str(&format!(
            "- unconfirmed: {} at {} point(s)\n",
            tally.diagnosis.label(),
            tally.count
        ));
    }
    out
}

fn format_points(output: &AnalysisOutput, all_points: bool) -> String {
    let rows: Vec<(&MeasurementPoint, &DomainResult)> = output
        .points
        .iter()
        .zip(&output.point_results)
        .filter(|(_, r)| all_points || r.is_fault())
        .collect();

    let mut out = String::new();
    out.push_str(if all_points { "Points:\n" } else { "Points with findings:\n" });
    if rows.is_empty() {
        out.push_str("(none)\n");
        return out;
    }

    out.push_str(&format!(
        "{:<22} {:>7} {:<4} {:<18} {:>5} {}\n",
        "Point", "mm/s", "Zone", "Diagnosis", "Conf", "Pattern"
    ));
    for (point, result) in rows {
        let zone = result
            .details
            .as_mechanical()
            .map(|d| format!("{:?}", d.zone))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<22} {:>7.2} {:<4} {:<18} {:>4}% {}\n",
            point.id.label(),
            point.velocity_mm_s,
            zone,
            result.diagnosis.to_string(),
            result.confidence,
            pattern(point, result.details.as_mechanical())
        ));
    }
    out
}

/// Harmonic amplitudes when a spectrum was taken, otherwise band energies.
fn pattern(point: &MeasurementPoint, details: Option<&MechanicalDetails>) -> String {
    match details {
        Some(d) if point.has_spectrum() => {
            let amp = |a: Option<f64>| a.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
            format!(
                "1x {} / 2x {} / 3x {} mm/s",
                amp(d.harmonics.one_x),
                amp(d.harmonics.two_x),
                amp(d.harmonics.three_x)
            )
        }
        _ => format!(
            "B1/B2/B3 {:.2}/{:.2}/{:.2} g",
            point.bands.band1, point.bands.band2, point.bands.band3
        ),
    }
}

fn format_survey(output: &AnalysisOutput) -> String {
    let s = &output.summary;
    let mut out = String::new();
    out.push_str(&format!(
        "Survey: {} points | {} above Zone B | {} in Zone D | {} Band3 alerts | {} with spectrum\n",
        s.points, s.above_zone_b, s.danger, s.band3_alerts, s.with_spectrum
    ));
    if !output.spectrum_requests.is_empty() {
        let labels: Vec<String> = output.spectrum_requests.iter().map(|id| id.label()).collect();
        out.push_str(&format!("Spectrum recommended at: {}\n", labels.join(", ")));
    }
    out
}

fn format_recommendations(output: &AnalysisOutput) -> String {
    let recs: Vec<_> = [&output.mechanical.result, output.hydraulic(), output.electrical()]
        .into_iter()
        .filter_map(recommend)
        .collect();

    let mut out = String::new();
    out.push_str("Recommendations:\n");
    if recs.is_empty() {
        out.push_str("- No action required; continue routine monitoring.\n");
        return out;
    }
    for (i, rec) in recs.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, rec.title));
        for action in &rec.actions {
            out.push_str(&format!("   - {action}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_analysis;
    use crate::catalog::ThresholdCatalog;
    use crate::data::{Scenario, generate_run};

    fn report_for(scenario: Scenario, all_points: bool) -> String {
        let run = generate_run(scenario, 4, 1780.0).unwrap();
        let output = run_analysis(&run, &ThresholdCatalog::default()).unwrap();
        format_report(&output, all_points)
    }

    #[test]
    fn healthy_report_has_no_findings() {
        let report = report_for(Scenario::Normal, false);
        assert!(report.starts_with("=== pdx - Pump-Motor Diagnostics ==="));
        assert!(report.contains("Machine: SIM-NORMAL"));
        assert!(report.contains("Points with findings:\n(none)"));
        assert!(report.contains("No action required"));
        assert!(!report.contains("Spectrum recommended"));
    }

    #[test]
    fn all_points_lists_the_whole_survey() {
        let report = report_for(Scenario::Normal, true);
        assert!(report.contains("Pump DE Horizontal"));
        assert!(report.contains("Motor NDE Axial"));
    }

    #[test]
    fn unbalance_report_shows_vote_and_recommendation() {
        let report = report_for(Scenario::Unbalance, false);
        assert!(report.contains("UNBALANCE agreed at 8 points"));
        assert!(report.contains("1x "));
        assert!(report.contains("Pump-Motor System: Unbalance"));
        assert!(report.contains("Spectrum recommended at:"));
    }

    #[test]
    fn coupled_report_carries_correlation_notes() {
        let report = report_for(Scenario::Coupled, false);
        assert!(report.contains("Cascading Failure: Cavitation Origin"));
        assert!(report.contains("Correlation notes:"));
        assert!(report.contains("Temperature notes:"));
        assert!(report.contains("B1/B2/B3"));
    }
}
