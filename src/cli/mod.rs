//! Command-line parsing for `pdx`.
//!
//! Argument parsing and command dispatch stay separate from the diagnostic
//! rules; handlers live in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::Scenario;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pdx", version, about = "Pump-motor condition diagnostics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Diagnose one run and print the report.
    Analyze(AnalyzeArgs),
    /// Write a synthetic run input for a fault scenario.
    Sample(SampleArgs),
    /// Re-render the report from an exported analysis JSON.
    Report(ReportArgs),
    /// Print or write the built-in threshold catalog.
    Catalog(CatalogArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Run input JSON.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,

    /// Points CSV; replaces any points in the run JSON.
    #[arg(long, value_name = "CSV")]
    pub points: Option<PathBuf>,

    /// Threshold catalog JSON (overrides PDX_CATALOG).
    #[arg(long, value_name = "JSON")]
    pub catalog: Option<PathBuf>,

    /// Export the full analysis as JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export one row per measurement point as CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// List every point in the report, not only those with findings.
    #[arg(long)]
    pub points_table: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    #[arg(long, value_enum, default_value_t = Scenario::Normal)]
    pub scenario: Scenario,

    /// Random seed for measurement noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Machine speed.
    #[arg(long, default_value_t = 1780.0)]
    pub rpm: f64,

    /// Output path; stdout when omitted.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// Analysis JSON written by `pdx analyze --export`.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// List every point, not only those with findings.
    #[arg(long)]
    pub points_table: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct CatalogArgs {
    /// Output path; stdout when omitted.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}
