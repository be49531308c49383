//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main:
//! - sets up logging and `.env`
//! - parses CLI arguments
//! - loads the catalog and inputs
//! - runs the analysis pipeline and prints the report
//! - writes optional exports and re-renders saved ones

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::catalog::{ThresholdCatalog, load_catalog, write_catalog_json};
use crate::cli::{AnalyzeArgs, CatalogArgs, Command, ReportArgs, SampleArgs};
use crate::error::AppError;

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "pump_diagnostics=info";

/// Entry point for the `pdx` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Sample(args) => handle_sample(args),
        Command::Report(args) => handle_report(args),
        Command::Catalog(args) => handle_catalog(args),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let mut run = crate::io::read_run_json(&args.run)?;

    if let Some(path) = &args.points {
        let ingest = crate::io::load_points_csv(path)?;
        if !run.points.is_empty() {
            tracing::info!(replaced = run.points.len(), "Points CSV replaces points from run JSON");
        }
        run.points = ingest.points;
    }

    let output = pipeline::run_analysis(&run, &catalog)?;
    println!("{}", crate::report::format_report(&output, args.points_table));

    if let Some(path) = &args.export {
        crate::io::write_analysis_json(path, &output)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_points_csv(path, &output)?;
    }
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let output = crate::io::read_analysis_json(&args.input)?;
    println!("{}", crate::report::format_report(&output, args.points_table));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let run = crate::data::generate_run(args.scenario, args.seed, args.rpm)?;
    match &args.out {
        Some(path) => {
            crate::io::write_run_json(path, &run)?;
            tracing::info!(path = %path.display(), scenario = args.scenario.display_name(), "Wrote sample run");
        }
        None => println!("{}", to_pretty_json(&run)?),
    }
    Ok(())
}

fn handle_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let catalog = ThresholdCatalog::default();
    match &args.out {
        Some(path) => write_catalog_json(path, &catalog)?,
        None => println!("{}", to_pretty_json(&catalog)?),
    }
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::internal(format!("Failed to serialize JSON: {e}")))
}
