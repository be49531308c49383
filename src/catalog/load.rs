//! Catalog loading from JSON files and the environment.
//!
//! Resolution order:
//! 1. an explicit path (`--catalog`)
//! 2. `PDX_CATALOG` (may come from `.env`)
//! 3. built-in defaults
//!
//! Files only need to name the values they override; every omitted field keeps
//! its default.

use std::fs::File;
use std::path::{Path, PathBuf};

use super::{ThresholdCatalog, validate_catalog};
use crate::error::AppError;

pub const CATALOG_ENV_VAR: &str = "PDX_CATALOG";

/// Resolve and load the catalog for this process.
pub fn load_catalog(explicit: Option<&Path>) -> Result<ThresholdCatalog, AppError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CATALOG_ENV_VAR).map(PathBuf::from));

    let Some(path) = path else {
        tracing::debug!("Using built-in threshold catalog");
        return Ok(ThresholdCatalog::default());
    };

    let catalog = read_catalog_json(&path)?;
    tracing::info!(path = %path.display(), fluids = catalog.fluids.len(), "Loaded threshold catalog");
    Ok(catalog)
}

/// Read and validate a catalog JSON file.
pub fn read_catalog_json(path: &Path) -> Result<ThresholdCatalog, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open catalog JSON '{}': {e}", path.display())))?;
    let catalog: ThresholdCatalog = serde_json::from_reader(file)
        .map_err(|e| AppError::invalid_input(format!("Invalid catalog JSON '{}': {e}", path.display())))?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Write a catalog as pretty JSON (used to seed an editable override file).
pub fn write_catalog_json(path: &Path, catalog: &ThresholdCatalog) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create catalog JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, catalog)
        .map_err(|e| AppError::internal(format!("Failed to write catalog JSON: {e}")))?;
    Ok(())
}
