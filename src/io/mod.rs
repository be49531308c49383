//! Input/output helpers.
//!
//! - run JSON read/write + boundary validation (`run_file`)
//! - points CSV ingest (`ingest`)
//! - analysis JSON export (`export`)

pub mod export;
pub mod ingest;
pub mod run_file;

pub use export::*;
pub use ingest::*;
pub use run_file::*;
