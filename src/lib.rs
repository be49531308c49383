//! `pump-diagnostics` library crate.
//!
//! The binary (`pdx`) is a thin wrapper around this library so that:
//!
//! - the diagnostic rules are testable without spawning processes
//! - the core (`diagnose`) stays free of I/O and can be embedded elsewhere

pub mod app;
pub mod catalog;
pub mod cli;
pub mod data;
pub mod diagnose;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
