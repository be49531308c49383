//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement inputs (`MeasurementPoint`, `BearingTemps`, hydraulic/electrical readings)
//! - per-domain verdicts (`DomainResult` with typed `DomainDetails`)
//! - the fused machine verdict (`IntegratedResult`)

pub mod types;

pub use types::*;
