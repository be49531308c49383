//! Classification and fusion.
//!
//! Everything here is a pure function of its inputs and the threshold catalog:
//! no I/O, no shared state. Each classifier returns a `DomainResult`; the
//! correlator fuses them into an `IntegratedResult`.

pub mod aggregate;
pub mod correlate;
pub mod electrical;
pub mod hydraulic;
pub mod mechanical;
pub mod temperature;
pub mod triage;

pub use aggregate::{SystemVerdict, VoteTally, aggregate_system};
pub use correlate::correlate;
pub use electrical::classify_electrical;
pub use hydraulic::classify_hydraulic;
pub use mechanical::classify_point;
pub use temperature::{TempZone, TemperatureAdjustment, adjust_for_temperature};
pub use triage::{SystemSummary, points_requiring_spectrum, summarize};
