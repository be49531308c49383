//! Terminal output: the analysis report and maintenance recommendations.

pub mod format;
pub mod recommend;

pub use format::format_report;
pub use recommend::{Recommendation, recommend};
