//! Error surfaced at the application boundary.
//!
//! Every fallible operation outside the pure classifiers returns `AppError`;
//! `main` turns its exit code into the process status.

/// Malformed input, unknown names, invalid catalog.
pub const EXIT_INVALID_INPUT: u8 = 2;
/// Nothing to analyze (no measurement points).
pub const EXIT_INSUFFICIENT_DATA: u8 = 3;
/// Failure writing output or serializing results.
pub const EXIT_INTERNAL: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_INPUT, message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(EXIT_INSUFFICIENT_DATA, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EXIT_INTERNAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

impl From<crate::catalog::CatalogError> for AppError {
    fn from(err: crate::catalog::CatalogError) -> Self {
        AppError::invalid_input(format!("Invalid threshold catalog: {err}"))
    }
}
