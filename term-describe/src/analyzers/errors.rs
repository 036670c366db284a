//! Error types for statistic computation.
//!
//! These errors never escape the assembler: a failed statistic is recorded as
//! an absent field plus a diagnostic note.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur while computing a single statistic or detector.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Arrow computation error (casts, row conversion).
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(#[from] arrow::error::ArrowError),

    /// Data type mismatch or invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl AnalyzerError {
    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}
