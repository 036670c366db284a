//! Crate-level error type for Term Describe.
//!
//! Statistic-level failures are modelled by
//! [`AnalyzerError`](crate::analyzers::AnalyzerError) and never escape
//! the column analyzer; dataset-level failures become failed profiles. Only the
//! variants below reach the caller.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DescribeError>;

/// Errors surfaced to callers of Term Describe.
#[derive(Error, Debug)]
pub enum DescribeError {
    /// A configuration value is out of range. Raised before any dataset is touched.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The supplied table violates the table model (e.g. duplicate column names).
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// A source could not be read into a table.
    #[error("Failed to load {path}: {message}")]
    Load {
        /// Path of the source that failed.
        path: String,
        /// Loader error message.
        message: String,
    },

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern while discovering sources.
    #[error("Invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    Task(String),
}

impl DescribeError {
    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an invalid table error with the given message.
    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }

    /// Creates a load error for the given path.
    pub fn load(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: msg.into(),
        }
    }
}

impl From<serde_json::Error> for DescribeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DescribeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
