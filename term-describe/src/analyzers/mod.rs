//! Statistic computation over Arrow arrays.
//!
//! This module holds the analyzers the assembler runs for every dataset.
//! Analyzers are plain functions over Arrow data: they never perform I/O and
//! never see more than the table they are given.
//!
//! ## Available Analyzers
//!
//! - **Column Analyzer** (`column`): null, uniqueness, numeric, categorical, text and temporal statistics
//! - **Cross-Column Analyzer** (`correlation`): Pearson matrix with a column-count guardrail
//! - **Overview** (`overview`): missing cells, duplicate rows and memory footprint
//! - **Row Missingness** (`rows`): distribution of null percentages per row
//!
//! ## Failure model
//!
//! Fallible statistics return [`AnalyzerResult`]. A failure removes that one
//! statistic from the profile and is surfaced as a [`SoftFailure`]:
//!
//! ```rust
//! use term_describe::analyzers::SoftFailure;
//!
//! let failure = SoftFailure::column("price", "numeric statistics", "cast failed");
//! assert_eq!(
//!     failure.note(),
//!     "numeric statistics for column 'price' omitted: cast failed"
//! );
//! ```

pub mod column;
pub mod correlation;
pub mod errors;
pub mod overview;
pub mod rows;
pub mod values;

pub use column::{analyze_column, ColumnAnalysis};
pub use correlation::correlate;
pub use errors::{AnalyzerError, AnalyzerResult};

/// A statistic that could not be computed and was omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    /// Affected column; `None` for dataset-level statistics.
    pub column: Option<String>,
    /// Name of the omitted statistic.
    pub statistic: String,
    /// Underlying error message.
    pub message: String,
}

impl SoftFailure {
    /// Failure of a column-level statistic.
    pub fn column(
        column: impl Into<String>,
        statistic: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column: Some(column.into()),
            statistic: statistic.into(),
            message: message.into(),
        }
    }

    /// Failure of a dataset-level statistic.
    pub fn dataset(statistic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: None,
            statistic: statistic.into(),
            message: message.into(),
        }
    }

    /// One-line note recorded on the profile.
    pub fn note(&self) -> String {
        match &self.column {
            Some(column) => format!(
                "{} for column '{column}' omitted: {}",
                self.statistic, self.message
            ),
            None => format!("{} omitted: {}", self.statistic, self.message),
        }
    }
}
