//! Prelude for commonly used types and traits in term-describe.

pub use crate::aggregate::MasterSummary;
pub use crate::assembler::ProfileAssembler;
pub use crate::config::{ProfileConfig, WarningThresholds};
pub use crate::error::{DescribeError, Result};
pub use crate::formatters::{FormatterConfig, JsonFormatter, MarkdownFormatter, ReportFormatter};
pub use crate::identity::DatasetIdentity;
pub use crate::logging::LogConfig;
pub use crate::profile::{ColumnKind, ColumnProfile, DatasetProfile, ProfileStatus};
pub use crate::runner::{CancellationHandle, ProfileRunner, RunReport};
pub use crate::sources::{discover_sources, CsvLoader, TableLoader};
pub use crate::table::{DeclaredType, Table};
pub use crate::warnings::{QualityRule, QualityWarning, Severity, WarningEngine, WarningKind};
