//! # Term Describe - Deterministic profiling for tabular data
//!
//! Term Describe turns tabular datasets into structured, reproducible
//! statistical profiles and merges many profiles into one master summary. It is
//! built on Apache Arrow for in-memory columns and DataFusion for reading CSV
//! sources.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use term_describe::prelude::*;
//!
//! # async fn example() -> term_describe::error::Result<()> {
//! let config = ProfileConfig::builder().top_k(5).build()?;
//! let runner = ProfileRunner::new(ProfileAssembler::new(config)?, Arc::new(CsvLoader::new()));
//!
//! let report = runner.run(&["data/"]).await?;
//! for profile in &report.profiles {
//!     println!("{}", MarkdownFormatter::new().format_profile(profile)?);
//! }
//!
//! let summary = report.summary(runner.config());
//! println!("{}", JsonFormatter::new().format_summary(&summary)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## What a profile contains
//!
//! - **Overview**: rows, columns, missing cells, exact duplicate rows, memory estimate
//! - **Columns**: null and unique counts plus numeric, categorical, text or
//!   temporal statistics depending on the column's kind
//! - **Structure**: list-like delimiters, key candidates with repeat analysis,
//!   year coverage
//! - **Correlation**: Pearson matrix over numeric columns, skipped past a width limit
//! - **Warnings**: rule-based quality findings with numeric evidence
//!
//! Large tables are profiled exactly for counts and on a head sample for
//! distribution statistics (see [`sampling`]). A statistic that cannot be
//! computed is left out and explained in the profile's notes instead of failing
//! the dataset.
//!
//! ## Architecture
//!
//! - **`table`** / **`identity`**: the input model and stable dataset ids
//! - **`analyzers`**: per-column, correlation, overview and row-level statistics
//! - **`detectors`**: list-like, key and temporal detection
//! - **`warnings`**: the quality rule engine
//! - **`assembler`**: builds one `DatasetProfile` from a `Table`
//! - **`aggregate`**: builds the `MasterSummary`
//! - **`sources`** / **`runner`**: discovery, CSV loading and concurrent runs
//! - **`formatters`**: JSON and Markdown rendering

pub mod aggregate;
pub mod analyzers;
pub mod assembler;
pub mod config;
pub mod detectors;
pub mod error;
pub mod formatters;
pub mod identity;
pub mod logging;
pub mod prelude;
pub mod profile;
pub mod runner;
pub mod sampling;
pub mod sources;
pub mod table;
pub mod warnings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
