//! Getting tables into the engine.
//!
//! Discovery turns input paths into a sorted list of source files; a
//! [`TableLoader`] turns one file into a [`Table`]. Spreadsheet sources are not
//! bundled: a loader for them only has to produce one `Table` per sheet with
//! the sheet name set on its identity.

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::table::Table;

mod csv;
mod discover;

pub use csv::{unique_headers, CsvLoader, CsvOptions};
pub use discover::{discover_sources, is_supported};

/// Loads a source file into an in-memory table.
///
/// # Examples
///
/// ```rust,no_run
/// use term_describe::sources::{CsvLoader, TableLoader};
///
/// # async fn example() -> term_describe::error::Result<()> {
/// let loader = CsvLoader::new();
/// let table = loader.load("data/users.csv".as_ref()).await?;
/// println!("{} rows", table.row_count());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TableLoader: Debug + Send + Sync {
    /// Reads `path` and returns its table. Unreadable input is a `DescribeError::Load`.
    async fn load(&self, path: &Path) -> Result<Table>;

    /// Human-readable description of the loader.
    fn description(&self) -> String;
}
