//! Shared table builders for tests and benchmarks.
//!
//! Each fixture is a small, fully deterministic Arrow table with a fixed
//! identity so profiles built from it can be compared byte for byte.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};

use crate::error::Result;
use crate::identity::DatasetIdentity;
use crate::table::Table;

/// Identity for an in-memory fixture named `name`.
pub fn fixture_identity(name: &str) -> DatasetIdentity {
    DatasetIdentity::new(format!("/fixtures/{name}.csv"), None)
}

/// `id` 1..=100, `category` half `A` half `B`, `note` all null.
pub fn scenario_table() -> Result<Table> {
    let category: Vec<&str> = (0..100).map(|i| if i < 50 { "A" } else { "B" }).collect();
    Table::from_columns(
        fixture_identity("scenario"),
        vec![
            ("id", Arc::new(Int64Array::from_iter_values(1..=100)) as ArrayRef),
            ("category", Arc::new(StringArray::from(category)) as ArrayRef),
            (
                "note",
                Arc::new(StringArray::from(vec![None::<&str>; 100])) as ArrayRef,
            ),
        ],
    )
}

/// `columns` float columns of `rows` rows each, column `i` holding `r * (i + 1) + (r % 3)`.
pub fn wide_numeric_table(columns: usize, rows: usize) -> Result<Table> {
    let arrays: Vec<(String, ArrayRef)> = (0..columns)
        .map(|i| {
            let values: Vec<f64> = (0..rows)
                .map(|r| (r * (i + 1) + r % 3) as f64)
                .collect();
            (format!("m{i}"), Arc::new(Float64Array::from(values)) as ArrayRef)
        })
        .collect();
    Table::from_columns(fixture_identity("wide"), arrays)
}

/// A publications-style table exercising every detector.
///
/// - `record_id`: key with two repeated values
/// - `title`: free text
/// - `authors`: `;`-separated lists
/// - `published`: `YYYY-MM-DD` strings
/// - `year`: integer years
/// - `citations`: integers with nulls
/// - `indexed_on`: typed dates
pub fn publications_table() -> Result<Table> {
    let rows = 40usize;
    let record_id: Vec<String> = (0..rows)
        .map(|i| match i {
            5 => "R-0001".to_string(),
            9 => "R-0002".to_string(),
            _ => format!("R-{:04}", i + 1),
        })
        .collect();
    let title: Vec<String> = (0..rows)
        .map(|i| format!("A study of sample number {i} in context {}", i * 7))
        .collect();
    let authors: Vec<String> = (0..rows)
        .map(|i| format!("Author {};Author {}", i % 5, i % 7 + 10))
        .collect();
    let published: Vec<String> = (0..rows)
        .map(|i| format!("{}-{:02}-{:02}", 2001 + i % 20, i % 12 + 1, i % 28 + 1))
        .collect();
    let year: Vec<i64> = (0..rows).map(|i| 2001 + (i % 20) as i64).collect();
    let citations: Vec<Option<i64>> = (0..rows)
        .map(|i| (i % 4 != 0).then_some((i * 3) as i64))
        .collect();
    // 2020-01-01 is day 18262 since the epoch
    let indexed_on: Vec<i32> = (0..rows).map(|i| 18_262 + (i * 11) as i32).collect();

    Table::from_columns(
        fixture_identity("publications"),
        vec![
            ("record_id", Arc::new(StringArray::from(record_id)) as ArrayRef),
            ("title", Arc::new(StringArray::from(title)) as ArrayRef),
            ("authors", Arc::new(StringArray::from(authors)) as ArrayRef),
            ("published", Arc::new(StringArray::from(published)) as ArrayRef),
            ("year", Arc::new(Int64Array::from(year)) as ArrayRef),
            ("citations", Arc::new(Int64Array::from(citations)) as ArrayRef),
            ("indexed_on", Arc::new(Date32Array::from(indexed_on)) as ArrayRef),
        ],
    )
}

/// A table with zero rows and two typed columns.
pub fn empty_table() -> Result<Table> {
    Table::from_columns(
        fixture_identity("empty"),
        vec![
            ("a", Arc::new(Int64Array::from(Vec::<i64>::new())) as ArrayRef),
            ("b", Arc::new(StringArray::from(Vec::<&str>::new())) as ArrayRef),
        ],
    )
}

/// A table where every row appears twice.
pub fn duplicated_rows_table() -> Result<Table> {
    let ids: Vec<i64> = (0..20).map(|i| i / 2).collect();
    let names: Vec<String> = (0..20).map(|i| format!("name-{}", i / 2)).collect();
    Table::from_columns(
        fixture_identity("duplicated"),
        vec![
            ("id", Arc::new(Int64Array::from(ids)) as ArrayRef),
            ("name", Arc::new(StringArray::from(names)) as ArrayRef),
        ],
    )
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}
