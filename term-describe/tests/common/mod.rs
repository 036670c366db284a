//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use term_describe::prelude::*;

pub fn identity(name: &str) -> DatasetIdentity {
    DatasetIdentity::new(format!("/data/{name}.csv"), None)
}

pub fn table(name: &str, columns: Vec<(&str, ArrayRef)>) -> Table {
    Table::from_columns(identity(name), columns).unwrap()
}

pub fn ints(values: impl IntoIterator<Item = i64>) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(values))
}

pub fn floats(values: Vec<Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

pub fn strings(values: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

pub fn assembler() -> ProfileAssembler {
    ProfileAssembler::new(ProfileConfig::default()).unwrap()
}

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// `id` 1..=100, `category` half `A` half `B`, `note` all null.
pub fn scenario_table() -> Table {
    let category: Vec<Option<&str>> = (0..100)
        .map(|i| Some(if i < 50 { "A" } else { "B" }))
        .collect();
    table(
        "scenario",
        vec![
            ("id", ints(1..=100)),
            ("category", strings(category)),
            ("note", strings(vec![None; 100])),
        ],
    )
}
