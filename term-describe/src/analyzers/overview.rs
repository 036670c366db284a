//! Dataset-level counts over the full table.

use std::collections::HashMap;

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use arrow::util::display::array_value_to_string;

use super::errors::AnalyzerResult;
use super::values::pct;
use crate::profile::{Overview, Preview};

/// Null cells across all columns.
pub fn missing_cells(batch: &RecordBatch) -> usize {
    batch
        .columns()
        .iter()
        .map(|c| c.logical_null_count())
        .sum()
}

/// Rows that have at least one identical twin elsewhere in the table.
///
/// Every member of a duplicate group is counted, including its first occurrence.
/// Nulls compare equal to nulls.
pub fn duplicate_rows(batch: &RecordBatch) -> AnalyzerResult<usize> {
    if batch.num_columns() == 0 || batch.num_rows() < 2 {
        return Ok(0);
    }

    let fields = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;
    let rows = converter.convert_columns(batch.columns())?;

    let mut groups: HashMap<_, usize> = HashMap::with_capacity(rows.num_rows());
    for row in rows.iter() {
        *groups.entry(row).or_insert(0) += 1;
    }
    Ok(groups.values().filter(|&&n| n > 1).sum())
}

/// In-memory size of the table's Arrow buffers.
pub fn memory_estimate(batch: &RecordBatch) -> usize {
    batch.get_array_memory_size()
}

/// Overview of a table. Duplicate-row counts are `None` when rows cannot be compared.
pub fn overview(batch: &RecordBatch, duplicates: Option<usize>) -> Overview {
    let rows = batch.num_rows();
    let columns = batch.num_columns();
    let missing = missing_cells(batch);

    Overview {
        rows,
        columns,
        missing_cells: missing,
        missing_cell_pct: pct(missing, rows * columns),
        duplicate_rows: duplicates,
        duplicate_row_pct: duplicates.map(|d| pct(d, rows)),
        memory_bytes_estimate: memory_estimate(batch),
    }
}

/// First `limit` rows rendered with Arrow's display formatting. Nulls stay `None`.
pub fn preview(batch: &RecordBatch, limit: usize) -> AnalyzerResult<Preview> {
    let columns = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let masks: Vec<_> = batch.columns().iter().map(|c| c.logical_nulls()).collect();
    let n = batch.num_rows().min(limit);
    let mut rows = Vec::with_capacity(n);
    for row in 0..n {
        let mut cells = Vec::with_capacity(batch.num_columns());
        for (column, mask) in batch.columns().iter().zip(&masks) {
            if mask.as_ref().is_some_and(|m| m.is_null(row)) {
                cells.push(None);
            } else {
                cells.push(Some(array_value_to_string(column, row)?));
            }
        }
        rows.push(cells);
    }
    Ok(Preview { columns, rows })
}
