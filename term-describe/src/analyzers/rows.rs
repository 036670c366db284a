//! Per-row missingness over the full table.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;

use super::values::{mean, nearest_rank, sort_floats};
use crate::profile::{RowMissingness, RowsAtThreshold};

/// Null-percentage thresholds reported as row counts.
pub const THRESHOLDS: [u8; 7] = [0, 10, 25, 50, 75, 90, 100];

/// Distribution of null percentages across rows. `None` for an empty table.
pub fn row_missingness(batch: &RecordBatch) -> Option<RowMissingness> {
    let rows = batch.num_rows();
    let columns = batch.num_columns();
    if rows == 0 || columns == 0 {
        return None;
    }

    let mut nulls = vec![0usize; rows];
    for column in batch.columns() {
        if let Some(mask) = column.logical_nulls() {
            for (idx, count) in nulls.iter_mut().enumerate() {
                if mask.is_null(idx) {
                    *count += 1;
                }
            }
        }
    }

    let mut null_pct: Vec<f64> = nulls
        .iter()
        .map(|&n| n as f64 / columns as f64 * 100.0)
        .collect();
    sort_floats(&mut null_pct);

    let rows_at_or_above = THRESHOLDS
        .iter()
        .map(|&threshold_pct| RowsAtThreshold {
            threshold_pct,
            rows: null_pct
                .iter()
                .filter(|&&p| p >= f64::from(threshold_pct))
                .count(),
        })
        .collect();

    Some(RowMissingness {
        min_null_pct: *null_pct.first()?,
        mean_null_pct: mean(&null_pct)?,
        p50_null_pct: nearest_rank(&null_pct, 0.5)?,
        p90_null_pct: nearest_rank(&null_pct, 0.9)?,
        p99_null_pct: nearest_rank(&null_pct, 0.99)?,
        max_null_pct: *null_pct.last()?,
        rows_at_or_above,
    })
}
