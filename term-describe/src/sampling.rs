//! Sampling and scale policy.
//!
//! Exact metrics (row and column counts, null counts, uniqueness, duplicate
//! rows, key repeats, memory) always scan the full table. Distribution-sensitive
//! metrics run over the first `sample_cap` rows once the table is larger than
//! the cap. Taking the head keeps results reproducible for identical input.

use arrow::array::{Array, ArrayRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

/// How the profiled row subset was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMethod {
    /// The first rows in table order.
    Head,
}

/// Sampling metadata recorded on every dataset profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingInfo {
    /// Whether distribution-sensitive metrics were computed on a sample.
    pub sampled: bool,
    /// Rows in the full table.
    pub rows_total: usize,
    /// Rows used for distribution-sensitive metrics.
    pub rows_profiled: usize,
    /// Sample selection method.
    pub method: SampleMethod,
}

/// Decision for one dataset: exact or head-sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    rows_total: usize,
    rows_profiled: usize,
}

impl SamplingPlan {
    /// Decides the plan for a table of `rows_total` rows.
    pub fn decide(rows_total: usize, sample_cap: usize) -> Self {
        Self {
            rows_total,
            rows_profiled: rows_total.min(sample_cap),
        }
    }

    /// True when the profiled subset is smaller than the table.
    pub fn is_sampled(&self) -> bool {
        self.rows_profiled < self.rows_total
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows_total == 0
    }

    /// Rows in the full table.
    pub fn rows_total(&self) -> usize {
        self.rows_total
    }

    /// Rows in the profiled subset.
    pub fn rows_profiled(&self) -> usize {
        self.rows_profiled
    }

    /// The profiled subset of a batch. Zero-copy; identity below the cap.
    pub fn sample_batch(&self, batch: &RecordBatch) -> RecordBatch {
        if self.is_sampled() {
            batch.slice(0, self.rows_profiled)
        } else {
            batch.clone()
        }
    }

    /// The profiled subset of a single column.
    pub fn sample_array(&self, array: &ArrayRef) -> ArrayRef {
        if self.is_sampled() {
            array.slice(0, self.rows_profiled)
        } else {
            array.clone()
        }
    }

    /// Metadata for the profile.
    pub fn info(&self) -> SamplingInfo {
        SamplingInfo {
            sampled: self.is_sampled(),
            rows_total: self.rows_total,
            rows_profiled: self.rows_profiled,
            method: SampleMethod::Head,
        }
    }
}
