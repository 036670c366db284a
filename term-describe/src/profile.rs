//! Profile data structures produced by the assembler.
//!
//! Every optional statistic is an `Option` and is skipped on serialization
//! when absent: "not computed" never shows up as a zero.

use serde::{Deserialize, Serialize};

use crate::identity::DatasetIdentity;
use crate::sampling::SamplingInfo;
use crate::table::DeclaredType;
use crate::warnings::QualityWarning;

/// Analysis tag chosen for a column. One analysis function exists per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Integer or float column.
    Numeric,
    /// Low-cardinality string column, or boolean column.
    Categorical,
    /// Free-text string column.
    Text,
    /// Typed temporal column or string column that parses as dates.
    Temporal,
    /// Column without a single non-null value.
    Empty,
    /// Unsupported declared type; only schema-level fields are reported.
    Unknown,
}

/// Numeric summary over the profiled rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1). Absent below two values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub zero_pct: f64,
    /// `(mean - median) / std`. Absent when std is absent or zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approx_skew: Option<f64>,
    pub is_integer: bool,
}

/// One entry of a categorical top-K list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopValue {
    pub value: String,
    pub count: usize,
    /// Percentage of non-null profiled rows.
    pub pct: f64,
}

/// Frequency summary of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    /// Non-null values counted.
    pub values_counted: usize,
    /// Distinct non-null values among the profiled rows.
    pub distinct: usize,
    pub top: Vec<TopValue>,
}

/// Shape of a free-text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub non_null: usize,
    pub empty: usize,
    pub whitespace_only: usize,
    pub avg_len: f64,
    pub min_len: usize,
    pub p50_len: usize,
    pub p90_len: usize,
    pub max_len: usize,
}

/// Where a temporal range came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TemporalSource {
    /// Arrow date or timestamp column.
    Typed,
    /// String column parsed with the given chrono format.
    Parsed { format: String },
    /// Integer column holding calendar years.
    YearColumn,
}

/// Observed date range of a temporal column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalRange {
    #[serde(flatten)]
    pub source: TemporalSource,
    pub values_parsed: usize,
    pub min_year: i32,
    pub max_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
}

/// Inclusive span of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min_year: i32,
    pub max_year: i32,
}

impl YearRange {
    /// Smallest range covering both.
    pub fn union(self, other: YearRange) -> YearRange {
        YearRange {
            min_year: self.min_year.min(other.min_year),
            max_year: self.max_year.max(other.max_year),
        }
    }
}

/// A text column whose values encode delimited lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListLike {
    pub delimiter: char,
    /// Percentage of non-null profiled values that split into two or more items.
    pub hit_pct: f64,
    pub avg_items: f64,
    pub p50_items: usize,
    pub p90_items: usize,
    pub max_items: usize,
    /// Most frequent items across all values, ties lexical.
    pub top_items: Vec<TopValue>,
}

/// Why a column was examined as a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyReason {
    UniqueRatio,
    NameHint,
    UniqueRatioAndName,
}

/// How badly a key candidate repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatSeverity {
    None,
    Low,
    High,
}

/// Full-table duplicate statistics for a key candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    pub reason: KeyReason,
    pub unique_ratio: f64,
    pub unique_keys: usize,
    /// Non-null rows beyond the first occurrence of each key.
    pub duplicate_count: usize,
    /// Distinct keys that occur more than once.
    pub repeated_keys: usize,
    /// Rows whose key occurs more than once.
    pub rows_in_repeated_keys: usize,
    /// `rows_in_repeated_keys / non_null * 100`.
    pub repeated_keys_pct: f64,
    pub avg_rows_per_key: f64,
    pub max_rows_per_key: usize,
    pub repeat_severity: RepeatSeverity,
    /// Most repeated keys, rows desc then key.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_repeated: Vec<RepeatedKey>,
}

/// A key value that occurs on more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedKey {
    pub key: String,
    pub rows: usize,
}

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: DeclaredType,
    pub kind: ColumnKind,
    pub non_null: usize,
    pub null_count: usize,
    pub null_pct: f64,
    /// Distinct non-null values over the full table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_count: Option<usize>,
    /// Distinct values counting null as one more value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_with_null: Option<usize>,
    pub sampled: bool,
    /// Rows used for distribution-sensitive statistics.
    pub rows_analyzed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_like: Option<ListLike>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_candidate: Option<KeyCandidate>,
}

impl ColumnProfile {
    /// Non-null unique ratio, when uniqueness is known and the column has values.
    pub fn unique_ratio(&self) -> Option<f64> {
        match self.unique_count {
            Some(unique) if self.non_null > 0 => Some(unique as f64 / self.non_null as f64),
            _ => None,
        }
    }
}

/// Dataset-level counts. All exact over the full table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub missing_cell_pct: f64,
    /// Rows that belong to a group of two or more identical rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_row_pct: Option<f64>,
    pub memory_bytes_estimate: usize,
}

/// Count of rows at or above a null percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsAtThreshold {
    pub threshold_pct: u8,
    pub rows: usize,
}

/// Distribution of per-row null percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMissingness {
    pub min_null_pct: f64,
    pub mean_null_pct: f64,
    pub p50_null_pct: f64,
    pub p90_null_pct: f64,
    pub p99_null_pct: f64,
    pub max_null_pct: f64,
    pub rows_at_or_above: Vec<RowsAtThreshold>,
}

/// Why correlation was not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// More numeric columns than `max_corr_cols`.
    TooManyColumns,
    /// Fewer than two numeric columns.
    NotEnoughColumns,
}

/// Correlation result: a full matrix or an explicit skip, never a partial matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationProfile {
    Matrix {
        /// Included numeric columns, in table order.
        columns: Vec<String>,
        /// Numeric columns left out for having fewer than two values or no variance.
        excluded: Vec<String>,
        /// Symmetric Pearson coefficients; `values[i][i] == 1.0`.
        values: Vec<Vec<Option<f64>>>,
    },
    Skipped {
        reason: SkipReason,
        numeric_columns: usize,
        limit: usize,
        detail: String,
    },
}

impl CorrelationProfile {
    /// True for the skip marker.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Coefficient between two included columns.
    pub fn coefficient(&self, a: &str, b: &str) -> Option<f64> {
        match self {
            Self::Matrix {
                columns, values, ..
            } => {
                let i = columns.iter().position(|c| c == a)?;
                let j = columns.iter().position(|c| c == b)?;
                values[i][j]
            }
            Self::Skipped { .. } => None,
        }
    }
}

/// First rows of the profiled subset, rendered as display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Outcome of profiling a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProfileStatus {
    /// All stages ran (some statistics may still be absent).
    Profiled,
    /// The table has no rows; only the schema was examined.
    Empty,
    /// The dataset could not be profiled at all.
    Failed { reason: String },
}

/// Immutable statistical profile of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub identity: DatasetIdentity,
    pub status: ProfileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<Overview>,
    pub sampling: SamplingInfo,
    pub columns: Vec<ColumnProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_missingness: Option<RowMissingness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_coverage: Option<YearRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
    pub warnings: Vec<QualityWarning>,
    /// Diagnostics about statistics that could not be computed.
    pub notes: Vec<String>,
}

impl DatasetProfile {
    /// Profile for a dataset whose table could not be produced.
    pub fn failed(identity: DatasetIdentity, reason: impl Into<String>) -> Self {
        Self {
            identity,
            status: ProfileStatus::Failed {
                reason: reason.into(),
            },
            overview: None,
            sampling: SamplingInfo {
                sampled: false,
                rows_total: 0,
                rows_profiled: 0,
                method: crate::sampling::SampleMethod::Head,
            },
            columns: Vec::new(),
            correlation: None,
            row_missingness: None,
            temporal_coverage: None,
            preview: None,
            warnings: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// True when the dataset could not be profiled.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ProfileStatus::Failed { .. })
    }

    /// Looks up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}
