//! Rule-based quality warnings.
//!
//! The [`WarningEngine`] holds an ordered list of [`QualityRule`]s and runs them
//! over a profile in progress. Rules are pure: they read statistics and return
//! warnings, one per matching subject, in a fixed order so repeated runs produce
//! identical warning sequences.
//!
//! ## Example
//!
//! ```rust
//! use term_describe::config::WarningThresholds;
//! use term_describe::warnings::WarningEngine;
//!
//! let engine = WarningEngine::from_thresholds(&WarningThresholds::default());
//! assert_eq!(engine.rule_names()[0], "EmptyDatasetRule");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::SoftFailure;
use crate::config::WarningThresholds;
use crate::profile::{
    ColumnKind, ColumnProfile, CorrelationProfile, Overview, RepeatSeverity, SkipReason,
};

/// Warning severity, ordered `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    EmptyDataset,
    HighMissingness,
    ConstantColumn,
    DuplicateRows,
    WideCorrelationSkipped,
    SuspectedKeyWithDuplicates,
    HighCardinalityCategorical,
    ProfilingDiagnostic,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A structured finding about a dataset or one of its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityWarning {
    pub kind: WarningKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
    /// Numbers that triggered the warning, keyed by name.
    pub evidence: BTreeMap<String, f64>,
}

impl QualityWarning {
    /// Creates a warning without evidence.
    pub fn new(kind: WarningKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            column: None,
            message: message.into(),
            evidence: BTreeMap::new(),
        }
    }

    /// Attaches the affected column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Adds one evidence value.
    pub fn with_evidence(mut self, name: impl Into<String>, value: f64) -> Self {
        self.evidence.insert(name.into(), value);
        self
    }

    /// Diagnostic for a statistic that was omitted.
    pub fn diagnostic(failure: &SoftFailure) -> Self {
        let warning = Self::new(
            WarningKind::ProfilingDiagnostic,
            Severity::Warning,
            failure.note(),
        );
        match &failure.column {
            Some(column) => warning.with_column(column.clone()),
            None => warning,
        }
    }
}

/// Profile-in-progress as seen by the rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub overview: &'a Overview,
    pub columns: &'a [ColumnProfile],
    pub correlation: Option<&'a CorrelationProfile>,
}

/// A single quality rule.
pub trait QualityRule: Send + Sync {
    /// Evaluates the rule and returns zero or more warnings.
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning>;

    /// Rule name.
    fn name(&self) -> &str;

    /// What the rule looks for.
    fn description(&self) -> &str;
}

/// Flags tables without rows or columns.
#[derive(Debug, Clone, Default)]
pub struct EmptyDatasetRule;

impl QualityRule for EmptyDatasetRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        let overview = input.overview;
        if overview.rows > 0 && overview.columns > 0 {
            return Vec::new();
        }
        vec![QualityWarning::new(
            WarningKind::EmptyDataset,
            Severity::Info,
            format!(
                "Dataset is empty ({} rows, {} columns)",
                overview.rows, overview.columns
            ),
        )
        .with_evidence("rows", overview.rows as f64)
        .with_evidence("columns", overview.columns as f64)]
    }

    fn name(&self) -> &str {
        "EmptyDatasetRule"
    }

    fn description(&self) -> &str {
        "Reports datasets with zero rows or zero columns"
    }
}

/// Flags datasets with a high share of missing cells.
#[derive(Debug, Clone)]
pub struct DatasetMissingnessRule {
    threshold_pct: f64,
}

impl DatasetMissingnessRule {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }
}

impl QualityRule for DatasetMissingnessRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        let overview = input.overview;
        if overview.rows == 0 || overview.missing_cell_pct < self.threshold_pct {
            return Vec::new();
        }
        vec![QualityWarning::new(
            WarningKind::HighMissingness,
            Severity::Warning,
            format!(
                "{:.1}% of all cells are missing (threshold {:.1}%)",
                overview.missing_cell_pct, self.threshold_pct
            ),
        )
        .with_evidence("missing_cell_pct", overview.missing_cell_pct)
        .with_evidence("missing_cells", overview.missing_cells as f64)
        .with_evidence("threshold_pct", self.threshold_pct)]
    }

    fn name(&self) -> &str {
        "DatasetMissingnessRule"
    }

    fn description(&self) -> &str {
        "Checks the dataset-wide missing cell percentage"
    }
}

/// Flags columns that are mostly null.
#[derive(Debug, Clone)]
pub struct ColumnMissingnessRule {
    threshold_pct: f64,
}

impl ColumnMissingnessRule {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }
}

impl QualityRule for ColumnMissingnessRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        if input.overview.rows == 0 {
            return Vec::new();
        }
        input
            .columns
            .iter()
            .filter(|c| c.null_pct >= self.threshold_pct)
            .map(|c| {
                QualityWarning::new(
                    WarningKind::HighMissingness,
                    Severity::Warning,
                    format!("Column '{}' is {:.1}% null", c.name, c.null_pct),
                )
                .with_column(&c.name)
                .with_evidence("null_pct", c.null_pct)
                .with_evidence("null_count", c.null_count as f64)
                .with_evidence("threshold_pct", self.threshold_pct)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "ColumnMissingnessRule"
    }

    fn description(&self) -> &str {
        "Checks each column's null percentage"
    }
}

/// Flags columns with a single distinct non-null value.
#[derive(Debug, Clone, Default)]
pub struct ConstantColumnRule;

impl QualityRule for ConstantColumnRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        input
            .columns
            .iter()
            .filter(|c| c.unique_count == Some(1))
            .map(|c| {
                QualityWarning::new(
                    WarningKind::ConstantColumn,
                    Severity::Info,
                    format!("Column '{}' holds a single distinct value", c.name),
                )
                .with_column(&c.name)
                .with_evidence("unique_count", 1.0)
                .with_evidence("non_null", c.non_null as f64)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "ConstantColumnRule"
    }

    fn description(&self) -> &str {
        "Finds columns whose non-null values are all identical"
    }
}

/// Flags datasets with many fully duplicated rows.
#[derive(Debug, Clone)]
pub struct DuplicateRowsRule {
    threshold_pct: f64,
}

impl DuplicateRowsRule {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }
}

impl QualityRule for DuplicateRowsRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        let overview = input.overview;
        let (Some(rows), Some(pct)) = (overview.duplicate_rows, overview.duplicate_row_pct) else {
            return Vec::new();
        };
        if rows == 0 || pct < self.threshold_pct {
            return Vec::new();
        }
        vec![QualityWarning::new(
            WarningKind::DuplicateRows,
            Severity::Warning,
            format!("{rows} rows ({pct:.1}%) are exact duplicates of another row"),
        )
        .with_evidence("duplicate_rows", rows as f64)
        .with_evidence("duplicate_row_pct", pct)
        .with_evidence("threshold_pct", self.threshold_pct)]
    }

    fn name(&self) -> &str {
        "DuplicateRowsRule"
    }

    fn description(&self) -> &str {
        "Checks the share of rows that repeat exactly"
    }
}

/// Collects the correlation skip for wide tables.
#[derive(Debug, Clone, Default)]
pub struct WideCorrelationRule;

impl QualityRule for WideCorrelationRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        match input.correlation {
            Some(CorrelationProfile::Skipped {
                reason: SkipReason::TooManyColumns,
                numeric_columns,
                limit,
                detail,
            }) => vec![QualityWarning::new(
                WarningKind::WideCorrelationSkipped,
                Severity::Info,
                format!("Correlation skipped: {detail}"),
            )
            .with_evidence("numeric_columns", *numeric_columns as f64)
            .with_evidence("max_corr_cols", *limit as f64)],
            _ => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "WideCorrelationRule"
    }

    fn description(&self) -> &str {
        "Reports correlation skipped for too many numeric columns"
    }
}

/// Flags key candidates whose values repeat.
#[derive(Debug, Clone, Default)]
pub struct KeyDuplicatesRule;

impl QualityRule for KeyDuplicatesRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        input
            .columns
            .iter()
            .filter_map(|c| c.key_candidate.as_ref().map(|k| (c, k)))
            .filter(|(_, k)| k.repeated_keys_pct > 0.0)
            .map(|(c, k)| {
                let severity = if k.repeat_severity == RepeatSeverity::High {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                QualityWarning::new(
                    WarningKind::SuspectedKeyWithDuplicates,
                    severity,
                    format!(
                        "Column '{}' looks like a key but {:.2}% of its rows share a value",
                        c.name, k.repeated_keys_pct
                    ),
                )
                .with_column(&c.name)
                .with_evidence("repeated_keys_pct", k.repeated_keys_pct)
                .with_evidence("repeated_keys", k.repeated_keys as f64)
                .with_evidence("duplicate_count", k.duplicate_count as f64)
                .with_evidence("max_rows_per_key", k.max_rows_per_key as f64)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "KeyDuplicatesRule"
    }

    fn description(&self) -> &str {
        "Checks identifier-like columns for repeated values"
    }
}

/// Flags categorical columns with too many distinct values.
#[derive(Debug, Clone)]
pub struct HighCardinalityRule {
    max_unique: usize,
}

impl HighCardinalityRule {
    pub fn new(max_unique: usize) -> Self {
        Self { max_unique }
    }
}

impl QualityRule for HighCardinalityRule {
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        input
            .columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical)
            .filter_map(|c| c.unique_count.map(|u| (c, u)))
            .filter(|(_, unique)| *unique > self.max_unique)
            .map(|(c, unique)| {
                QualityWarning::new(
                    WarningKind::HighCardinalityCategorical,
                    Severity::Info,
                    format!(
                        "Categorical column '{}' has {unique} distinct values",
                        c.name
                    ),
                )
                .with_column(&c.name)
                .with_evidence("unique_count", unique as f64)
                .with_evidence("threshold", self.max_unique as f64)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "HighCardinalityRule"
    }

    fn description(&self) -> &str {
        "Finds categorical columns with a large number of distinct values"
    }
}

/// Ordered collection of quality rules.
pub struct WarningEngine {
    rules: Vec<Box<dyn QualityRule>>,
}

impl WarningEngine {
    /// Engine without rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Engine with the built-in rules in their fixed order.
    pub fn from_thresholds(thresholds: &WarningThresholds) -> Self {
        Self::new()
            .add_rule(Box::new(EmptyDatasetRule))
            .add_rule(Box::new(DatasetMissingnessRule::new(
                thresholds.dataset_missing_pct,
            )))
            .add_rule(Box::new(ColumnMissingnessRule::new(
                thresholds.column_missing_pct,
            )))
            .add_rule(Box::new(ConstantColumnRule))
            .add_rule(Box::new(DuplicateRowsRule::new(
                thresholds.duplicate_row_pct,
            )))
            .add_rule(Box::new(WideCorrelationRule))
            .add_rule(Box::new(KeyDuplicatesRule))
            .add_rule(Box::new(HighCardinalityRule::new(
                thresholds.high_cardinality_unique,
            )))
    }

    /// Appends a rule; it runs after all rules added before it.
    pub fn add_rule(mut self, rule: Box<dyn QualityRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule in order and concatenates their warnings.
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Vec<QualityWarning> {
        let mut warnings = Vec::new();
        for rule in &self.rules {
            let found = rule.evaluate(input);
            if !found.is_empty() {
                debug!(rule = rule.name(), count = found.len(), "Rule produced warnings");
            }
            warnings.extend(found);
        }
        warnings
    }
}

impl Default for WarningEngine {
    fn default() -> Self {
        Self::from_thresholds(&WarningThresholds::default())
    }
}

impl fmt::Debug for WarningEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
