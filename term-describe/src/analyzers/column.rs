//! Single-column statistics.
//!
//! Null and uniqueness counts scan the full column. Everything that describes
//! the distribution of values runs over the sampled head of the column, and
//! each of those statistics fails on its own: a failure drops that field and is
//! reported as a [`SoftFailure`], never as an error of the column.

use std::collections::{HashMap, HashSet};

use arrow::array::{Array, ArrayRef};
use arrow::row::{RowConverter, SortField};
use tracing::debug;

use super::errors::AnalyzerResult;
use super::values::{
    char_len, finite_values, mean, nearest_rank, pct, sample_std, sort_floats, string_values,
    top_values,
};
use super::SoftFailure;
use crate::config::ProfileConfig;
use crate::detectors::{listlike, temporal};
use crate::profile::{CategoricalStats, ColumnKind, ColumnProfile, NumericStats, TextStats};
use crate::sampling::SamplingPlan;
use crate::table::{ColumnRef, DeclaredType};

/// A column profile plus the statistics that could not be computed.
#[derive(Debug, Clone)]
pub struct ColumnAnalysis {
    pub profile: ColumnProfile,
    pub failures: Vec<SoftFailure>,
}

/// Exact distinct counts over the full column: `(non_null_unique, unique_with_null)`.
pub fn unique_counts(array: &ArrayRef) -> AnalyzerResult<(usize, usize)> {
    let converter = RowConverter::new(vec![SortField::new(array.data_type().clone())])?;
    let rows = converter.convert_columns(&[array.clone()])?;
    let nulls = array.logical_nulls();

    let mut seen = HashSet::new();
    for (idx, row) in rows.iter().enumerate() {
        if nulls.as_ref().is_some_and(|n| n.is_null(idx)) {
            continue;
        }
        seen.insert(row);
    }

    let unique = seen.len();
    let with_null = unique + usize::from(array.logical_null_count() > 0);
    Ok((unique, with_null))
}

/// Numeric summary of non-null values. `None` without values.
pub fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    let mean = mean(values)?;
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);

    let std = sample_std(values, mean);
    let p50 = nearest_rank(&sorted, 0.5)?;
    let zeros = values.iter().filter(|v| **v == 0.0).count();
    let approx_skew = match std {
        Some(s) if s > 0.0 => Some((mean - p50) / s),
        _ => None,
    };

    Some(NumericStats {
        count: values.len(),
        min: *sorted.first()?,
        max: *sorted.last()?,
        mean,
        std,
        p25: nearest_rank(&sorted, 0.25)?,
        p50,
        p75: nearest_rank(&sorted, 0.75)?,
        zero_pct: pct(zeros, values.len()),
        approx_skew,
        is_integer: values.iter().all(|v| v.fract() == 0.0),
    })
}

/// Top-K frequencies of non-null values. Ties are broken lexically.
pub fn categorical_stats(values: &[String], top_k: usize) -> CategoricalStats {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    let distinct = counts.len();
    CategoricalStats {
        values_counted: values.len(),
        distinct,
        top: top_values(counts, top_k, values.len()),
    }
}

/// Length and blank-value statistics. `None` without values.
pub fn text_stats(values: &[String]) -> Option<TextStats> {
    if values.is_empty() {
        return None;
    }
    let mut lengths: Vec<usize> = values.iter().map(|v| char_len(v)).collect();
    lengths.sort_unstable();
    let total: usize = lengths.iter().sum();

    Some(TextStats {
        non_null: values.len(),
        empty: values.iter().filter(|v| v.is_empty()).count(),
        whitespace_only: values
            .iter()
            .filter(|v| !v.is_empty() && v.trim().is_empty())
            .count(),
        avg_len: total as f64 / values.len() as f64,
        min_len: *lengths.first()?,
        p50_len: nearest_rank(&lengths, 0.5)?,
        p90_len: nearest_rank(&lengths, 0.9)?,
        max_len: *lengths.last()?,
    })
}

/// True when a string column with these sampled values is categorical.
fn is_categorical(values: &[String], config: &ProfileConfig) -> bool {
    if values.is_empty() || values.iter().any(|v| char_len(v) > config.long_text_max_len) {
        return false;
    }
    let distinct: HashSet<&str> = values.iter().map(String::as_str).collect();
    distinct.len() as f64 / values.len() as f64 <= config.categorical_max_unique_ratio
}

/// Profiles one column.
pub fn analyze_column(
    column: ColumnRef<'_>,
    plan: &SamplingPlan,
    config: &ProfileConfig,
) -> ColumnAnalysis {
    let array = column.array;
    let rows = array.len();
    let null_count = array.logical_null_count();
    let non_null = rows - null_count;

    let mut failures = Vec::new();
    let mut fail = |statistic: &'static str, err: &dyn std::fmt::Display| {
        failures.push(SoftFailure::column(column.name, statistic, err.to_string()));
    };

    let (unique_count, unique_with_null) = match unique_counts(array) {
        Ok((unique, with_null)) => (Some(unique), Some(with_null)),
        Err(e) => {
            fail("uniqueness", &e);
            (None, None)
        }
    };

    let mut profile = ColumnProfile {
        name: column.name.to_string(),
        dtype: column.declared,
        kind: ColumnKind::Unknown,
        non_null,
        null_count,
        null_pct: pct(null_count, rows),
        unique_count,
        unique_with_null,
        sampled: plan.is_sampled(),
        rows_analyzed: plan.rows_profiled(),
        numeric: None,
        categorical: None,
        text: None,
        temporal: None,
        list_like: None,
        key_candidate: None,
    };

    if non_null == 0 {
        profile.kind = ColumnKind::Empty;
        return ColumnAnalysis { profile, failures };
    }

    let sample = plan.sample_array(array);
    match column.declared {
        DeclaredType::Integer | DeclaredType::Float => {
            profile.kind = ColumnKind::Numeric;
            match finite_values(&sample) {
                Ok(values) => {
                    if column.declared == DeclaredType::Integer {
                        profile.temporal = temporal::detect_year_column(column.name, &values);
                    }
                    profile.numeric = numeric_stats(&values);
                }
                Err(e) => fail("numeric statistics", &e),
            }
        }
        DeclaredType::Boolean => {
            profile.kind = ColumnKind::Categorical;
            match string_values(&sample) {
                Ok(values) => profile.categorical = Some(categorical_stats(&values, config.top_k)),
                Err(e) => fail("categorical statistics", &e),
            }
        }
        DeclaredType::Temporal => {
            profile.kind = ColumnKind::Temporal;
            match temporal::typed_range(&sample) {
                Ok(range) => profile.temporal = range,
                Err(e) => fail("temporal range", &e),
            }
        }
        DeclaredType::String => match string_values(&sample) {
            Ok(values) => classify_strings(&mut profile, &values, config),
            Err(e) => {
                profile.kind = ColumnKind::Text;
                fail("string values", &e);
            }
        },
        DeclaredType::Unknown => {}
    }

    debug!(
        column = column.name,
        kind = ?profile.kind,
        failures = failures.len(),
        "Analyzed column"
    );
    ColumnAnalysis { profile, failures }
}

/// Decides temporal, list-like, categorical or text for a string column.
fn classify_strings(profile: &mut ColumnProfile, values: &[String], config: &ProfileConfig) {
    if let Some(range) = temporal::detect_string_dates(values, config.temporal_parse_ratio) {
        profile.kind = ColumnKind::Temporal;
        profile.temporal = Some(range);
        return;
    }

    let list = listlike::detect(
        values,
        config.listlike_min_ratio,
        config.long_text_max_len,
        config.top_k,
    );
    if list.is_none() && is_categorical(values, config) {
        profile.kind = ColumnKind::Categorical;
        profile.categorical = Some(categorical_stats(values, config.top_k));
        return;
    }

    profile.kind = ColumnKind::Text;
    profile.text = text_stats(values);
    profile.list_like = list;
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        BooleanArray, Date32Array, Float64Array, Int64Array, NullArray, StringArray,
    };
    use std::sync::Arc;

    fn analyze(name: &str, array: ArrayRef) -> ColumnAnalysis {
        analyze_with(name, array, &ProfileConfig::default())
    }

    fn analyze_with(name: &str, array: ArrayRef, config: &ProfileConfig) -> ColumnAnalysis {
        let plan = SamplingPlan::decide(array.len(), config.sample_cap);
        let declared = DeclaredType::from_arrow(array.data_type());
        analyze_column(
            ColumnRef {
                name,
                declared,
                array: &array,
            },
            &plan,
            config,
        )
    }

    #[test]
    fn test_numeric_column() {
        let array: ArrayRef = Arc::new(Float64Array::from(vec![
            Some(1.0),
            Some(2.0),
            None,
            Some(3.0),
            Some(4.0),
            Some(0.0),
        ]));
        let result = analyze("score", array);
        let profile = result.profile;
        assert_eq!(profile.kind, ColumnKind::Numeric);
        assert_eq!(profile.null_count, 1);
        assert_eq!(profile.unique_count, Some(5));
        assert_eq!(profile.unique_with_null, Some(6));

        let stats = profile.numeric.unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.p50, 2.0);
        assert_eq!(stats.zero_pct, 20.0);
        assert_eq!(stats.approx_skew, Some(0.0));
        assert!(stats.is_integer);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_infinite_values_are_ignored() {
        let array: ArrayRef = Arc::new(Float64Array::from(vec![
            Some(1.0),
            Some(f64::INFINITY),
            Some(2.0),
            Some(3.0),
            Some(f64::NEG_INFINITY),
        ]));
        let stats = analyze("x", array).profile.numeric.unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std, Some(1.0));
        assert_eq!(stats.approx_skew, Some(0.0));
    }

    #[test]
    fn test_single_value_has_no_std() {
        let stats = numeric_stats(&[7.0]).unwrap();
        assert_eq!(stats.std, None);
        assert_eq!(stats.approx_skew, None);
        assert_eq!(stats.p25, 7.0);
        assert!(numeric_stats(&[]).is_none());
    }

    #[test]
    fn test_constant_column_has_no_skew() {
        let stats = numeric_stats(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(stats.std, Some(0.0));
        assert_eq!(stats.approx_skew, None);
    }

    #[test]
    fn test_categorical_column() {
        let values: Vec<&str> = (0..100).map(|i| if i % 2 == 0 { "A" } else { "B" }).collect();
        let array: ArrayRef = Arc::new(StringArray::from(values));
        let profile = analyze("category", array).profile;
        assert_eq!(profile.kind, ColumnKind::Categorical);
        let stats = profile.categorical.unwrap();
        assert_eq!(stats.distinct, 2);
        assert_eq!(stats.top[0].value, "A");
        assert_eq!(stats.top[0].count, 50);
        assert_eq!(stats.top[0].pct, 50.0);
        assert!(profile.text.is_none());
    }

    #[test]
    fn test_high_ratio_strings_are_text() {
        let values: Vec<String> = (0..20).map(|i| format!("note number {i}")).collect();
        let array: ArrayRef = Arc::new(StringArray::from(values));
        let profile = analyze("comment", array).profile;
        assert_eq!(profile.kind, ColumnKind::Text);
        let text = profile.text.unwrap();
        assert_eq!(text.non_null, 20);
        assert_eq!(text.min_len, 13);
        assert_eq!(text.max_len, 14);
    }

    #[test]
    fn test_text_stats_blank_values() {
        let values: Vec<String> = ["", "  ", "abc", "hello"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let stats = text_stats(&values).unwrap();
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.whitespace_only, 1);
        assert_eq!(stats.min_len, 0);
        assert_eq!(stats.max_len, 5);
        assert_eq!(stats.avg_len, 2.5);
    }

    #[test]
    fn test_list_like_column_is_text() {
        let values: Vec<String> = (0..10).map(|i| format!("tag{i}; tag{}", i + 1)).collect();
        let array: ArrayRef = Arc::new(StringArray::from(values));
        let profile = analyze("tags", array).profile;
        assert_eq!(profile.kind, ColumnKind::Text);
        assert_eq!(profile.list_like.unwrap().delimiter, ';');
        assert!(profile.categorical.is_none());
    }

    #[test]
    fn test_all_null_column() {
        let array: ArrayRef = Arc::new(StringArray::from(vec![None::<&str>; 5]));
        let profile = analyze("note", array).profile;
        assert_eq!(profile.kind, ColumnKind::Empty);
        assert_eq!(profile.null_pct, 100.0);
        assert_eq!(profile.unique_count, Some(0));
        assert_eq!(profile.unique_with_null, Some(1));
        assert!(profile.text.is_none());
        assert!(profile.categorical.is_none());
    }

    #[test]
    fn test_null_typed_column() {
        let array: ArrayRef = Arc::new(NullArray::new(4));
        let profile = analyze("blank", array).profile;
        assert_eq!(profile.dtype, DeclaredType::Unknown);
        assert_eq!(profile.kind, ColumnKind::Empty);
        assert_eq!(profile.null_count, 4);
    }

    #[test]
    fn test_boolean_is_categorical() {
        let array: ArrayRef = Arc::new(BooleanArray::from(vec![true, false, true]));
        let profile = analyze("flag", array).profile;
        assert_eq!(profile.kind, ColumnKind::Categorical);
        let stats = profile.categorical.unwrap();
        assert_eq!(stats.top[0].value, "true");
        assert_eq!(stats.top[0].count, 2);
    }

    #[test]
    fn test_string_dates_become_temporal() {
        let array: ArrayRef = Arc::new(StringArray::from(vec![
            "2020-01-01",
            "2021-05-05",
            "2022-12-31",
        ]));
        let profile = analyze("published", array).profile;
        assert_eq!(profile.kind, ColumnKind::Temporal);
        let range = profile.temporal.unwrap();
        assert_eq!((range.min_year, range.max_year), (2020, 2022));
    }

    #[test]
    fn test_typed_dates() {
        // 0 = 1970-01-01, 18262 = 2020-01-01
        let array: ArrayRef = Arc::new(Date32Array::from(vec![Some(0), None, Some(18262)]));
        let profile = analyze("day", array).profile;
        assert_eq!(profile.kind, ColumnKind::Temporal);
        let range = profile.temporal.unwrap();
        assert_eq!(range.min_date.as_deref(), Some("1970-01-01"));
        assert_eq!(range.max_date.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_year_column_stays_numeric() {
        let array: ArrayRef = Arc::new(Int64Array::from(vec![1999, 2005, 2010]));
        let profile = analyze("year", array).profile;
        assert_eq!(profile.kind, ColumnKind::Numeric);
        assert!(profile.numeric.is_some());
        assert_eq!(profile.temporal.unwrap().min_year, 1999);
    }

    #[test]
    fn test_sampled_distribution_exact_counts() {
        let config = ProfileConfig::builder().sample_cap(10).build().unwrap();
        let array: ArrayRef = Arc::new(Int64Array::from_iter_values(0..100));
        let profile = analyze_with("n", array, &config).profile;
        assert!(profile.sampled);
        assert_eq!(profile.rows_analyzed, 10);
        assert_eq!(profile.unique_count, Some(100));
        assert_eq!(profile.numeric.unwrap().max, 9.0);
    }
}
