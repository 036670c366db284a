//! Shared value extraction and small numeric helpers.

use std::collections::HashMap;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;

use super::errors::{AnalyzerError, AnalyzerResult};
use crate::profile::TopValue;

/// Casts any numeric array to `Float64`, keeping nulls.
pub fn as_float64(array: &ArrayRef) -> AnalyzerResult<Float64Array> {
    let casted = cast(array, &DataType::Float64)?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| AnalyzerError::invalid_data("cast to Float64 produced another array type"))
}

/// Casts any array to `Utf8`, keeping nulls.
pub fn as_utf8(array: &ArrayRef) -> AnalyzerResult<StringArray> {
    let casted = cast(array, &DataType::Utf8)?;
    casted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| AnalyzerError::invalid_data("cast to Utf8 produced another array type"))
}

/// Non-null finite values of a numeric array in row order.
///
/// NaN and infinities are dropped.
pub fn finite_values(array: &ArrayRef) -> AnalyzerResult<Vec<f64>> {
    let values = as_float64(array)?;
    Ok(values.iter().flatten().filter(|v| v.is_finite()).collect())
}

/// Non-null values of an array rendered as strings, in row order.
pub fn string_values(array: &ArrayRef) -> AnalyzerResult<Vec<String>> {
    let values = as_utf8(array)?;
    Ok(values.iter().flatten().map(str::to_string).collect())
}

/// Nearest-rank quantile over sorted values: `sorted[round(q * (n - 1))]`.
pub fn nearest_rank<T: Copy>(sorted: &[T], q: f64) -> Option<T> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted.get(idx.min(sorted.len() - 1)).copied()
}

/// Sorts floats in place using IEEE total ordering.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation with an `n - 1` denominator.
pub fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// `part / whole * 100`, or 0 for an empty whole.
pub fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Length of a string in characters.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// The `k` most frequent entries, count desc then value lexical.
///
/// `pct` is relative to `denominator`.
pub fn top_values(counts: HashMap<String, usize>, k: usize, denominator: usize) -> Vec<TopValue> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
        .into_iter()
        .take(k)
        .map(|(value, count)| TopValue {
            value,
            count,
            pct: pct(count, denominator),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray};
    use std::sync::Arc;

    #[test]
    fn test_nearest_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(nearest_rank(&sorted, 0.0), Some(1.0));
        assert_eq!(nearest_rank(&sorted, 0.5), Some(3.0));
        assert_eq!(nearest_rank(&sorted, 1.0), Some(5.0));
        // 0.25 * 4 = 1.0
        assert_eq!(nearest_rank(&sorted, 0.25), Some(2.0));
        assert_eq!(nearest_rank::<f64>(&[], 0.5), None);
    }

    #[test]
    fn test_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values).unwrap();
        assert_eq!(m, 5.0);
        let std = sample_std(&values, m).unwrap();
        assert!((std - 2.138_089_935).abs() < 1e-6);
        assert_eq!(sample_std(&[1.0], 1.0), None);
    }

    #[test]
    fn test_finite_values_skip_nulls() {
        let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(1), None, Some(3)]));
        assert_eq!(finite_values(&array).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_finite_values_drop_nan_and_infinities() {
        let array: ArrayRef = Arc::new(Float64Array::from(vec![
            Some(1.0),
            Some(f64::INFINITY),
            Some(f64::NAN),
            None,
            Some(f64::NEG_INFINITY),
            Some(2.5),
        ]));
        assert_eq!(finite_values(&array).unwrap(), vec![1.0, 2.5]);
    }

    #[test]
    fn test_string_values_cast() {
        let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(7), None]));
        assert_eq!(string_values(&array).unwrap(), vec!["7".to_string()]);

        let array: ArrayRef = Arc::new(StringArray::from(vec![Some("ä"), Some("b")]));
        assert_eq!(string_values(&array).unwrap().len(), 2);
        assert_eq!(char_len("äb"), 2);
    }

    #[test]
    fn test_top_values_tie_break() {
        let counts: HashMap<String, usize> = [("b", 2), ("a", 2), ("c", 5), ("d", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let top = top_values(counts, 3, 10);
        let order: Vec<_> = top.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(top[0].pct, 50.0);
    }

    #[test]
    fn test_pct_of_empty_whole() {
        assert_eq!(pct(3, 0), 0.0);
        assert_eq!(pct(1, 4), 25.0);
    }
}
