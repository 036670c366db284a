//! Pairwise Pearson correlation across numeric columns.
//!
//! The matrix is either computed in full or skipped outright. Wide tables are
//! never partially correlated.

use arrow::array::{ArrayRef, Float64Array};
use tracing::debug;

use super::errors::AnalyzerResult;
use super::values::as_float64;
use crate::profile::{CorrelationProfile, SkipReason};

/// Pearson coefficient over pairwise-complete finite observations.
///
/// Returns `None` below two complete pairs or when either side has no variance.
pub fn pearson(x: &Float64Array, y: &Float64Array) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// True when a column has at least two values and some variance.
fn is_correlatable(values: &Float64Array) -> bool {
    let mut present = values.iter().flatten().filter(|v| v.is_finite());
    let Some(first) = present.next() else {
        return false;
    };
    let mut count = 1;
    let mut varies = false;
    for value in present {
        count += 1;
        varies |= value != first;
    }
    count >= 2 && varies
}

/// Correlates the given numeric columns, already restricted to the sampled rows.
pub fn correlate(
    numeric: &[(&str, &ArrayRef)],
    max_corr_cols: usize,
) -> AnalyzerResult<CorrelationProfile> {
    let n = numeric.len();
    if n > max_corr_cols {
        return Ok(CorrelationProfile::Skipped {
            reason: SkipReason::TooManyColumns,
            numeric_columns: n,
            limit: max_corr_cols,
            detail: format!(
                "{n} numeric columns exceed max_corr_cols ({n} > {max_corr_cols})"
            ),
        });
    }
    if n < 2 {
        return Ok(CorrelationProfile::Skipped {
            reason: SkipReason::NotEnoughColumns,
            numeric_columns: n,
            limit: max_corr_cols,
            detail: format!("{n} numeric column(s); at least 2 are needed"),
        });
    }

    let mut columns = Vec::with_capacity(n);
    let mut excluded = Vec::new();
    let mut arrays = Vec::with_capacity(n);
    for (name, array) in numeric {
        let values = as_float64(array)?;
        if is_correlatable(&values) {
            columns.push(name.to_string());
            arrays.push(values);
        } else {
            excluded.push(name.to_string());
        }
    }

    let k = arrays.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        values[i][i] = Some(1.0);
        for j in (i + 1)..k {
            let r = pearson(&arrays[i], &arrays[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    debug!(
        included = k,
        excluded = excluded.len(),
        "Computed correlation matrix"
    );
    Ok(CorrelationProfile::Matrix {
        columns,
        excluded,
        values,
    })
}
