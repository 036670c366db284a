//! Key and identifier candidate detection.
//!
//! Selection uses exact uniqueness counts; the repeat statistics scan the full
//! column so key validity never depends on sampling.

use std::collections::HashMap;

use arrow::array::ArrayRef;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzers::errors::AnalyzerResult;
use crate::analyzers::values::{as_utf8, pct};
use crate::config::ProfileConfig;
use crate::profile::{KeyCandidate, KeyReason, RepeatSeverity, RepeatedKey};
use crate::table::DeclaredType;

/// Number of repeated keys listed on a candidate.
const TOP_REPEATED: usize = 10;

static ID_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(
        r"(?i)(^|[^a-z0-9])(id|key|code)($|[^a-z0-9])|_id|uuid|guid|doi|orcid|issn|isbn",
    )
    .expect("valid identifier name regex")
});

/// True when a column name looks like an identifier.
pub fn is_id_like_name(name: &str) -> bool {
    ID_NAME.is_match(name)
}

/// Column facts needed to decide key eligibility.
#[derive(Debug, Clone, Copy)]
pub struct KeyInput<'a> {
    pub index: usize,
    pub name: &'a str,
    pub declared: DeclaredType,
    pub non_null: usize,
    pub unique_ratio: Option<f64>,
}

/// Why this column qualifies as a key, if it does.
fn eligibility(input: &KeyInput<'_>, config: &ProfileConfig) -> Option<KeyReason> {
    if !matches!(
        input.declared,
        DeclaredType::Integer | DeclaredType::String | DeclaredType::Unknown
    ) {
        return None;
    }
    if input.non_null < config.key_min_non_null {
        return None;
    }

    let by_ratio = input
        .unique_ratio
        .is_some_and(|r| r >= config.key_unique_ratio);
    let by_name = is_id_like_name(input.name);
    match (by_ratio, by_name) {
        (true, true) => Some(KeyReason::UniqueRatioAndName),
        (true, false) => Some(KeyReason::UniqueRatio),
        (false, true) => Some(KeyReason::NameHint),
        (false, false) => None,
    }
}

/// Picks at most `max_key_candidates` columns, unique ratio desc then column order.
pub fn select_candidates(
    inputs: &[KeyInput<'_>],
    config: &ProfileConfig,
) -> Vec<(usize, KeyReason)> {
    let mut eligible: Vec<(&KeyInput<'_>, KeyReason)> = inputs
        .iter()
        .filter_map(|input| eligibility(input, config).map(|reason| (input, reason)))
        .collect();

    eligible.sort_by(|(a, _), (b, _)| {
        let ra = a.unique_ratio.unwrap_or(0.0);
        let rb = b.unique_ratio.unwrap_or(0.0);
        rb.total_cmp(&ra).then_with(|| a.index.cmp(&b.index))
    });

    eligible
        .into_iter()
        .take(config.max_key_candidates)
        .map(|(input, reason)| (input.index, reason))
        .collect()
}

/// Repeat statistics of a key column over all of its rows.
pub fn key_stats(
    array: &ArrayRef,
    reason: KeyReason,
    config: &ProfileConfig,
) -> AnalyzerResult<KeyCandidate> {
    let values = as_utf8(array)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut non_null = 0;
    for value in values.iter().flatten() {
        non_null += 1;
        *counts.entry(value).or_insert(0) += 1;
    }

    let unique_keys = counts.len();
    let mut repeated: Vec<(&str, usize)> = counts
        .iter()
        .filter(|&(_, &n)| n > 1)
        .map(|(&k, &n)| (k, n))
        .collect();
    let rows_in_repeated_keys: usize = repeated.iter().map(|(_, n)| n).sum();
    let repeated_keys_pct = pct(rows_in_repeated_keys, non_null);

    repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_repeated = repeated
        .iter()
        .take(TOP_REPEATED)
        .map(|(key, rows)| RepeatedKey {
            key: (*key).to_string(),
            rows: *rows,
        })
        .collect();

    let repeat_severity = if rows_in_repeated_keys == 0 {
        RepeatSeverity::None
    } else if repeated_keys_pct >= config.key_repeat_high_pct {
        RepeatSeverity::High
    } else {
        RepeatSeverity::Low
    };

    Ok(KeyCandidate {
        reason,
        unique_ratio: if non_null == 0 {
            0.0
        } else {
            unique_keys as f64 / non_null as f64
        },
        unique_keys,
        duplicate_count: non_null - unique_keys,
        repeated_keys: repeated.len(),
        rows_in_repeated_keys,
        repeated_keys_pct,
        avg_rows_per_key: if unique_keys == 0 {
            0.0
        } else {
            non_null as f64 / unique_keys as f64
        },
        max_rows_per_key: counts.values().copied().max().unwrap_or(0),
        repeat_severity,
        top_repeated,
    })
}
