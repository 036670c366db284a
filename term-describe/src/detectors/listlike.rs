//! Delimited-list detection for string columns.

use std::collections::HashMap;

use crate::analyzers::values::{char_len, mean, nearest_rank, pct, top_values};
use crate::profile::ListLike;

/// Candidate delimiters in priority order.
pub const DELIMITERS: [char; 3] = [';', '|', ','];

/// Non-empty trimmed segments of `value` split on `delimiter`.
fn segments(value: &str, delimiter: char) -> impl Iterator<Item = &str> {
    value.split(delimiter).map(str::trim).filter(|s| !s.is_empty())
}

/// Detects whether sampled non-null values encode delimited lists.
///
/// Each delimiter is scored by the fraction of values that split into two or
/// more non-empty segments. The best score at or above `min_ratio` wins, ties
/// going to the earlier delimiter. Columns holding any value longer than
/// `max_len` characters are treated as prose and never match.
pub fn detect(values: &[String], min_ratio: f64, max_len: usize, top_k: usize) -> Option<ListLike> {
    if values.is_empty() || values.iter().any(|v| char_len(v) > max_len) {
        return None;
    }

    let mut best: Option<(char, usize)> = None;
    for delimiter in DELIMITERS {
        let hits = values
            .iter()
            .filter(|v| segments(v, delimiter).nth(1).is_some())
            .count();
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if best_hits >= hits => {}
            _ => best = Some((delimiter, hits)),
        }
    }

    let (delimiter, hits) = best?;
    let ratio = hits as f64 / values.len() as f64;
    if ratio < min_ratio {
        return None;
    }

    let mut item_counts = Vec::with_capacity(values.len());
    let mut items: HashMap<String, usize> = HashMap::new();
    for value in values {
        let mut n = 0;
        for segment in segments(value, delimiter) {
            n += 1;
            *items.entry(segment.to_string()).or_insert(0) += 1;
        }
        item_counts.push(n);
    }
    let total_items: usize = item_counts.iter().sum();
    item_counts.sort_unstable();
    let as_f64: Vec<f64> = item_counts.iter().map(|&n| n as f64).collect();

    Some(ListLike {
        delimiter,
        hit_pct: pct(hits, values.len()),
        avg_items: mean(&as_f64).unwrap_or(0.0),
        p50_items: nearest_rank(&item_counts, 0.5).unwrap_or(0),
        p90_items: nearest_rank(&item_counts, 0.9).unwrap_or(0),
        max_items: item_counts.last().copied().unwrap_or(0),
        top_items: top_values(items, top_k, total_items),
    })
}
