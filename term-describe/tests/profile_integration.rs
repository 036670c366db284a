//! End-to-end tests for building dataset profiles.

mod common;

use arrow::array::{ArrayRef, Date32Array};
use std::sync::Arc;
use term_describe::prelude::*;
use term_describe::profile::{CorrelationProfile, RepeatSeverity, SkipReason, TemporalSource};

use common::*;

#[test]
fn test_scenario_table() {
    let profile = assembler().profile(&scenario_table());
    assert_eq!(profile.status, ProfileStatus::Profiled);

    let overview = profile.overview.as_ref().unwrap();
    assert_eq!(overview.rows, 100);
    assert_eq!(overview.columns, 3);
    assert_eq!(overview.missing_cells, 100);

    let note = profile.column("note").unwrap();
    assert_eq!(note.null_pct, 100.0);
    assert!(note.text.is_none());
    assert!(note.categorical.is_none());

    let category = profile.column("category").unwrap();
    assert_eq!(category.kind, ColumnKind::Categorical);
    let top = &category.categorical.as_ref().unwrap().top[0];
    assert!(["A", "B"].contains(&top.value.as_str()));
    assert_eq!(top.count, 50);

    let key = profile
        .column("id")
        .and_then(|c| c.key_candidate.as_ref())
        .unwrap();
    assert_eq!(key.repeated_keys_pct, 0.0);
    assert_eq!(key.repeat_severity, RepeatSeverity::None);
}

#[test]
fn test_wide_table_skips_correlation_once() {
    let columns: Vec<(String, ArrayRef)> = (0..90)
        .map(|i| {
            let values: Vec<Option<f64>> = (0..12).map(|r| Some((r * (i + 2)) as f64)).collect();
            (format!("metric_{i}"), floats(values))
        })
        .collect();
    let table = Table::from_columns(identity("wide"), columns).unwrap();
    let config = ProfileConfig::builder().max_corr_cols(80).build().unwrap();
    let profile = ProfileAssembler::new(config).unwrap().profile(&table);

    match profile.correlation.as_ref().unwrap() {
        CorrelationProfile::Skipped {
            reason,
            numeric_columns,
            limit,
            detail,
        } => {
            assert_eq!(*reason, SkipReason::TooManyColumns);
            assert_eq!((*numeric_columns, *limit), (90, 80));
            assert!(detail.contains("90 > 80"));
        }
        other => panic!("expected skipped correlation, got {other:?}"),
    }

    let skipped = profile
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::WideCorrelationSkipped)
        .count();
    assert_eq!(skipped, 1);
}

#[test]
fn test_correlation_matrix_is_symmetric() {
    let table = table(
        "pairs",
        vec![
            ("a", ints(1..=20)),
            ("b", floats((1..=20).map(|i| Some((i * i) as f64)).collect())),
            ("c", floats((1..=20).map(|i| Some(100.0 - i as f64)).collect())),
        ],
    );
    let profile = assembler().profile(&table);
    let correlation = profile.correlation.unwrap();

    for x in ["a", "b", "c"] {
        assert_eq!(correlation.coefficient(x, x), Some(1.0));
        for y in ["a", "b", "c"] {
            assert_eq!(correlation.coefficient(x, y), correlation.coefficient(y, x));
        }
    }
    assert!(correlation.coefficient("a", "c").unwrap() < -0.99);
}

#[test]
fn test_profile_is_idempotent() {
    let table = scenario_table();
    let assembler = assembler();
    let first = JsonFormatter::new().format_profile(&assembler.profile(&table)).unwrap();
    let second = JsonFormatter::new().format_profile(&assembler.profile(&table)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_infinite_values_keep_profile_serializable() {
    let table = table(
        "inf",
        vec![
            (
                "x",
                floats(vec![Some(1.0), Some(f64::INFINITY), Some(2.0), Some(3.0)]),
            ),
            (
                "y",
                floats(vec![Some(2.0), Some(5.0), Some(4.0), Some(f64::NEG_INFINITY)]),
            ),
        ],
    );
    let profile = assembler().profile(&table);

    let x = profile.column("x").unwrap().numeric.clone().unwrap();
    assert_eq!(x.mean, 2.0);
    assert_eq!(x.max, 3.0);
    assert_eq!(x.std, Some(1.0));
    let r = profile
        .correlation
        .as_ref()
        .and_then(|c| c.coefficient("x", "y"))
        .unwrap();
    assert!(r.is_finite());

    let json = serde_json::to_string(&profile).unwrap();
    assert!(serde_json::from_str::<DatasetProfile>(&json).is_ok());
}

#[test]
fn test_sampling_is_a_noop_below_cap() {
    let table = scenario_table();
    let exact = ProfileAssembler::new(ProfileConfig::builder().sample_cap(100).build().unwrap())
        .unwrap()
        .profile(&table);
    let default = assembler().profile(&table);

    assert!(!exact.sampling.sampled);
    assert_eq!(
        serde_json::to_string(&exact).unwrap(),
        serde_json::to_string(&default).unwrap()
    );
}

#[test]
fn test_sampled_profile_keeps_exact_counts() {
    let values: Vec<Option<f64>> = (0..1_000)
        .map(|i| if i >= 900 { None } else { Some(i as f64) })
        .collect();
    let table = table("big", vec![("value", floats(values))]);
    let config = ProfileConfig::builder().sample_cap(100).build().unwrap();
    let profile = ProfileAssembler::new(config).unwrap().profile(&table);

    assert!(profile.sampling.sampled);
    assert_eq!(profile.sampling.rows_total, 1_000);
    assert_eq!(profile.sampling.rows_profiled, 100);

    let column = profile.column("value").unwrap();
    assert_eq!(column.null_count, 100);
    assert_eq!(column.unique_count, Some(900));
    assert!(column.sampled);
    // Distribution statistics only see the first 100 rows
    assert_eq!(column.numeric.as_ref().unwrap().max, 99.0);
}

#[test]
fn test_key_with_repeats_raises_error_warning() {
    let ids: Vec<Option<&str>> = (0..40)
        .map(|i| match i {
            3 => Some("K0"),
            7 => Some("K1"),
            _ => None,
        })
        .collect();
    let owned: Vec<String> = (0..40).map(|i| format!("K{i}")).collect();
    let values: Vec<Option<&str>> = ids
        .iter()
        .zip(&owned)
        .map(|(dup, own)| dup.or(Some(own.as_str())))
        .collect();
    let table = table("keys", vec![("customer_id", strings(values))]);
    let profile = assembler().profile(&table);

    let key = profile
        .column("customer_id")
        .and_then(|c| c.key_candidate.as_ref())
        .unwrap();
    assert_eq!(key.repeated_keys, 2);
    assert_eq!(key.rows_in_repeated_keys, 4);
    assert_eq!(key.repeated_keys_pct, 10.0);
    assert_eq!(key.repeat_severity, RepeatSeverity::High);

    let warning = profile
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::SuspectedKeyWithDuplicates)
        .unwrap();
    assert_eq!(warning.severity, Severity::Error);
    assert_eq!(warning.column.as_deref(), Some("customer_id"));
}

#[test]
fn test_list_like_and_temporal_columns() {
    let authors: Vec<String> = (0..30)
        .map(|i| format!("Author {};Author {}", i % 4, i % 6 + 10))
        .collect();
    let published: Vec<String> = (0..30)
        .map(|i| format!("{}-03-{:02}", 1990 + i, i % 28 + 1))
        .collect();
    let table = table(
        "papers",
        vec![
            (
                "authors",
                strings(authors.iter().map(|s| Some(s.as_str())).collect()),
            ),
            (
                "published",
                strings(published.iter().map(|s| Some(s.as_str())).collect()),
            ),
            // 2020-01-01 and 2021-01-01
            (
                "indexed",
                Arc::new(Date32Array::from(vec![18_262; 15].into_iter().chain(vec![18_628; 15]).collect::<Vec<i32>>()))
                    as ArrayRef,
            ),
        ],
    );
    let profile = assembler().profile(&table);

    let authors = profile.column("authors").unwrap();
    assert_eq!(authors.list_like.as_ref().unwrap().delimiter, ';');
    assert_eq!(authors.list_like.as_ref().unwrap().max_items, 2);

    let published = profile.column("published").unwrap();
    assert_eq!(published.kind, ColumnKind::Temporal);
    let range = published.temporal.as_ref().unwrap();
    assert!(matches!(range.source, TemporalSource::Parsed { .. }));
    assert_eq!((range.min_year, range.max_year), (1990, 2019));

    let indexed = profile.column("indexed").unwrap().temporal.as_ref().unwrap();
    assert_eq!(indexed.source, TemporalSource::Typed);
    assert_eq!((indexed.min_year, indexed.max_year), (2020, 2021));

    let coverage = profile.temporal_coverage.unwrap();
    assert_eq!((coverage.min_year, coverage.max_year), (1990, 2021));
}

#[test]
fn test_duplicate_rows_and_missingness() {
    let table = table(
        "dupes",
        vec![
            ("a", ints([1, 1, 2, 3].into_iter())),
            ("b", strings(vec![Some("x"), Some("x"), None, Some("y")])),
        ],
    );
    let profile = assembler().profile(&table);
    let overview = profile.overview.unwrap();
    assert_eq!(overview.duplicate_rows, Some(2));
    assert_eq!(overview.duplicate_row_pct, Some(50.0));
    assert_eq!(overview.missing_cells, 1);
    assert_eq!(overview.missing_cell_pct, 12.5);

    let rows = profile.row_missingness.unwrap();
    assert_eq!(rows.max_null_pct, 50.0);
    assert_eq!(rows.min_null_pct, 0.0);

    assert!(profile
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::DuplicateRows));
}

#[test]
fn test_empty_table_profile() {
    let table = table(
        "empty",
        vec![("a", ints(Vec::new())), ("b", strings(Vec::new()))],
    );
    let profile = assembler().profile(&table);
    assert_eq!(profile.status, ProfileStatus::Empty);
    assert!(profile.correlation.is_none());
    assert!(profile.preview.is_none());
    assert!(profile.columns.iter().all(|c| c.kind == ColumnKind::Empty));
    assert_eq!(profile.warnings[0].kind, WarningKind::EmptyDataset);
}

#[test]
fn test_preview_is_limited() {
    let config = ProfileConfig::builder().preview_rows(5).build().unwrap();
    let profile = ProfileAssembler::new(config)
        .unwrap()
        .profile(&scenario_table());
    let preview = profile.preview.unwrap();
    assert_eq!(preview.columns, vec!["id", "category", "note"]);
    assert_eq!(preview.rows.len(), 5);
    assert_eq!(preview.rows[0][0].as_deref(), Some("1"));
    assert_eq!(preview.rows[0][2], None);
}
