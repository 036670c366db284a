//! Integration tests for discovering, loading and profiling CSV sources.

mod common;

use std::sync::Arc;

use tempfile::TempDir;
use term_describe::prelude::*;

use common::*;

fn runner(workers: usize) -> ProfileRunner {
    let config = ProfileConfig::builder()
        .max_concurrency(workers)
        .build()
        .unwrap();
    ProfileRunner::new(
        ProfileAssembler::new(config).unwrap(),
        Arc::new(CsvLoader::new()),
    )
    .with_log_config(LogConfig::quiet())
}

fn sample_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_csv(
        dir.path(),
        "orders.csv",
        "order_id,customer,amount,ordered_on\n\
         1,alice,10.5,2021-01-03\n\
         2,bob,,2021-02-11\n\
         3,alice,7.25,2022-06-30\n\
         4,carol,12.0,2023-12-01\n",
    );
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    write_csv(
        &dir.path().join("nested"),
        "customers.CSV",
        "name,name,city\nalice,A,Berlin\nbob,B,Paris\n",
    );
    write_csv(dir.path(), "readme.txt", "not a table");
    dir
}

#[tokio::test]
async fn test_run_profiles_discovered_sources() {
    let dir = sample_dir();
    let runner = runner(2);
    let report = runner.run(&[dir.path()]).await.unwrap();

    assert_eq!(report.profiles.len(), 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed_count(), 0);

    let orders = report
        .profiles
        .iter()
        .find(|p| p.identity.dataset_name == "orders")
        .unwrap();
    assert_eq!(orders.overview.as_ref().unwrap().rows, 4);
    assert_eq!(orders.column("amount").unwrap().null_count, 1);
    assert_eq!(orders.column("ordered_on").unwrap().kind, ColumnKind::Temporal);

    let customers = report
        .profiles
        .iter()
        .find(|p| p.identity.dataset_name == "customers")
        .unwrap();
    let names: Vec<_> = customers.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["name", "name__1", "city"]);
}

#[tokio::test]
async fn test_report_order_follows_input_order() {
    let dir = sample_dir();
    let mut paths = discover_sources(&[dir.path()]).unwrap();
    paths.reverse();

    let report = runner(4).profile_paths(&paths).await;
    let sources: Vec<_> = report
        .profiles
        .iter()
        .map(|p| p.identity.source_path.clone())
        .collect();
    assert_eq!(sources, paths);
}

#[tokio::test]
async fn test_unreadable_source_becomes_failed_profile() {
    let dir = sample_dir();
    let missing = dir.path().join("gone.csv");
    let mut paths = discover_sources(&[dir.path()]).unwrap();
    paths.push(missing);

    let runner = runner(2);
    let report = runner.profile_paths(&paths).await;
    assert_eq!(report.profiles.len(), 3);
    assert_eq!(report.failed_count(), 1);
    assert!(report.profiles[2].is_failed());

    let summary = report.summary(runner.config());
    assert_eq!(summary.totals.failed, 1);
    assert_eq!(summary.totals.profiled, 2);
    assert!(summary.inventory.iter().any(|e| e.is_failed()));
}

#[tokio::test]
async fn test_cancellation_skips_pending_datasets() {
    let dir = sample_dir();
    let runner = runner(1);
    let handle = runner.cancellation_handle();
    handle.cancel();

    let report = runner.run(&[dir.path()]).await.unwrap();
    assert!(report.profiles.is_empty());
    assert_eq!(report.skipped, 2);
}

#[tokio::test]
async fn test_reruns_are_identical() {
    let dir = sample_dir();
    let runner = runner(3);
    let first = runner.run(&[dir.path()]).await.unwrap();
    let second = runner.run(&[dir.path()]).await.unwrap();

    let render = |report: &RunReport| {
        report
            .profiles
            .iter()
            .map(|p| JsonFormatter::new().format_profile(p).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(render(&first), render(&second));
    assert_eq!(
        JsonFormatter::new()
            .format_summary(&first.summary(runner.config()))
            .unwrap(),
        JsonFormatter::new()
            .format_summary(&second.summary(runner.config()))
            .unwrap()
    );
}
