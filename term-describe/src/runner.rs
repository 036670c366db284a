//! Bounded-concurrency profiling of many datasets.
//!
//! Each dataset is profiled on a blocking worker thread. At most
//! `max_concurrency` datasets are in flight; they are admitted in input order
//! and the report keeps that order regardless of completion order.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use term_describe::assembler::ProfileAssembler;
//! use term_describe::config::ProfileConfig;
//! use term_describe::runner::ProfileRunner;
//! use term_describe::sources::CsvLoader;
//!
//! # async fn example() -> term_describe::error::Result<()> {
//! let assembler = ProfileAssembler::new(ProfileConfig::default())?;
//! let runner = ProfileRunner::new(assembler, Arc::new(CsvLoader::new()))
//!     .on_progress(|done| println!("{:.0}% done", done * 100.0));
//!
//! let report = runner.run(&["data/"]).await?;
//! let summary = report.summary(runner.config());
//! println!("{} datasets profiled", summary.totals.profiled);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregate::MasterSummary;
use crate::assembler::ProfileAssembler;
use crate::config::ProfileConfig;
use crate::error::{DescribeError, Result};
use crate::identity::DatasetIdentity;
use crate::logging::{truncate_field, LogConfig};
use crate::profile::DatasetProfile;
use crate::sources::{discover_sources, TableLoader};
use crate::table::Table;
use crate::{log_source_op, log_stage};

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Stops a run from admitting further datasets.
///
/// Datasets already in flight finish normally. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of a run: profiles in input order plus the number of datasets never started.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub profiles: Vec<DatasetProfile>,
    /// Datasets not admitted because the run was cancelled.
    pub skipped: usize,
}

impl RunReport {
    /// Number of datasets that failed to load or profile.
    pub fn failed_count(&self) -> usize {
        self.profiles.iter().filter(|p| p.is_failed()).count()
    }

    /// Builds the cross-dataset summary over the profiles in this report.
    pub fn summary(&self, config: &ProfileConfig) -> MasterSummary {
        MasterSummary::build(&self.profiles, config)
    }
}

/// Schedules datasets onto blocking workers and collects their profiles.
pub struct ProfileRunner {
    assembler: Arc<ProfileAssembler>,
    loader: Arc<dyn TableLoader>,
    log_config: LogConfig,
    cancellation: CancellationHandle,
    on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for ProfileRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileRunner")
            .field("loader", &self.loader.description())
            .field("max_concurrency", &self.assembler.config().max_concurrency)
            .field("log_config", &self.log_config)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl ProfileRunner {
    /// Creates a runner around a validated assembler and a source loader.
    pub fn new(assembler: ProfileAssembler, loader: Arc<dyn TableLoader>) -> Self {
        Self {
            assembler: Arc::new(assembler),
            loader,
            log_config: LogConfig::default(),
            cancellation: CancellationHandle::new(),
            on_progress: None,
        }
    }

    /// Sets the logging verbosity of the run.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Sets a progress callback that will be called after each dataset.
    ///
    /// The callback receives a float between 0.0 and 1.0 indicating progress.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Handle that cancels this runner's current and future runs.
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// The configuration profiles are built with.
    pub fn config(&self) -> &ProfileConfig {
        self.assembler.config()
    }

    /// Discovers CSV sources under `inputs` and profiles each of them.
    pub async fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<RunReport> {
        let sources = discover_sources(inputs)?;
        log_source_op!(self.log_config, count = sources.len(), "Profiling sources");
        Ok(self.profile_paths(&sources).await)
    }

    /// Loads and profiles each path. Load failures become failed profiles.
    #[instrument(skip(self, paths), fields(datasets = paths.len()))]
    pub async fn profile_paths(&self, paths: &[PathBuf]) -> RunReport {
        let total = paths.len();
        let done = Arc::new(AtomicUsize::new(0));

        let results: Vec<Option<DatasetProfile>> = stream::iter(paths.iter().cloned())
            .map(|path| {
                let done = done.clone();
                async move {
                    if self.cancellation.is_cancelled() {
                        return None;
                    }
                    let profile = self.load_and_profile(path).await;
                    self.report_progress(&done, total);
                    Some(profile)
                }
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        self.finish(results)
    }

    /// Profiles tables that are already in memory.
    #[instrument(skip(self, tables), fields(datasets = tables.len()))]
    pub async fn profile_tables(&self, tables: Vec<Table>) -> RunReport {
        let total = tables.len();
        let done = Arc::new(AtomicUsize::new(0));

        let results: Vec<Option<DatasetProfile>> = stream::iter(tables)
            .map(|table| {
                let done = done.clone();
                async move {
                    if self.cancellation.is_cancelled() {
                        return None;
                    }
                    let profile = self.profile_on_worker(table).await;
                    self.report_progress(&done, total);
                    Some(profile)
                }
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        self.finish(results)
    }

    async fn load_and_profile(&self, path: PathBuf) -> DatasetProfile {
        log_source_op!(self.log_config, path = %path.display(), "Loading source");
        match self.loader.load(&path).await {
            Ok(table) => self.profile_on_worker(table).await,
            Err(e) => {
                let reason = e.to_string();
                warn!(
                    path = %path.display(),
                    error = %truncate_field(&reason, self.log_config.max_field_length),
                    "Failed to load source"
                );
                let identity = DatasetIdentity::new(path.canonicalize().unwrap_or(path), None);
                DatasetProfile::failed(identity, reason)
            }
        }
    }

    async fn profile_on_worker(&self, table: Table) -> DatasetProfile {
        let identity = table.identity().clone();
        log_stage!(
            self.log_config,
            dataset = %identity.id,
            rows = table.row_count(),
            "Dataset admitted"
        );

        let assembler = Arc::clone(&self.assembler);
        match tokio::task::spawn_blocking(move || assembler.profile(&table)).await {
            Ok(profile) => profile,
            Err(e) => {
                let reason = DescribeError::from(e).to_string();
                warn!(
                    dataset = %identity.id,
                    error = %truncate_field(&reason, self.log_config.max_field_length),
                    "Profiling worker failed"
                );
                DatasetProfile::failed(identity, reason)
            }
        }
    }

    fn concurrency(&self) -> usize {
        self.assembler.config().max_concurrency.max(1)
    }

    fn report_progress(&self, done: &AtomicUsize, total: usize) {
        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.on_progress {
            callback(finished as f64 / total.max(1) as f64);
        }
    }

    fn finish(&self, results: Vec<Option<DatasetProfile>>) -> RunReport {
        let skipped = results.iter().filter(|r| r.is_none()).count();
        let profiles: Vec<DatasetProfile> = results.into_iter().flatten().collect();
        let report = RunReport { profiles, skipped };

        info!(
            profiled = report.profiles.len(),
            failed = report.failed_count(),
            skipped = report.skipped,
            "Run finished"
        );
        report
    }
}
