//! Turns a loaded [`Table`] into an immutable [`DatasetProfile`].
//!
//! Stages run in a fixed order: sampling, overview, per-column statistics, key
//! detection, correlation, row missingness, preview and finally quality
//! warnings. A stage that fails drops only its own output; the failure becomes
//! a note on the profile plus a `ProfilingDiagnostic` warning.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use term_describe::assembler::ProfileAssembler;
//! use term_describe::config::ProfileConfig;
//! use term_describe::identity::DatasetIdentity;
//! use term_describe::table::Table;
//!
//! let table = Table::from_columns(
//!     DatasetIdentity::new("/data/people.csv", None),
//!     vec![
//!         ("id", Arc::new(Int64Array::from_iter_values(1..=20)) as ArrayRef),
//!         ("city", Arc::new(StringArray::from(vec!["Berlin"; 20])) as ArrayRef),
//!     ],
//! )
//! .unwrap();
//!
//! let assembler = ProfileAssembler::new(ProfileConfig::default()).unwrap();
//! let profile = assembler.profile(&table);
//! assert_eq!(profile.columns.len(), 2);
//! assert!(profile.column("id").unwrap().key_candidate.is_some());
//! ```

use arrow::array::ArrayRef;
use tracing::{debug, info, instrument, warn};

use crate::analyzers::{self, overview, rows, SoftFailure};
use crate::config::ProfileConfig;
use crate::detectors::{self, temporal, KeyInput};
use crate::error::Result;
use crate::profile::{ColumnProfile, DatasetProfile, ProfileStatus};
use crate::sampling::SamplingPlan;
use crate::table::Table;
use crate::warnings::{QualityWarning, RuleInput, WarningEngine};

/// Builds dataset profiles under one validated configuration.
#[derive(Debug)]
pub struct ProfileAssembler {
    config: ProfileConfig,
    engine: WarningEngine,
}

impl ProfileAssembler {
    /// Validates the configuration and sets up the built-in warning rules.
    pub fn new(config: ProfileConfig) -> Result<Self> {
        config.validate()?;
        let engine = WarningEngine::from_thresholds(&config.warnings);
        Ok(Self { config, engine })
    }

    /// Uses a caller-supplied rule set instead of the built-in one.
    pub fn with_engine(config: ProfileConfig, engine: WarningEngine) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, engine })
    }

    /// The configuration profiles are built with.
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Profiles one table. Never fails; problems surface inside the profile.
    #[instrument(skip(self, table), fields(
        dataset = %table.identity().id,
        rows = table.row_count(),
        columns = table.column_count()
    ))]
    pub fn profile(&self, table: &Table) -> DatasetProfile {
        let config = &self.config;
        let batch = table.batch();
        let plan = SamplingPlan::decide(table.row_count(), config.sample_cap);
        let mut failures: Vec<SoftFailure> = Vec::new();

        if plan.is_sampled() {
            debug!(
                rows_total = plan.rows_total(),
                rows_profiled = plan.rows_profiled(),
                "Sampling distribution statistics"
            );
        }

        let duplicates = match overview::duplicate_rows(batch) {
            Ok(n) => Some(n),
            Err(e) => {
                failures.push(SoftFailure::dataset("duplicate rows", e.to_string()));
                None
            }
        };
        let overview = overview::overview(batch, duplicates);

        let mut columns: Vec<ColumnProfile> = Vec::with_capacity(table.column_count());
        for column in table.columns() {
            let analysis = analyzers::analyze_column(column, &plan, config);
            failures.extend(analysis.failures);
            columns.push(analysis.profile);
        }

        let empty = plan.is_empty() || table.column_count() == 0;
        let mut correlation = None;
        let mut row_missingness = None;
        let mut preview = None;

        if !empty {
            self.detect_keys(table, &mut columns, &mut failures);

            let sample = plan.sample_batch(batch);
            let numeric: Vec<(&str, &ArrayRef)> = table
                .columns()
                .zip(sample.columns())
                .filter(|(c, _)| c.declared.is_numeric())
                .map(|(c, array)| (c.name, array))
                .collect();
            match analyzers::correlate(&numeric, config.max_corr_cols) {
                Ok(profile) => correlation = Some(profile),
                Err(e) => failures.push(SoftFailure::dataset("correlation", e.to_string())),
            }

            row_missingness = rows::row_missingness(batch);

            match overview::preview(&sample, config.preview_rows) {
                Ok(p) => preview = Some(p),
                Err(e) => failures.push(SoftFailure::dataset("preview", e.to_string())),
            }
        }

        let temporal_coverage =
            temporal::coverage(columns.iter().filter_map(|c| c.temporal.as_ref()));

        let mut warnings = self.engine.evaluate(&RuleInput {
            overview: &overview,
            columns: &columns,
            correlation: correlation.as_ref(),
        });
        for failure in &failures {
            warn!(
                column = failure.column.as_deref(),
                statistic = %failure.statistic,
                error = %failure.message,
                "Statistic omitted"
            );
            warnings.push(QualityWarning::diagnostic(failure));
        }
        let notes = failures.iter().map(SoftFailure::note).collect();

        info!(
            warnings = warnings.len(),
            omitted = failures.len(),
            sampled = plan.is_sampled(),
            "Profiled dataset"
        );

        DatasetProfile {
            identity: table.identity().clone(),
            status: if empty {
                ProfileStatus::Empty
            } else {
                ProfileStatus::Profiled
            },
            overview: Some(overview),
            sampling: plan.info(),
            columns,
            correlation,
            row_missingness,
            temporal_coverage,
            preview,
            warnings,
            notes,
        }
    }

    /// Attaches key statistics to the selected candidate columns.
    fn detect_keys(
        &self,
        table: &Table,
        columns: &mut [ColumnProfile],
        failures: &mut Vec<SoftFailure>,
    ) {
        let inputs: Vec<KeyInput<'_>> = columns
            .iter()
            .enumerate()
            .map(|(index, c)| KeyInput {
                index,
                name: &c.name,
                declared: c.dtype,
                non_null: c.non_null,
                unique_ratio: c.unique_ratio(),
            })
            .collect();
        let selected = detectors::select_candidates(&inputs, &self.config);

        let arrays = table.batch().columns();
        for (index, reason) in selected {
            let profile = &mut columns[index];
            match detectors::key_stats(&arrays[index], reason, &self.config) {
                Ok(stats) => profile.key_candidate = Some(stats),
                Err(e) => failures.push(SoftFailure::column(
                    profile.name.clone(),
                    "key statistics",
                    e.to_string(),
                )),
            }
        }
    }
}
