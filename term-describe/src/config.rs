//! Run configuration for profiling and aggregation.
//!
//! A [`ProfileConfig`] is built once per run, validated before any dataset is
//! touched, and then passed by reference into every component. Nothing in the
//! crate reads configuration from global state.
//!
//! # Example
//!
//! ```rust
//! use term_describe::config::ProfileConfig;
//!
//! let config = ProfileConfig::builder()
//!     .top_k(5)
//!     .sample_cap(50_000)
//!     .max_corr_cols(40)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.top_k, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DescribeError, Result};

/// Thresholds consumed by the quality warning rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningThresholds {
    /// Dataset missing-cell percentage at or above which `HighMissingness` fires.
    pub dataset_missing_pct: f64,
    /// Column null percentage at or above which a column-level `HighMissingness` fires.
    pub column_missing_pct: f64,
    /// Duplicate-row percentage at or above which `DuplicateRows` fires.
    pub duplicate_row_pct: f64,
    /// Non-null unique count above which a categorical column is high-cardinality.
    pub high_cardinality_unique: usize,
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            dataset_missing_pct: 50.0,
            column_missing_pct: 80.0,
            duplicate_row_pct: 10.0,
            high_cardinality_unique: 100,
        }
    }
}

/// Configuration for a profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Number of most frequent values kept per categorical column.
    pub top_k: usize,
    /// Maximum number of numeric columns for which correlation is computed.
    pub max_corr_cols: usize,
    /// Row count above which distribution-sensitive metrics use the head sample.
    pub sample_cap: usize,
    /// Number of rows rendered into the profile preview.
    pub preview_rows: usize,
    /// Maximum non-null unique ratio for a string column to be categorical.
    pub categorical_max_unique_ratio: f64,
    /// Longest value (in characters) a categorical or list-like column may hold.
    pub long_text_max_len: usize,
    /// Minimum fraction of sampled values that must parse for a string column to be temporal.
    pub temporal_parse_ratio: f64,
    /// Minimum fraction of sampled values that must split on a delimiter to be list-like.
    pub listlike_min_ratio: f64,
    /// Non-null unique ratio at or above which a column is a key candidate.
    pub key_unique_ratio: f64,
    /// Minimum non-null values before a column is considered as a key.
    pub key_min_non_null: usize,
    /// Maximum number of key candidates examined per dataset.
    pub max_key_candidates: usize,
    /// Repeated-key percentage at or above which key repeats are classified as high.
    pub key_repeat_high_pct: f64,
    /// Maximum number of missingness hotspots kept in the master summary.
    pub hotspot_limit: usize,
    /// Maximum number of datasets profiled concurrently.
    pub max_concurrency: usize,
    /// Thresholds for the quality warning rules.
    pub warnings: WarningThresholds,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            max_corr_cols: 80,
            sample_cap: 200_000,
            preview_rows: 20,
            categorical_max_unique_ratio: 0.5,
            long_text_max_len: 500,
            temporal_parse_ratio: 0.9,
            listlike_min_ratio: 0.2,
            key_unique_ratio: 0.95,
            key_min_non_null: 10,
            max_key_candidates: 5,
            key_repeat_high_pct: 5.0,
            hotspot_limit: 50,
            max_concurrency: num_cpus::get().max(1),
            warnings: WarningThresholds::default(),
        }
    }
}

impl ProfileConfig {
    /// Creates a builder starting from the default configuration.
    pub fn builder() -> ProfileConfigBuilder {
        ProfileConfigBuilder {
            config: ProfileConfig::default(),
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ProfileConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every knob and returns the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(DescribeError::invalid_config("top_k must be at least 1"));
        }
        if self.sample_cap == 0 {
            return Err(DescribeError::invalid_config(
                "sample_cap must be at least 1",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(DescribeError::invalid_config(
                "max_concurrency must be at least 1",
            ));
        }

        let ratios = [
            (
                "categorical_max_unique_ratio",
                self.categorical_max_unique_ratio,
            ),
            ("temporal_parse_ratio", self.temporal_parse_ratio),
            ("listlike_min_ratio", self.listlike_min_ratio),
            ("key_unique_ratio", self.key_unique_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(DescribeError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let percentages = [
            ("key_repeat_high_pct", self.key_repeat_high_pct),
            (
                "warnings.dataset_missing_pct",
                self.warnings.dataset_missing_pct,
            ),
            (
                "warnings.column_missing_pct",
                self.warnings.column_missing_pct,
            ),
            ("warnings.duplicate_row_pct", self.warnings.duplicate_row_pct),
        ];
        for (name, value) in percentages {
            if !value.is_finite() || value < 0.0 {
                return Err(DescribeError::invalid_config(format!(
                    "{name} must be a non-negative percentage, got {value}"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`ProfileConfig`].
#[derive(Debug, Clone)]
pub struct ProfileConfigBuilder {
    config: ProfileConfig,
}

impl ProfileConfigBuilder {
    /// Set the number of top categorical values.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the numeric column limit for correlation.
    pub fn max_corr_cols(mut self, max: usize) -> Self {
        self.config.max_corr_cols = max;
        self
    }

    /// Set the sample cap in rows.
    pub fn sample_cap(mut self, rows: usize) -> Self {
        self.config.sample_cap = rows;
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.config.preview_rows = rows;
        self
    }

    /// Set the categorical unique-ratio ceiling.
    pub fn categorical_max_unique_ratio(mut self, ratio: f64) -> Self {
        self.config.categorical_max_unique_ratio = ratio;
        self
    }

    /// Set the temporal parse ratio.
    pub fn temporal_parse_ratio(mut self, ratio: f64) -> Self {
        self.config.temporal_parse_ratio = ratio;
        self
    }

    /// Set the list-like hit ratio.
    pub fn listlike_min_ratio(mut self, ratio: f64) -> Self {
        self.config.listlike_min_ratio = ratio;
        self
    }

    /// Set the key-candidate unique ratio.
    pub fn key_unique_ratio(mut self, ratio: f64) -> Self {
        self.config.key_unique_ratio = ratio;
        self
    }

    /// Set the minimum non-null values for key candidates.
    pub fn key_min_non_null(mut self, min: usize) -> Self {
        self.config.key_min_non_null = min;
        self
    }

    /// Set the hotspot cap for the master summary.
    pub fn hotspot_limit(mut self, limit: usize) -> Self {
        self.config.hotspot_limit = limit;
        self
    }

    /// Set the maximum number of concurrently profiled datasets.
    pub fn max_concurrency(mut self, workers: usize) -> Self {
        self.config.max_concurrency = workers;
        self
    }

    /// Replace the warning thresholds.
    pub fn warnings(mut self, thresholds: WarningThresholds) -> Self {
        self.config.warnings = thresholds;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ProfileConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
