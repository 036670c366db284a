//! Logging configuration for profiling runs.
//!
//! The engine emits `tracing` events; this module decides how chatty the outer
//! layers are and offers an opt-in subscriber setup for binaries and tests.

use tracing::Level;

/// Verbosity knobs for the runner and loaders.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for term-describe components
    pub base_level: Level,
    /// Whether to log each profiling stage of a dataset
    pub log_stage_details: bool,
    /// Whether to log discovery and loading of sources
    pub log_source_operations: bool,
    /// Maximum length for logged field values such as failure reasons
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_stage_details: false,
            log_source_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs every stage and source operation.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_stage_details: true,
            log_source_operations: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only, short fields.
    pub fn quiet() -> Self {
        Self {
            base_level: Level::WARN,
            log_stage_details: false,
            log_source_operations: false,
            max_field_length: 128,
        }
    }
}

/// Debug event emitted only when stage details are enabled.
#[macro_export]
macro_rules! log_stage {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_stage_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Info event emitted only when source operations are logged.
#[macro_export]
macro_rules! log_source_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_source_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a value to `max_length` characters.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        None => value.to_string(),
        Some((end, _)) => format!("{}...(truncated)", &value[..end]),
    }
}

/// Subscriber installation for applications embedding the crate.
pub mod setup {
    use tracing::Level;

    use crate::error::{DescribeError, Result};

    /// Configuration for the global `tracing` subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything else
        pub level: Level,
        /// Log level for term-describe
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON lines at info level, suitable for batch jobs.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Human-readable output with per-stage debug events.
        pub fn development() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for everything else.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for term-describe.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},term_describe={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global subscriber. `RUST_LOG` wins over the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_describe::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| {
                DescribeError::invalid_config(format!("failed to install subscriber: {e}"))
            })
    }
}
