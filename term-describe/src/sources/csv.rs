//! CSV loading through DataFusion.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, SessionConfig, SessionContext};
use tracing::{debug, instrument};

use super::TableLoader;
use crate::error::{DescribeError, Result};
use crate::identity::DatasetIdentity;
use crate::table::Table;

/// Options for reading CSV files.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first line holds column names.
    pub has_header: bool,
    /// Field delimiter.
    pub delimiter: u8,
    /// Records read to infer column types.
    pub schema_infer_max_records: usize,
    /// Byte-range partitions DataFusion may scan in parallel. Rows are
    /// reassembled in file order regardless.
    pub scan_partitions: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            schema_infer_max_records: 10_000,
            scan_partitions: 1,
        }
    }
}

/// Makes column names unique and non-blank.
///
/// Blank names become `col_<n>` (1-based position); repeats get the first
/// `__<k>` suffix that no other header uses, literal or generated.
pub fn unique_headers<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let bases: Vec<(String, bool)> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                (format!("col_{}", idx + 1), false)
            } else {
                (trimmed.to_string(), true)
            }
        })
        .collect();
    let literal: HashSet<&str> = bases
        .iter()
        .filter(|(_, is_literal)| *is_literal)
        .map(|(base, _)| base.as_str())
        .collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<&str, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(bases.len());
    for (base, is_literal) in &bases {
        let free = !used.contains(base) && (*is_literal || !literal.contains(base.as_str()));
        let name = if free {
            base.clone()
        } else {
            let k = suffixes.entry(base.as_str()).or_insert(0);
            loop {
                *k += 1;
                let candidate = format!("{base}__{k}");
                if !used.contains(&candidate) && !literal.contains(candidate.as_str()) {
                    break candidate;
                }
            }
        };
        used.insert(name.clone());
        unique.push(name);
    }
    unique
}

/// Loads CSV files into tables.
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    options: CsvOptions,
}

impl CsvLoader {
    /// Loader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with custom options.
    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Infers the schema with arrow's CSV reader and de-duplicates its column names.
    fn infer_schema(&self, path: &Path) -> Result<Schema> {
        let file = File::open(path).map_err(|e| load_error(path, e))?;
        let format = Format::default()
            .with_header(self.options.has_header)
            .with_delimiter(self.options.delimiter);
        let (schema, _) = format
            .infer_schema(
                BufReader::new(file),
                Some(self.options.schema_infer_max_records),
            )
            .map_err(|e| load_error(path, e))?;

        let names = unique_headers(schema.fields().iter().map(|f| f.name().as_str()));
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .zip(names)
            .map(|(field, name)| Field::new(name, field.data_type().clone(), true))
            .collect();
        Ok(Schema::new(fields))
    }
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> DescribeError {
    DescribeError::load(path.display().to_string(), err.to_string())
}

#[async_trait]
impl TableLoader for CsvLoader {
    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn load(&self, path: &Path) -> Result<Table> {
        let path = path.canonicalize().map_err(|e| load_error(path, e))?;
        let identity = DatasetIdentity::new(&path, None);
        let schema = Arc::new(self.infer_schema(&path)?);

        if schema.fields().is_empty() {
            debug!("CSV has no columns");
            return Table::new(identity, RecordBatch::new_empty(schema));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| load_error(&path, "path is not valid UTF-8"))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let config =
            SessionConfig::new().with_target_partitions(self.options.scan_partitions.max(1));
        let ctx = SessionContext::new_with_config(config);
        let options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .schema(schema.as_ref())
            .file_extension(&extension);
        let df = ctx
            .read_csv(path_str, options)
            .await
            .map_err(|e| load_error(&path, e))?;
        // Partitions cover consecutive byte ranges, so concatenating them in
        // partition order restores file order.
        let partitions = df
            .collect_partitioned()
            .await
            .map_err(|e| load_error(&path, e))?;
        let batches: Vec<RecordBatch> = partitions.into_iter().flatten().collect();

        let batch = match batches.first() {
            Some(first) => {
                concat_batches(&first.schema(), &batches).map_err(|e| load_error(&path, e))?
            }
            None => RecordBatch::new_empty(schema),
        };
        debug!(
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "Loaded CSV"
        );
        Table::new(identity, batch)
    }

    fn description(&self) -> String {
        format!(
            "CSV loader (header: {}, delimiter: '{}', partitions: {})",
            self.options.has_header,
            char::from(self.options.delimiter),
            self.options.scan_partitions
        )
    }
}
