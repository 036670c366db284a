//! In-memory table model consumed by the profiling engine.
//!
//! A [`Table`] is an Arrow [`RecordBatch`] paired with the identity of the
//! dataset it was loaded from. The engine only ever reads from it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::{DescribeError, Result};
use crate::identity::DatasetIdentity;

/// Declared type of a column, derived from its Arrow data type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    /// Signed or unsigned integers.
    Integer,
    /// Floating point and decimal numbers.
    Float,
    /// Boolean values.
    Boolean,
    /// UTF-8 strings.
    String,
    /// Dates and timestamps.
    Temporal,
    /// Anything else, including all-null columns of type `Null`.
    Unknown,
}

impl DeclaredType {
    /// Maps an Arrow data type onto the declared type.
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Self::Integer,
            DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Self::Float,
            DataType::Boolean => Self::Boolean,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Self::String,
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => Self::Temporal,
            _ => Self::Unknown,
        }
    }

    /// Lowercase name used in reports and for lexical tie-breaking.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Temporal => "temporal",
            Self::Unknown => "unknown",
        }
    }

    /// Integer and float columns take part in numeric statistics and correlation.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one column of a table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef<'a> {
    /// Column name, unique within its table.
    pub name: &'a str,
    /// Declared type.
    pub declared: DeclaredType,
    /// Column values over the full table.
    pub array: &'a ArrayRef,
}

/// A loaded dataset: identity plus an immutable record batch.
#[derive(Debug, Clone)]
pub struct Table {
    identity: DatasetIdentity,
    batch: RecordBatch,
}

impl Table {
    /// Wraps a record batch, rejecting duplicate column names.
    pub fn new(identity: DatasetIdentity, batch: RecordBatch) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in batch.schema().fields() {
            if !seen.insert(field.name().clone()) {
                return Err(DescribeError::invalid_table(format!(
                    "duplicate column name '{}' in {}",
                    field.name(),
                    identity.title()
                )));
            }
        }
        Ok(Self { identity, batch })
    }

    /// Builds a table from named arrays of equal length.
    pub fn from_columns<I, S>(identity: DatasetIdentity, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        let batch = RecordBatch::try_from_iter(columns)?;
        Self::new(identity, batch)
    }

    /// Identity of the dataset.
    pub fn identity(&self) -> &DatasetIdentity {
        &self.identity
    }

    /// Underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows `R`.
    pub fn row_count(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns `C`.
    pub fn column_count(&self) -> usize {
        self.batch.num_columns()
    }

    /// Columns in table order.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef<'_>> {
        let schema = self.batch.schema_ref();
        schema
            .fields()
            .iter()
            .zip(self.batch.columns())
            .map(|(field, array)| ColumnRef {
                name: field.name().as_str(),
                declared: DeclaredType::from_arrow(field.data_type()),
                array,
            })
    }

    /// Shared handle to the schema.
    pub fn schema(&self) -> Arc<arrow::datatypes::Schema> {
        self.batch.schema()
    }
}
