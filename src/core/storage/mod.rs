//! Temporary storage client used by input handlers.
//!
//! Handlers write whole batches; a batch either lands completely or not at all.

#![allow(clippy::result_large_err)]

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// A single typed value in temporary storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Flag(bool),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Decimal(value) => write!(f, "{}", value),
            FieldValue::Flag(true) => f.write_str("Y"),
            FieldValue::Flag(false) => f.write_str("N"),
        }
    }
}

/// One row, column name to value, in column order.
pub type Record = IndexMap<String, FieldValue>;

/// Declared type of a temporary storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    Text,
    Integer,
    Decimal,
    Flag,
}

impl ColumnType {
    /// SQL type name used when a backend creates the column.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Decimal => "REAL",
            ColumnType::Flag => "BOOLEAN",
        }
    }

    pub fn from_sql_type(declared: &str) -> Option<Self> {
        [
            ColumnType::Text,
            ColumnType::Integer,
            ColumnType::Decimal,
            ColumnType::Flag,
        ]
        .into_iter()
        .find(|column_type| column_type.sql_type().eq_ignore_ascii_case(declared.trim()))
    }

    /// Null fits every column; anything else must carry this exact type.
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (_, FieldValue::Null)
                | (ColumnType::Text, FieldValue::Text(_))
                | (ColumnType::Integer, FieldValue::Integer(_))
                | (ColumnType::Decimal, FieldValue::Decimal(_))
                | (ColumnType::Flag, FieldValue::Flag(_))
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A named, typed column of a temporary storage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    pub name: &'a str,
    pub column_type: ColumnType,
}

impl<'a> Column<'a> {
    pub const fn new(name: &'a str, column_type: ColumnType) -> Self {
        Column { name, column_type }
    }

    pub const fn text(name: &'a str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub const fn integer(name: &'a str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub const fn decimal(name: &'a str) -> Self {
        Self::new(name, ColumnType::Decimal)
    }

    pub const fn flag(name: &'a str) -> Self {
        Self::new(name, ColumnType::Flag)
    }
}

/// Client for the intermediate record store.
///
/// A table's columns are fixed by the first write; later writes must declare the same
/// names and types in the same order.
pub trait TempStorage: Send + Sync {
    /// Append `records` to `table`. Every record may only use names from `columns`;
    /// columns a record omits are stored as null. Either all records are written or none.
    fn insert_records(
        &self,
        table: &str,
        columns: &[Column<'_>],
        records: &[Record],
    ) -> Result<usize, AppError>;

    /// Replace the contents of `table` with `records` as one write. On failure the
    /// previous rows are kept.
    fn replace_records(
        &self,
        table: &str,
        columns: &[Column<'_>],
        records: &[Record],
    ) -> Result<usize, AppError>;

    /// All rows of `table` in insertion order; empty when the table does not exist.
    fn fetch(&self, table: &str) -> Result<Vec<Record>, AppError>;

    /// Number of rows in `table`; zero when the table does not exist.
    fn count(&self, table: &str) -> Result<usize, AppError>;

    /// Remove every row from `table`.
    fn clear(&self, table: &str) -> Result<(), AppError>;
}

/// Failures raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("record {index} uses column '{column}' which is not declared for table {table}")]
    UndeclaredColumn {
        table: String,
        index: usize,
        column: String,
    },
    #[error("record {index} has a {found} value in {column}, declared {expected} in table {table}")]
    TypeMismatch {
        table: String,
        index: usize,
        column: String,
        expected: ColumnType,
        found: &'static str,
    },
    #[error("table {table} already exists with columns [{existing}]")]
    SchemaMismatch { table: String, existing: String },
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidIdentifier(_) => "STORAGE-001",
            StoreError::UndeclaredColumn { .. } => "STORAGE-002",
            StoreError::SchemaMismatch { .. } => "STORAGE-003",
            StoreError::Poisoned => "STORAGE-004",
            StoreError::Sqlite(_) => "STORAGE-005",
            StoreError::TypeMismatch { .. } => "STORAGE-006",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = err.code();
        let message = err.to_string();
        AppError::with_source(ErrorCategory::StorageError, message, Box::new(err)).with_code(code)
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Table and column names are interpolated into SQL, so only plain identifiers pass.
pub(crate) fn check_identifier(name: &str) -> Result<(), StoreError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn value_type_name(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Null => "null",
        FieldValue::Text(_) => "text",
        FieldValue::Integer(_) => "integer",
        FieldValue::Decimal(_) => "decimal",
        FieldValue::Flag(_) => "flag",
    }
}

/// Render a column list the way a schema mismatch reports it.
pub(crate) fn describe_columns<'a>(columns: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    columns
        .into_iter()
        .map(|(name, column_type)| format!("{} {}", name, column_type))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a batch and lay every record out in `columns` order.
pub(crate) fn normalize_batch(
    table: &str,
    columns: &[Column<'_>],
    records: &[Record],
) -> Result<Vec<Vec<FieldValue>>, StoreError> {
    check_identifier(table)?;
    for column in columns {
        check_identifier(column.name)?;
    }
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            if let Some(column) = record
                .keys()
                .find(|key| !columns.iter().any(|column| column.name == key.as_str()))
            {
                return Err(StoreError::UndeclaredColumn {
                    table: table.to_string(),
                    index,
                    column: column.clone(),
                });
            }
            columns
                .iter()
                .map(|column| {
                    let value = record.get(column.name).cloned().unwrap_or(FieldValue::Null);
                    if column.column_type.accepts(&value) {
                        Ok(value)
                    } else {
                        Err(StoreError::TypeMismatch {
                            table: table.to_string(),
                            index,
                            column: column.name.to_string(),
                            expected: column.column_type,
                            found: value_type_name(&value),
                        })
                    }
                })
                .collect()
        })
        .collect()
}
