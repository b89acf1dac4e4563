use super::{
    check_identifier, describe_columns, normalize_batch, Column, ColumnType, FieldValue, Record,
    StoreError, TempStorage,
};
use crate::core::error::AppError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<(String, ColumnType)>,
    rows: Vec<Vec<FieldValue>>,
}

impl MemoryTable {
    fn matches(&self, columns: &[Column<'_>]) -> bool {
        self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|((name, column_type), column)| {
                    name == column.name && *column_type == column.column_type
                })
    }
}

/// Process-local temporary storage, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, HashMap<String, MemoryTable>>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    fn write(
        &self,
        table: &str,
        columns: &[Column<'_>],
        records: &[Record],
        replace: bool,
    ) -> Result<usize, AppError> {
        let rows = normalize_batch(table, columns, records)?;
        let mut tables = self.tables()?;
        let entry = tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable {
                columns: columns
                    .iter()
                    .map(|column| (column.name.to_string(), column.column_type))
                    .collect(),
                rows: Vec::new(),
            });
        if !entry.matches(columns) {
            return Err(StoreError::SchemaMismatch {
                table: table.to_string(),
                existing: describe_columns(
                    entry
                        .columns
                        .iter()
                        .map(|(name, column_type)| (name.as_str(), column_type.sql_type())),
                ),
            }
            .into());
        }
        if replace {
            entry.rows.clear();
        }
        let inserted = rows.len();
        entry.rows.extend(rows);
        Ok(inserted)
    }
}

impl TempStorage for MemoryStore {
    fn insert_records(
        &self,
        table: &str,
        columns: &[Column<'_>],
        records: &[Record],
    ) -> Result<usize, AppError> {
        self.write(table, columns, records, false)
    }

    fn replace_records(
        &self,
        table: &str,
        columns: &[Column<'_>],
        records: &[Record],
    ) -> Result<usize, AppError> {
        self.write(table, columns, records, true)
    }

    fn fetch(&self, table: &str) -> Result<Vec<Record>, AppError> {
        check_identifier(table)?;
        let tables = self.tables()?;
        Ok(tables
            .get(table)
            .map(|stored| {
                stored
                    .rows
                    .iter()
                    .map(|row| {
                        stored
                            .columns
                            .iter()
                            .map(|(name, _)| name.clone())
                            .zip(row.iter().cloned())
                            .collect()
                    })
                    .collect::<Vec<Record>>()
            })
            .unwrap_or_default())
    }

    fn count(&self, table: &str) -> Result<usize, AppError> {
        check_identifier(table)?;
        let tables = self.tables()?;
        Ok(tables.get(table).map(|stored| stored.rows.len()).unwrap_or(0))
    }

    fn clear(&self, table: &str) -> Result<(), AppError> {
        check_identifier(table)?;
        let mut tables = self.tables()?;
        if let Some(stored) = tables.get_mut(table) {
            stored.rows.clear();
        }
        Ok(())
    }
}
