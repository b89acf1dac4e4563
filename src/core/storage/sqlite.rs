use super::{
    check_identifier, describe_columns, normalize_batch, Column, ColumnType, FieldValue, Record,
    StoreError, TempStorage,
};
use crate::core::error::AppError;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite backed temporary storage.
///
/// Tables are created on first write with declared column types; flag columns are
/// declared `BOOLEAN` and read back as flags. Every write runs in its own transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path).map_err(StoreError::from)?;
        tracing::debug!(path = %path.display(), "opened temporary storage database");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        SqliteStore {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn write(
        &self,
        table: &str,
        columns: &[Column<'_>],
        records: &[Record],
        replace: bool,
    ) -> Result<usize, AppError> {
        let rows = normalize_batch(table, columns, records)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(StoreError::from)?;

        let existing = table_columns(&tx, table)?;
        if existing.is_empty() {
            tx.execute_batch(&format!(
                "CREATE TABLE \"{}\" ({})",
                table,
                column_definitions(columns)
            ))
            .map_err(StoreError::from)?;
        } else if !same_layout(&existing, columns) {
            return Err(StoreError::SchemaMismatch {
                table: table.to_string(),
                existing: describe_columns(
                    existing
                        .iter()
                        .map(|(name, declared)| (name.as_str(), declared.as_str())),
                ),
            }
            .into());
        } else if replace {
            tx.execute(&format!("DELETE FROM \"{}\"", table), [])
                .map_err(StoreError::from)?;
        }

        {
            let names: Vec<&str> = columns.iter().map(|column| column.name).collect();
            let placeholders = (1..=columns.len())
                .map(|index| format!("?{}", index))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO \"{}\" ({}) VALUES ({})",
                    table,
                    quoted(&names),
                    placeholders
                ))
                .map_err(StoreError::from)?;
            for row in rows.iter().cloned() {
                stmt.execute(params_from_iter(row.into_iter().map(to_sql)))
                    .map_err(StoreError::from)?;
            }
        }
        // Dropping an uncommitted transaction rolls it back, so early returns above
        // leave the table as it was.
        tx.commit().map_err(StoreError::from)?;
        Ok(rows.len())
    }
}

/// Column names and declared types of `table`, in order; empty when it does not exist.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<(String, String)>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let columns = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn same_layout(existing: &[(String, String)], columns: &[Column<'_>]) -> bool {
    existing.len() == columns.len()
        && existing.iter().zip(columns).all(|((name, declared), column)| {
            name == column.name && ColumnType::from_sql_type(declared) == Some(column.column_type)
        })
}

fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_definitions(columns: &[Column<'_>]) -> String {
    columns
        .iter()
        .map(|column| format!("\"{}\" {}", column.name, column.column_type.sql_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(text) => Value::Text(text),
        FieldValue::Integer(number) => Value::Integer(number),
        FieldValue::Decimal(number) => Value::Real(number),
        FieldValue::Flag(flag) => Value::Integer(i64::from(flag)),
    }
}

fn from_sql(value: ValueRef<'_>, declared: Option<ColumnType>) -> FieldValue {
    match (value, declared) {
        (ValueRef::Null, _) => FieldValue::Null,
        (ValueRef::Integer(number), Some(ColumnType::Flag)) => FieldValue::Flag(number != 0),
        (ValueRef::Integer(number), _) => FieldValue::Integer(number),
        (ValueRef::Real(number), _) => FieldValue::Decimal(number),
        (ValueRef::Text(bytes) | ValueRef::Blob(bytes), _) => {
            FieldValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl TempStorage for SqliteStore {
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
        let conn = self.conn()?;
        let columns = table_columns(&conn, table)?;
        if columns.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        let declared: Vec<Option<ColumnType>> = columns
            .iter()
            .map(|(_, declared)| ColumnType::from_sql_type(declared))
            .collect();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM \"{}\" ORDER BY rowid",
                quoted(&names),
                table
            ))
            .map_err(StoreError::from)?;
        let mut rows = stmt.query([]).map_err(StoreError::from)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::from)? {
            let mut record = Record::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                let value = row.get_ref(index).map_err(StoreError::from)?;
                record.insert(name.to_string(), from_sql(value, declared[index]));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn count(&self, table: &str) -> Result<usize, AppError> {
        check_identifier(table)?;
        let conn = self.conn()?;
        if table_columns(&conn, table)?.is_empty() {
            return Ok(0);
        }
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
                row.get(0)
            })
            .map_err(StoreError::from)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn clear(&self, table: &str) -> Result<(), AppError> {
        check_identifier(table)?;
        let conn = self.conn()?;
        if !table_columns(&conn, table)?.is_empty() {
            conn.execute(&format!("DELETE FROM \"{}\"", table), [])
                .map_err(StoreError::from)?;
        }
        Ok(())
    }
}
