#![allow(clippy::result_large_err)]

use super::category::EntityCategory;
use super::layout::{parse_value, CategoryLayout, FieldSpec};
use super::source::{ConfiguredSource, SampleSource, SourceResolver};
use super::{InputHandler, LoadReport};
use crate::core::config::LapConfig;
use crate::core::error::AppError;
use crate::core::storage::{FieldValue, Record, TempStorage};
use crate::core::types::ErrorCategory;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads one category's CSV extract into temporary storage.
///
/// Parsing and writing are shared by every source; `R` only decides which file is read.
pub struct CsvInputHandler<R: SourceResolver> {
    category: EntityCategory,
    resolver: R,
    store: Arc<dyn TempStorage>,
}

impl CsvInputHandler<ConfiguredSource> {
    /// Handler reading from the configured input directory.
    pub fn standard(
        category: EntityCategory,
        config: &LapConfig,
        store: Arc<dyn TempStorage>,
    ) -> Self {
        Self::with_resolver(category, ConfiguredSource::from_config(config), store)
    }
}

impl CsvInputHandler<SampleSource> {
    /// Handler reading from the sample data directory.
    pub fn sample(category: EntityCategory, config: &LapConfig, store: Arc<dyn TempStorage>) -> Self {
        Self::with_resolver(category, SampleSource::from_config(config), store)
    }
}

impl<R: SourceResolver> CsvInputHandler<R> {
    pub fn with_resolver(category: EntityCategory, resolver: R, store: Arc<dyn TempStorage>) -> Self {
        CsvInputHandler {
            category,
            resolver,
            store,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Parse `path` against the category layout. Nothing is written to storage.
    pub fn read_records(&self, path: &Path) -> Result<Vec<Record>, AppError> {
        if !path.exists() {
            return Err(self
                .source_error(path, format!("{} extract not found", self.category))
                .with_code("INPUT-010"));
        }
        if !path.is_file() {
            return Err(self
                .source_error(path, format!("{} extract is not a regular file", self.category))
                .with_code("INPUT-011"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                self.source_error(path, format!("cannot open {} extract: {}", self.category, e))
                    .with_code("INPUT-011")
            })?;

        let layout = CategoryLayout::for_category(self.category);
        let headers = reader
            .headers()
            .map_err(|e| self.malformed(path, "INPUT-020", format!("unreadable header: {}", e)))?
            .clone();
        let columns = self.map_headers(path, layout, &headers)?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = row.map_err(|e| {
                self.malformed(path, "INPUT-021", format!("row {}: {}", line, e))
                    .with_context("row", line.to_string())
            })?;

            let mut record = Record::with_capacity(layout.fields.len());
            for (position, spec) in columns.iter().enumerate() {
                let Some(spec) = spec else { continue };
                let raw = row.get(position).unwrap_or("");
                let value = if raw.is_empty() {
                    if spec.mandatory {
                        return Err(self.row_error(path, line, spec, "value is required".into()));
                    }
                    FieldValue::Null
                } else {
                    parse_value(spec.kind, raw)
                        .map_err(|reason| self.row_error(path, line, spec, reason))?
                };
                record.insert(spec.name.to_string(), value);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Match header cells to layout fields; unknown columns map to `None`.
    fn map_headers(
        &self,
        path: &Path,
        layout: &'static CategoryLayout,
        headers: &csv::StringRecord,
    ) -> Result<Vec<Option<&'static FieldSpec>>, AppError> {
        let mut columns: Vec<Option<&'static FieldSpec>> = Vec::with_capacity(headers.len());
        for header in headers.iter() {
            let header = header.trim_start_matches('\u{feff}').trim();
            let spec = layout.field(header);
            if let Some(spec) = spec {
                if columns.iter().flatten().any(|seen| seen.name == spec.name) {
                    return Err(self
                        .malformed(path, "INPUT-020", format!("column {} appears twice", spec.name))
                        .with_context("column", spec.name));
                }
            }
            columns.push(spec);
        }

        for spec in layout.fields.iter().filter(|spec| spec.mandatory) {
            if !columns.iter().flatten().any(|seen| seen.name == spec.name) {
                return Err(self
                    .malformed(
                        path,
                        "INPUT-020",
                        format!("missing mandatory column {}", spec.name),
                    )
                    .with_context("column", spec.name));
            }
        }
        Ok(columns)
    }

    fn source_error(&self, path: &Path, message: String) -> AppError {
        AppError::new(ErrorCategory::SourceError, message)
            .with_context("category", self.category.as_str())
            .with_context("path", path.display().to_string())
    }

    fn malformed(&self, path: &Path, code: &str, message: String) -> AppError {
        AppError::new(ErrorCategory::MalformedRecord, message)
            .with_code(code)
            .with_context("category", self.category.as_str())
            .with_context("path", path.display().to_string())
    }

    fn row_error(&self, path: &Path, line: usize, spec: &FieldSpec, reason: String) -> AppError {
        self.malformed(
            path,
            "INPUT-021",
            format!("row {} column {}: {}", line, spec.name, reason),
        )
        .with_context("row", line.to_string())
        .with_context("column", spec.name)
    }
}

impl<R: SourceResolver> InputHandler for CsvInputHandler<R> {
    fn category(&self) -> EntityCategory {
        self.category
    }

    fn get_file(&self) -> Result<PathBuf, AppError> {
        let path = self.resolver.resolve(self.category)?;
        tracing::debug!(
            category = %self.category,
            source = %self.resolver.describe(),
            path = %path.display(),
            "resolved extract"
        );
        Ok(path)
    }

    fn load(&self) -> Result<LoadReport, AppError> {
        self.load_extract().map_err(|err| {
            tracing::warn!(category = %self.category, error = %err, "rejected extract");
            err
        })
    }
}

impl<R: SourceResolver> CsvInputHandler<R> {
    /// Resolve, parse and replace the category table; a rerun leaves one copy of the rows.
    fn load_extract(&self) -> Result<LoadReport, AppError> {
        let path = self.get_file()?;
        let records = self.read_records(&path)?;

        let layout = CategoryLayout::for_category(self.category);
        let table = self.category.table();
        let rows = self
            .store
            .replace_records(table, &layout.columns(), &records)?;

        tracing::info!(
            category = %self.category,
            table,
            rows,
            path = %path.display(),
            "loaded extract"
        );
        Ok(LoadReport {
            category: self.category,
            source: path,
            table: table.to_string(),
            rows,
        })
    }
}
