#![allow(clippy::result_large_err)]

use super::category::EntityCategory;
use crate::core::config::{default_samples_directory, LapConfig};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::path::{Path, PathBuf};

/// Decides where a category's extract is read from.
///
/// This is the only part that differs between standard and sample handlers.
pub trait SourceResolver: Send + Sync {
    /// Resolve the extract location for `category`. The file is not required to exist yet.
    fn resolve(&self, category: EntityCategory) -> Result<PathBuf, AppError>;

    /// Short label for logs and load reports.
    fn describe(&self) -> String;
}

fn join_extract(dir: &Path, category: EntityCategory) -> Result<PathBuf, AppError> {
    if dir.as_os_str().is_empty() {
        return Err(AppError::new(
            ErrorCategory::SourceError,
            format!("no source directory configured for {} extracts", category),
        )
        .with_code("INPUT-012")
        .with_context("category", category.as_str()));
    }
    Ok(dir.join(category.file_name()))
}

/// Reads extracts from the configured input directory.
#[derive(Debug, Clone)]
pub struct ConfiguredSource {
    input_dir: PathBuf,
}

impl ConfiguredSource {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        ConfiguredSource {
            input_dir: input_dir.into(),
        }
    }

    pub fn from_config(config: &LapConfig) -> Self {
        Self::new(config.input.directory.clone())
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }
}

impl SourceResolver for ConfiguredSource {
    fn resolve(&self, category: EntityCategory) -> Result<PathBuf, AppError> {
        join_extract(&self.input_dir, category)
    }

    fn describe(&self) -> String {
        format!("input directory {}", self.input_dir.display())
    }
}

/// Reads extracts from a fixed sample data set.
#[derive(Debug, Clone)]
pub struct SampleSource {
    sample_dir: PathBuf,
}

impl SampleSource {
    /// The sample extracts shipped in `samples/extracts`.
    pub fn bundled() -> Self {
        Self::new(default_samples_directory())
    }

    pub fn new(sample_dir: impl Into<PathBuf>) -> Self {
        SampleSource {
            sample_dir: sample_dir.into(),
        }
    }

    pub fn from_config(config: &LapConfig) -> Self {
        Self::new(config.samples.directory.clone())
    }

    pub fn sample_dir(&self) -> &Path {
        &self.sample_dir
    }
}

impl SourceResolver for SampleSource {
    fn resolve(&self, category: EntityCategory) -> Result<PathBuf, AppError> {
        join_extract(&self.sample_dir, category)
    }

    fn describe(&self) -> String {
        format!("sample data {}", self.sample_dir.display())
    }
}
