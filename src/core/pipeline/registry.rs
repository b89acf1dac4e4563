#![allow(clippy::result_large_err)]

use super::schema::PipelineConfig;
use crate::core::config::LapConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DESCRIPTOR_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Builder used to register pipelines before they are shared.
#[derive(Default)]
pub struct PipelineRegistryBuilder {
    pipelines: IndexMap<String, Arc<PipelineConfig>>,
}

impl PipelineRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, config: PipelineConfig) -> Result<&mut Self, AppError> {
        let key = config.pipeline_type().to_string();
        if self.pipelines.contains_key(&key) {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("duplicate pipeline type registered: {}", key),
            )
            .with_code("PIPELINE-030")
            .with_context("pipeline", key));
        }
        tracing::info!(pipeline = %key, name = config.name(), "registered pipeline");
        self.pipelines.insert(key, Arc::new(config));
        Ok(self)
    }

    /// Register every descriptor file in `dir`, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<&mut Self, AppError> {
        let dir_error = |err: std::io::Error| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to read pipelines directory {}: {}", dir.display(), err),
            )
            .with_code("PIPELINE-031")
            .with_context("path", dir.display().to_string())
        };
        let entries = fs::read_dir(dir).map_err(dir_error)?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry.map_err(dir_error)?.path();
            let is_descriptor = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| DESCRIPTOR_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_descriptor {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let config = PipelineConfig::load_from_file(&path)?;
            self.register(config).map_err(|mut err| {
                err.add_context("path", &path.display().to_string());
                err
            })?;
        }
        Ok(self)
    }

    pub fn build(self) -> PipelineRegistry {
        PipelineRegistry {
            inner: Arc::new(self.pipelines),
        }
    }
}

/// Immutable set of pipeline descriptors, keyed by type.
#[derive(Clone, Default)]
pub struct PipelineRegistry {
    inner: Arc<IndexMap<String, Arc<PipelineConfig>>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        PipelineRegistryBuilder::new().build()
    }

    pub fn builder() -> PipelineRegistryBuilder {
        PipelineRegistryBuilder::new()
    }

    /// Registry of every descriptor in the configured pipelines directory.
    pub fn from_config(config: &LapConfig) -> Result<Self, AppError> {
        let mut builder = Self::builder();
        builder.load_dir(&config.pipelines.directory)?;
        Ok(builder.build())
    }

    pub fn get(&self, pipeline_type: &str) -> Option<Arc<PipelineConfig>> {
        self.inner.get(pipeline_type).cloned()
    }

    /// Registered type keys in registration order.
    pub fn types(&self) -> Vec<&str> {
        self.inner.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PipelineConfig>> {
        self.inner.values()
    }
}
