#![allow(clippy::result_large_err)]

use super::{ConfigValidator, LapConfig};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

/// File name of the workspace configuration.
pub const CONFIG_FILE_NAME: &str = "lap.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/lap.toml)
    /// Environment variables override config file values; the result is validated and
    /// relative paths are then anchored at the workspace root.
    pub fn load_from_workspace(workspace_path: &Path) -> Result<LapConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut config);

        ConfigValidator::validate(&config)?;
        let config = config.resolve_paths(workspace_path);
        tracing::debug!(
            workspace = %workspace_path.display(),
            input = %config.input.directory.display(),
            use_sample_data = config.input.use_sample_data,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<LapConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-001")
        })?;

        let config: LapConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-002")
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut LapConfig) {
        if let Ok(directory) = env::var("LAP_INPUT_DIR") {
            config.input.directory = PathBuf::from(directory);
        }

        if let Ok(use_sample_str) = env::var("LAP_USE_SAMPLE_DATA") {
            if let Ok(use_sample_data) = use_sample_str.parse::<bool>() {
                config.input.use_sample_data = use_sample_data;
            }
        }

        if let Ok(directory) = env::var("LAP_SAMPLES_DIR") {
            config.samples.directory = PathBuf::from(directory);
        }

        if let Ok(database) = env::var("LAP_TEMP_DATABASE") {
            config.storage.temp_database = database;
        }

        if let Ok(directory) = env::var("LAP_PIPELINES_DIR") {
            config.pipelines.directory = PathBuf::from(directory);
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "LAP_INPUT_DIR - Override the extract input directory (default: input)",
            "LAP_USE_SAMPLE_DATA - Load bundled sample extracts instead of the input directory (true/false)",
            "LAP_SAMPLES_DIR - Override the sample extract directory",
            "LAP_TEMP_DATABASE - Override the temporary storage database (default: :memory:)",
            "LAP_PIPELINES_DIR - Override the pipeline descriptor directory (default: pipelines)",
            "LAP_LOG_LEVEL - Override the default tracing level (default: info)",
            "LAP_LOG_DIR - Override the log directory",
        ]
    }
}
