#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::storage::{SqliteStore, TempStorage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Temporary database name that keeps storage in memory.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Main configuration loaded from lap.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LapConfig {
    /// Extract input configuration
    #[serde(default)]
    pub input: InputConfig,

    /// Bundled sample data configuration
    #[serde(default)]
    pub samples: SamplesConfig,

    /// Temporary storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Pipeline descriptor configuration
    #[serde(default)]
    pub pipelines: PipelinesConfig,
}

/// Extract input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Directory holding the category extracts (course.csv, grade.csv, ...)
    #[serde(default = "default_input_directory")]
    pub directory: PathBuf,

    /// Load the bundled sample extracts instead of `directory`
    #[serde(default)]
    pub use_sample_data: bool,
}

/// Sample data configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplesConfig {
    /// Directory holding the sample extracts
    #[serde(default = "default_samples_directory")]
    pub directory: PathBuf,
}

/// Temporary storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// SQLite database file, or `:memory:`
    #[serde(default = "default_temp_database")]
    pub temp_database: String,
}

/// Pipeline descriptor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelinesConfig {
    /// Directory scanned for pipeline descriptor files
    #[serde(default = "default_pipelines_directory")]
    pub directory: PathBuf,
}

// Default functions
fn default_input_directory() -> PathBuf {
    PathBuf::from("input")
}

/// The sample extracts shipped with this crate.
pub fn default_samples_directory() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .join("extracts")
}

fn default_temp_database() -> String {
    IN_MEMORY_DATABASE.to_string()
}

fn default_pipelines_directory() -> PathBuf {
    PathBuf::from("pipelines")
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            directory: default_input_directory(),
            use_sample_data: false,
        }
    }
}

impl Default for SamplesConfig {
    fn default() -> Self {
        SamplesConfig {
            directory: default_samples_directory(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            temp_database: default_temp_database(),
        }
    }
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        PipelinesConfig {
            directory: default_pipelines_directory(),
        }
    }
}

impl LapConfig {
    /// Resolve relative directories against `workspace_root`.
    pub fn resolve_paths(mut self, workspace_root: &Path) -> Self {
        let anchor = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                workspace_root.join(path)
            }
        };
        self.input.directory = anchor(self.input.directory);
        self.samples.directory = anchor(self.samples.directory);
        self.pipelines.directory = anchor(self.pipelines.directory);
        if self.storage.temp_database != IN_MEMORY_DATABASE {
            self.storage.temp_database = anchor(PathBuf::from(&self.storage.temp_database))
                .to_string_lossy()
                .into_owned();
        }
        self
    }

    /// Open the configured temporary storage.
    pub fn open_store(&self) -> Result<Arc<dyn TempStorage>, AppError> {
        let store = if self.storage.temp_database == IN_MEMORY_DATABASE {
            SqliteStore::open_in_memory()?
        } else {
            SqliteStore::open(Path::new(&self.storage.temp_database))?
        };
        Ok(Arc::new(store))
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
