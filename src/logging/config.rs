use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::Directive;

const DEFAULT_LEVEL: &str = "info";

/// Resolved logging configuration after reading lap.toml and env overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
    pub default_level: String,
    pub enable_file: bool,
    pub console_output: ConsoleOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_level: DEFAULT_LEVEL.to_string(),
            enable_file: true,
            console_output: ConsoleOutput::default(),
        }
    }
}

impl LoggingConfig {
    /// Load configuration with deterministic precedence: defaults, `[logging]` in lap.toml,
    /// then `LAP_LOG_LEVEL` / `LAP_LOG_DIR`.
    pub fn load(workspace_root: Option<&Path>) -> Result<Self> {
        let mut config = LoggingConfig::default();
        if let Some(workspace) = workspace_root {
            if let Some(section) = Self::read_section(&workspace.join("lap.toml"))? {
                config.apply(section);
            }
        }
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn read_section(path: &Path) -> Result<Option<LoggingSection>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed: WorkspaceToml = toml::from_str(&content)
            .with_context(|| format!("failed to parse logging section of {}", path.display()))?;
        Ok(parsed.logging)
    }

    fn apply(&mut self, section: LoggingSection) {
        if let Some(log_dir) = section.log_dir {
            self.log_dir = Some(log_dir);
        }
        if let Some(default_level) = section.default_level {
            self.default_level = default_level;
        }
        if let Some(enable_file) = section.enable_file {
            self.enable_file = enable_file;
        }
        if let Some(console_output) = section.console_output {
            self.console_output = console_output;
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("LAP_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.default_level = level;
            }
        }
        if let Ok(dir) = env::var("LAP_LOG_DIR") {
            if !dir.trim().is_empty() {
                self.log_dir = Some(PathBuf::from(dir));
            }
        }
    }

    fn validate(&self) -> Result<()> {
        for directive in self.default_level.split(',') {
            Directive::from_str(directive.trim()).map_err(|_| {
                anyhow!(
                    "logging.default_level '{}' is not a valid tracing directive",
                    self.default_level
                )
            })?;
        }
        Ok(())
    }
}

/// Only the `[logging]` table of lap.toml is read here.
#[derive(Debug, Deserialize)]
struct WorkspaceToml {
    logging: Option<LoggingSection>,
}

#[derive(Debug, Deserialize)]
struct LoggingSection {
    log_dir: Option<PathBuf>,
    default_level: Option<String>,
    enable_file: Option<bool>,
    console_output: Option<ConsoleOutput>,
}
