#![allow(clippy::result_large_err)]

use super::LapConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &LapConfig) -> Result<(), AppError> {
        if config.input.directory.as_os_str().is_empty() {
            return Err(Self::invalid("input.directory cannot be empty"));
        }

        // Sample runs read nothing else, so the sample directory only matters then
        if config.input.use_sample_data && config.samples.directory.as_os_str().is_empty() {
            return Err(Self::invalid(
                "samples.directory is required when input.use_sample_data is true",
            ));
        }

        if config.storage.temp_database.trim().is_empty() {
            return Err(Self::invalid("storage.temp_database cannot be empty"));
        }

        if config.pipelines.directory.as_os_str().is_empty() {
            return Err(Self::invalid("pipelines.directory cannot be empty"));
        }

        Ok(())
    }

    fn invalid(message: &str) -> AppError {
        AppError::new(ErrorCategory::ValidationError, message).with_code("CONFIG-003")
    }
}
