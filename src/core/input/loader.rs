#![allow(clippy::result_large_err)]

use super::category::EntityCategory;
use super::csv_handler::CsvInputHandler;
use super::layout::CategoryLayout;
use super::{InputHandler, LoadReport};
use crate::core::config::LapConfig;
use crate::core::error::AppError;
use crate::core::pipeline::PipelineConfig;
use crate::core::storage::TempStorage;
use crate::core::types::ErrorCategory;
use std::collections::HashMap;
use std::sync::Arc;

/// Runs the input handlers a pipeline needs, one per category.
#[derive(Default)]
pub struct InputLoader {
    handlers: HashMap<EntityCategory, Box<dyn InputHandler>>,
}

impl InputLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// CSV handlers for every category, reading sample data when the config asks for it.
    pub fn from_config(config: &LapConfig, store: Arc<dyn TempStorage>) -> Self {
        let mut loader = Self::new();
        for category in EntityCategory::ALL {
            loader = if config.input.use_sample_data {
                loader.with_handler(CsvInputHandler::sample(category, config, store.clone()))
            } else {
                loader.with_handler(CsvInputHandler::standard(category, config, store.clone()))
            };
        }
        loader
    }

    /// Register `handler` for its category, replacing any previous one.
    pub fn with_handler<H: InputHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.insert(handler.category(), Box::new(handler));
        self
    }

    pub fn handler(&self, category: EntityCategory) -> Option<&dyn InputHandler> {
        self.handlers.get(&category).map(|handler| &**handler)
    }

    /// Load every category `pipeline` reads, each once, in first-declared order.
    ///
    /// Inputs and handlers are checked up front, so a rejected pipeline loads nothing.
    pub fn load_for(&self, pipeline: &PipelineConfig) -> Result<Vec<LoadReport>, AppError> {
        let mut categories: Vec<EntityCategory> = Vec::new();
        for input in pipeline.inputs() {
            let (category, column) = input.qualified_parts().ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("input field '{}' is not CATEGORY.FIELD", input.name()),
                )
                .with_code("INPUT-032")
                .with_context("pipeline", pipeline.pipeline_type())
            })?;
            let category: EntityCategory = category.parse()?;

            let layout = CategoryLayout::for_category(category);
            if input.required() && layout.field(column).is_none() {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    format!(
                        "required input {} is not a {} column",
                        input.name(),
                        category
                    ),
                )
                .with_code("INPUT-031")
                .with_context("pipeline", pipeline.pipeline_type())
                .with_context("field", input.name()));
            }

            if !self.handlers.contains_key(&category) {
                return Err(AppError::new(
                    ErrorCategory::SourceError,
                    format!("no input handler registered for {}", category),
                )
                .with_code("INPUT-030")
                .with_context("pipeline", pipeline.pipeline_type())
                .with_context("category", category.as_str()));
            }

            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        let mut reports = Vec::with_capacity(categories.len());
        for category in categories {
            let handler = &self.handlers[&category];
            reports.push(handler.load()?);
        }

        tracing::info!(
            pipeline = pipeline.pipeline_type(),
            categories = reports.len(),
            rows = reports.iter().map(|report| report.rows).sum::<usize>(),
            "inputs loaded"
        );
        Ok(reports)
    }
}
