#![allow(clippy::result_large_err)] // Descriptor APIs return AppError to keep codes and context on validation failures.

use super::input_field::InputField;
use super::output::{Output, OutputType};
use super::processor::{Processor, ProcessorType};
use crate::core::error::AppError;
use crate::core::input::EntityCategory;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

fn type_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("type key pattern is valid"))
}

/// Serialized form of a pipeline descriptor (YAML or JSON).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineDocument {
    #[serde(rename = "type")]
    pub pipeline_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Statistical indicators such as accuracy or confidence interval.
    #[serde(default)]
    pub stats: IndexMap<String, Value>,
    #[serde(default)]
    pub inputs: Vec<InputFieldDocument>,
    #[serde(default)]
    pub processors: Vec<ProcessorDocument>,
    #[serde(default)]
    pub outputs: Vec<OutputDocument>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputFieldDocument {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessorDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub processor_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputDocument {
    #[serde(rename = "type")]
    pub output_type: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub fields: Vec<OutputFieldDocument>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputFieldDocument {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

fn invalid(code: &str, message: String) -> AppError {
    AppError::new(ErrorCategory::ValidationError, message).with_code(code)
}

impl PipelineDocument {
    /// Build the validated descriptor. Every nested object goes through its factory.
    pub fn into_config(self) -> Result<PipelineConfig, AppError> {
        let mut builder = PipelineConfig::builder(self.pipeline_type, self.name)
            .description(self.description);
        for (key, value) in self.stats {
            builder = builder.stat(key, value);
        }
        for input in self.inputs {
            builder = builder.input(InputField::make(input.name, input.required));
        }
        for processor in self.processors {
            let processor = match processor.processor_type.parse::<ProcessorType>()? {
                ProcessorType::Kettle => {
                    Processor::make_external_unit(processor.name, processor.filename)
                }
            };
            builder = builder.processor(processor);
        }
        for output in self.outputs {
            builder = builder.output(output.into_output()?);
        }
        builder.build()
    }
}

impl OutputDocument {
    fn into_output(self) -> Result<Output, AppError> {
        let output_type: OutputType = self.output_type.parse()?;
        let mut output = match (output_type, self.to, self.filename) {
            (OutputType::Storage, Some(to), None) => Output::make_storage(self.from, to),
            (OutputType::Csv, None, Some(filename)) => Output::make_csv(self.from, filename),
            (OutputType::Storage, ..) => {
                return Err(invalid(
                    "PIPELINE-015",
                    format!("STORAGE output from {} needs 'to' and no 'filename'", self.from),
                ))
            }
            (OutputType::Csv, ..) => {
                return Err(invalid(
                    "PIPELINE-015",
                    format!("CSV output from {} needs 'filename' and no 'to'", self.from),
                ))
            }
        };

        // The typed append decides whether the field shape fits this output.
        for field in self.fields {
            match (field.target, field.header) {
                (Some(target), None) => {
                    output.add_field_storage(field.source, target)?;
                }
                (None, Some(header)) => {
                    output.add_field_csv(field.source, header)?;
                }
                _ => {
                    return Err(invalid(
                        "PIPELINE-017",
                        format!(
                            "output field {} must set exactly one of 'target' or 'header'",
                            field.source
                        ),
                    )
                    .with_context("from", output.from()))
                }
            }
        }
        Ok(output)
    }
}

/// All configuration settings of one pipeline.
///
/// Built once, validated, and then shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pipeline_type: String,
    name: String,
    description: String,
    stats: IndexMap<String, Value>,
    inputs: Vec<InputField>,
    processors: Vec<Processor>,
    outputs: Vec<Output>,
}

impl PipelineConfig {
    pub fn builder<T: Into<String>, N: Into<String>>(pipeline_type: T, name: N) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            pipeline_type: pipeline_type.into(),
            name: name.into(),
            description: String::new(),
            stats: IndexMap::new(),
            inputs: Vec::new(),
            processors: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Load a descriptor from a `.yaml`, `.yml` or `.json` file.
    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let text = fs::read_to_string(path).map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to read {}: {}", path.display(), err),
            )
            .with_code("PIPELINE-020")
        })?;
        let parsed = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(invalid(
                "PIPELINE-022",
                format!(
                    "unsupported descriptor file {}, expected .yaml, .yml or .json",
                    path.display()
                ),
            )),
        };
        let config = parsed.map_err(|mut err| {
            err.add_context("path", &path.display().to_string());
            err
        })?;
        tracing::info!(
            pipeline = %config.pipeline_type,
            path = %path.display(),
            inputs = config.inputs.len(),
            outputs = config.outputs.len(),
            "loaded pipeline descriptor"
        );
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, AppError> {
        let doc: PipelineDocument = serde_yaml::from_str(text).map_err(|err| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("failed to parse pipeline descriptor: {}", err),
            )
            .with_code("PIPELINE-021")
        })?;
        doc.into_config()
    }

    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        let doc: PipelineDocument = serde_json::from_str(text).map_err(|err| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("failed to parse pipeline descriptor: {}", err),
            )
            .with_code("PIPELINE-021")
        })?;
        doc.into_config()
    }

    /// Serializable form, suitable for writing the descriptor back out.
    pub fn to_document(&self) -> PipelineDocument {
        PipelineDocument {
            pipeline_type: self.pipeline_type.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            stats: self.stats.clone(),
            inputs: self
                .inputs
                .iter()
                .map(|input| InputFieldDocument {
                    name: input.name().to_string(),
                    required: input.required(),
                })
                .collect(),
            processors: self
                .processors
                .iter()
                .map(|processor| ProcessorDocument {
                    name: processor.name().to_string(),
                    processor_type: processor.processor_type().to_string(),
                    filename: processor.filename().to_string(),
                })
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|output| OutputDocument {
                    output_type: output.output_type().to_string(),
                    from: output.from().to_string(),
                    to: output.to().map(String::from),
                    filename: output.filename().map(String::from),
                    fields: output
                        .fields()
                        .iter()
                        .map(|field| OutputFieldDocument {
                            source: field.source().to_string(),
                            target: field.target().map(String::from),
                            header: field.header().map(String::from),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Unique pipeline key, e.g. `marist_student_risk`.
    pub fn pipeline_type(&self) -> &str {
        &self.pipeline_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stats(&self) -> &IndexMap<String, Value> {
        &self.stats
    }

    pub fn inputs(&self) -> &[InputField] {
        &self.inputs
    }

    pub fn required_inputs(&self) -> impl Iterator<Item = &InputField> {
        self.inputs.iter().filter(|input| input.required())
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Categories referenced by the inputs, each once, in first-declared order.
    pub fn input_categories(&self) -> Vec<EntityCategory> {
        let mut categories = Vec::new();
        for input in &self.inputs {
            let category = input
                .qualified_parts()
                .and_then(|(category, _)| category.parse::<EntityCategory>().ok());
            if let Some(category) = category {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }
        categories
    }
}

/// Collects the parts of a [`PipelineConfig`]; `build` validates them as a whole.
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    pipeline_type: String,
    name: String,
    description: String,
    stats: IndexMap<String, Value>,
    inputs: Vec<InputField>,
    processors: Vec<Processor>,
    outputs: Vec<Output>,
}

impl PipelineConfigBuilder {
    pub fn description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = description.into();
        self
    }

    pub fn stat<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.stats.insert(key.into(), value);
        self
    }

    pub fn input(mut self, input: InputField) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn processor(mut self, processor: Processor) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, AppError> {
        self.validate()?;
        Ok(PipelineConfig {
            pipeline_type: self.pipeline_type,
            name: self.name,
            description: self.description,
            stats: self.stats,
            inputs: self.inputs,
            processors: self.processors,
            outputs: self.outputs,
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        if !type_key_pattern().is_match(&self.pipeline_type) {
            return Err(invalid(
                "PIPELINE-010",
                format!(
                    "pipeline type '{}' must be lowercase letters, digits or '_'",
                    self.pipeline_type
                ),
            ));
        }
        let context = |err: AppError| err.with_context("pipeline", self.pipeline_type.as_str());

        if self.name.trim().is_empty() {
            return Err(context(invalid(
                "PIPELINE-011",
                "pipeline name cannot be empty".to_string(),
            )));
        }

        let mut seen = HashSet::new();
        for input in &self.inputs {
            let Some((category, _)) = input.qualified_parts() else {
                return Err(context(invalid(
                    "PIPELINE-012",
                    format!("input field '{}' is not CATEGORY.FIELD", input.name()),
                )));
            };
            if let Err(err) = category.parse::<EntityCategory>() {
                return Err(context(invalid(
                    "PIPELINE-012",
                    format!("input field '{}': {}", input.name(), err.message),
                )));
            }
            if !seen.insert(input.name().to_ascii_uppercase()) {
                return Err(context(invalid(
                    "PIPELINE-013",
                    format!("input field '{}' is declared more than once", input.name()),
                )));
            }
        }

        for processor in &self.processors {
            if processor.name().trim().is_empty() || processor.filename().trim().is_empty() {
                return Err(context(invalid(
                    "PIPELINE-014",
                    format!(
                        "processor '{}' needs both a name and a filename",
                        processor.name()
                    ),
                )));
            }
        }

        let mut destinations = HashSet::new();
        for output in &self.outputs {
            let destination = output.to().or(output.filename()).unwrap_or_default();
            if output.from().trim().is_empty() || destination.trim().is_empty() {
                return Err(context(invalid(
                    "PIPELINE-015",
                    format!(
                        "{} output needs a source and a destination",
                        output.output_type()
                    ),
                )));
            }
            if !destinations.insert((output.output_type(), destination)) {
                return Err(context(invalid(
                    "PIPELINE-016",
                    format!(
                        "{} destination '{}' is used by more than one output",
                        output.output_type(),
                        destination
                    ),
                )));
            }
        }
        Ok(())
    }
}
