use crate::core::error::AppError;
use crate::core::types::parse_closed_variant;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Possible processor types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorType {
    /// A Pentaho Kettle transformation or job (`.ktr` / `.kjb`), executed externally.
    Kettle,
}

impl ProcessorType {
    pub const VARIANTS: [(&'static str, ProcessorType); 1] = [("KETTLE", ProcessorType::Kettle)];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessorType::Kettle => "KETTLE",
        }
    }
}

impl fmt::Display for ProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessorType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_closed_variant("processor type", value, &Self::VARIANTS, "PIPELINE-001")
    }
}

impl Serialize for ProcessorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A pipeline processor: a reference to an external transformation unit.
///
/// The artifact behind `filename` is never opened here; the execution engine
/// receives the `(name, type, filename)` triple as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Processor {
    name: String,
    #[serde(rename = "type")]
    processor_type: ProcessorType,
    filename: String,
}

impl Processor {
    /// Create a Kettle based processor.
    ///
    /// `name` labels this part of the pipeline for logs; `filename` is the path (absolute,
    /// or relative to the pipelines directory) of the `.ktr` or `.kjb` file.
    pub fn make_external_unit<N: Into<String>, F: Into<String>>(name: N, filename: F) -> Self {
        Processor {
            name: name.into(),
            processor_type: ProcessorType::Kettle,
            filename: filename.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn processor_type(&self) -> ProcessorType {
        self.processor_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}
