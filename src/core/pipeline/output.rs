#![allow(clippy::result_large_err)] // Field appends return AppError so callers see the structured invalid-state context.

use crate::core::error::AppError;
use crate::core::types::{parse_closed_variant, ErrorCategory};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Possible output types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Copy into persistent storage (tables/collections must already be defined).
    Storage,
    /// Copy into a CSV file in the output location.
    Csv,
}

impl OutputType {
    pub const VARIANTS: [(&'static str, OutputType); 2] =
        [("STORAGE", OutputType::Storage), ("CSV", OutputType::Csv)];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputType::Storage => "STORAGE",
            OutputType::Csv => "CSV",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_closed_variant("output type", value, &Self::VARIANTS, "PIPELINE-002")
    }
}

impl Serialize for OutputType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where an output's rows end up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Table or collection name in persistent storage.
    Storage { to: String },
    /// Name of the CSV file to write.
    Csv { filename: String },
}

impl Destination {
    pub fn output_type(&self) -> OutputType {
        match self {
            Destination::Storage { .. } => OutputType::Storage,
            Destination::Csv { .. } => OutputType::Csv,
        }
    }
}

/// The destination-specific half of an output field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldMapping {
    /// Persistent storage field name.
    Target(String),
    /// CSV column header.
    Header(String),
}

/// A single field copied by an [`Output`].
///
/// The mapping variant always agrees with the owning output's type; fields are only
/// created by [`Output::add_field_storage`] and [`Output::add_field_csv`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputField {
    source: String,
    mapping: FieldMapping,
}

impl OutputField {
    pub fn output_type(&self) -> OutputType {
        match self.mapping {
            FieldMapping::Target(_) => OutputType::Storage,
            FieldMapping::Header(_) => OutputType::Csv,
        }
    }

    /// Temporary storage field the value is copied from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn target(&self) -> Option<&str> {
        match &self.mapping {
            FieldMapping::Target(target) => Some(target),
            FieldMapping::Header(_) => None,
        }
    }

    pub fn header(&self) -> Option<&str> {
        match &self.mapping {
            FieldMapping::Header(header) => Some(header),
            FieldMapping::Target(_) => None,
        }
    }
}

impl Serialize for OutputField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("OutputField", 2)?;
        state.serialize_field("source", &self.source)?;
        match &self.mapping {
            FieldMapping::Target(target) => state.serialize_field("target", target)?,
            FieldMapping::Header(header) => state.serialize_field("header", header)?,
        }
        state.end()
    }
}

/// A pipeline output.
///
/// The processed data in temporary storage is flushed once a pipeline completes, so
/// outputs declare which of it is kept and where. Field order is the write order and
/// fields can only be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    from: String,
    destination: Destination,
    fields: Vec<OutputField>,
}

impl Output {
    /// Create a STORAGE output copying from temporary to persistent storage.
    ///
    /// `from` names the temporary table or collection, `to` the persistent one.
    pub fn make_storage<F: Into<String>, T: Into<String>>(from: F, to: T) -> Self {
        Output {
            from: from.into(),
            destination: Destination::Storage { to: to.into() },
            fields: Vec::new(),
        }
    }

    /// Create a CSV output copying from temporary storage into `filename`.
    pub fn make_csv<F: Into<String>, N: Into<String>>(from: F, filename: N) -> Self {
        Output {
            from: from.into(),
            destination: Destination::Csv {
                filename: filename.into(),
            },
            fields: Vec::new(),
        }
    }

    pub fn output_type(&self) -> OutputType {
        self.destination.output_type()
    }

    /// Temporary storage table or collection the rows come from.
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Persistent storage container, for STORAGE outputs.
    pub fn to(&self) -> Option<&str> {
        match &self.destination {
            Destination::Storage { to } => Some(to),
            Destination::Csv { .. } => None,
        }
    }

    /// CSV file name, for CSV outputs.
    pub fn filename(&self) -> Option<&str> {
        match &self.destination {
            Destination::Csv { filename } => Some(filename),
            Destination::Storage { .. } => None,
        }
    }

    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    /// Append a field copied into persistent storage.
    ///
    /// `source` is the temporary storage field (e.g. `AGE`), `target` the persistent
    /// storage field (e.g. `USER_ID_ALT`). Fails without touching the field list when
    /// this is not a STORAGE output.
    pub fn add_field_storage<S: Into<String>, T: Into<String>>(
        &mut self,
        source: S,
        target: T,
    ) -> Result<&OutputField, AppError> {
        if self.output_type() != OutputType::Storage {
            return Err(self.wrong_shape(OutputType::Storage, "PIPELINE-003"));
        }
        Ok(self.push(source.into(), FieldMapping::Target(target.into())))
    }

    /// Append a field written as a CSV column.
    ///
    /// `source` is the temporary storage field (e.g. `PERSONAL.AGE`), `header` the CSV
    /// column header. Fails without touching the field list when this is not a CSV output.
    pub fn add_field_csv<S: Into<String>, H: Into<String>>(
        &mut self,
        source: S,
        header: H,
    ) -> Result<&OutputField, AppError> {
        if self.output_type() != OutputType::Csv {
            return Err(self.wrong_shape(OutputType::Csv, "PIPELINE-004"));
        }
        Ok(self.push(source.into(), FieldMapping::Header(header.into())))
    }

    fn push(&mut self, source: String, mapping: FieldMapping) -> &OutputField {
        let index = self.fields.len();
        self.fields.push(OutputField { source, mapping });
        &self.fields[index]
    }

    fn wrong_shape(&self, expected: OutputType, code: &str) -> AppError {
        AppError::new(
            ErrorCategory::InvalidState,
            format!(
                "Can only add {} fields to a {} type object, this type is: {}",
                expected.as_str(),
                expected.as_str(),
                self.output_type()
            ),
        )
        .with_code(code)
        .with_context("from", self.from.as_str())
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Output", 4)?;
        state.serialize_field("type", &self.output_type())?;
        state.serialize_field("from", &self.from)?;
        match &self.destination {
            Destination::Storage { to } => state.serialize_field("to", to)?,
            Destination::Csv { filename } => state.serialize_field("filename", filename)?,
        }
        state.serialize_field("fields", &self.fields)?;
        state.end()
    }
}
