//! Pipeline descriptors: what a pipeline reads, what it runs and where results go.

pub mod input_field;
pub mod output;
pub mod processor;
pub mod registry;
pub mod schema;

pub use input_field::InputField;
pub use output::{Destination, FieldMapping, Output, OutputField, OutputType};
pub use processor::{Processor, ProcessorType};
pub use registry::{PipelineRegistry, PipelineRegistryBuilder};
pub use schema::{
    InputFieldDocument, OutputDocument, OutputFieldDocument, PipelineConfig,
    PipelineConfigBuilder, PipelineDocument, ProcessorDocument,
};
