pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, LapConfig};
pub use error::AppError;
pub use input::{
    CsvInputHandler, EntityCategory, InputHandler, InputLoader, LoadReport, SourceResolver,
};
pub use pipeline::{
    InputField, Output, OutputField, OutputType, PipelineConfig, PipelineRegistry, Processor,
    ProcessorType,
};
pub use storage::{
    Column, ColumnType, FieldValue, MemoryStore, Record, SqliteStore, TempStorage,
};
pub use types::{ErrorCategory, ErrorSeverity};
