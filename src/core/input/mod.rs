//! Input handlers that populate temporary storage from category extracts.

#![allow(clippy::result_large_err)]

pub mod category;
pub mod csv_handler;
pub mod layout;
pub mod loader;
pub mod source;

pub use category::EntityCategory;
pub use csv_handler::CsvInputHandler;
pub use layout::{CategoryLayout, FieldKind, FieldSpec};
pub use loader::InputLoader;
pub use source::{ConfiguredSource, SampleSource, SourceResolver};

use crate::core::error::AppError;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of loading one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub category: EntityCategory,
    pub source: PathBuf,
    pub table: String,
    pub rows: usize,
}

/// Reads the records of one entity category into temporary storage.
pub trait InputHandler: Send + Sync {
    fn category(&self) -> EntityCategory;

    /// Where this run reads its extract from.
    fn get_file(&self) -> Result<PathBuf, AppError>;

    /// Read the extract and write it to temporary storage. All rows are written or none.
    fn load(&self) -> Result<LoadReport, AppError>;
}
