//! Pipeline descriptors and input handlers for the learning analytics processor.
//!
//! A pipeline is declared by a [`core::pipeline::PipelineConfig`]: what it reads from
//! temporary storage, which external transformation units it references and where its
//! results land. Input handlers in [`core::input`] populate temporary storage from
//! per-category extracts before a pipeline runs.

pub mod core;
pub mod logging;

/// Current crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T> = std::result::Result<T, anyhow::Error>;
