//! Core rendering abstractions shared by the output backends.
//!
//! This crate provides:
//! - the `Renderer` trait every backend implements
//! - `OutputFormat`, the closed set of formats the pipeline can produce
//! - `RenderError`, the error type of every backend
//! - `flow`, which rebuilds the document flow from pages for flow-based formats
//! - shared helpers for coordinates and font naming

mod error;
pub mod flow;
mod format;
mod traits;
pub mod utils;

pub use error::RenderError;
pub use format::OutputFormat;
pub use traits::Renderer;
