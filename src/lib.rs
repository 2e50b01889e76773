//! Describe a document once as a tree of [`Node`]s and render it to PDF, DOCX or HTML.
//!
//! ```no_run
//! use folio::{DocumentInfo, Node, OutputFormat, RenderOptions, render_document};
//!
//! let doc = Node::document(
//!     DocumentInfo::titled("Hello"),
//!     vec![Node::section("Greeting", vec![Node::text_paragraph("Hello, world.")])],
//! );
//! let output = render_document(&doc, OutputFormat::Pdf, &RenderOptions::default())?;
//! std::fs::write("hello.pdf", &output.bytes)?;
//! # Ok::<(), folio::FolioError>(())
//! ```

mod error;
mod options;
mod pipeline;

pub use error::FolioError;
pub use options::RenderOptions;
pub use pipeline::{Pipeline, PipelineBuilder, RenderOutput};

pub use folio_ast::{DocumentInfo, ImageData, Node, NodeKind};
pub use folio_layout::{Diagnostics, LayoutConfig, LayoutError, LayoutTree, Warning};
pub use folio_render_core::{OutputFormat, RenderError, Renderer};
pub use folio_render_docx::DocxRenderer;
pub use folio_render_html::HtmlRenderer;
pub use folio_render_lopdf::LopdfRenderer;
pub use folio_style::{Margins, PageSize, StyleProperty, StyleValue};
pub use folio_traits::{FontSpec, MeasurementProvider, StandardFontMetrics, TrueTypeMetrics};
pub use folio_types::NodeId;

/// Lays out `root` with `options` and renders it as `format`.
///
/// Fatal errors return no bytes; non-fatal conditions are listed in
/// [`RenderOutput::diagnostics`].
pub fn render_document(root: &Node, format: OutputFormat, options: &RenderOptions) -> Result<RenderOutput, FolioError> {
    PipelineBuilder::new()
        .with_options(options.clone())
        .build()?
        .render(root, format)
}
