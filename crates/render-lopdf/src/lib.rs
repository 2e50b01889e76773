//! PDF renderer built on `lopdf` object types.
//!
//! Objects are buffered by id and written once with exact cross-reference offsets, so the
//! output is byte-identical for identical input.

mod attachments;
mod content;
mod fonts;
mod images;
mod outline;
mod renderer;
mod writer;

pub use fonts::to_win_ansi;
pub use renderer::LopdfRenderer;
pub use writer::PdfWriter;

#[cfg(test)]
mod renderer_test;
