use crate::error::RenderError;
use crate::format::OutputFormat;
use folio_layout::LayoutTree;

/// Serializes a finished Layout Tree into the bytes of one output format.
///
/// Implementations keep no state between calls, so a single renderer can serve concurrent
/// pipelines.
pub trait Renderer: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Produces the complete file. On error no partial output is returned.
    fn render(&self, tree: &LayoutTree) -> Result<Vec<u8>, RenderError>;
}
