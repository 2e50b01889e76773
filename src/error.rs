use folio_layout::LayoutError;
use folio_render_core::RenderError;
use folio_style::StyleParseError;
use thiserror::Error;

/// Everything that can abort a render call. No partial output accompanies an error.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid option: {0}")]
    Options(#[from] StyleParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported output: {0}")]
    UnsupportedFormat(String),
}
