//! Style resolution and layout: from a document tree to pages of positioned boxes.

use folio_style::property::PropertyError;
use folio_types::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Node '{node_id}': {kind} is not supported {context}")]
    UnsupportedNodeKind {
        node_id: NodeId,
        kind: &'static str,
        context: String,
    },
    #[error("Node '{node_id}': {source}")]
    UnresolvableStyleProperty {
        node_id: NodeId,
        #[source]
        source: PropertyError,
    },
    #[error("Node '{node_id}': invalid image: {reason}")]
    InvalidImage { node_id: NodeId, reason: String },
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),
}

pub mod algorithms;
pub mod config;
pub mod diagnostics;
pub mod elements;
pub(crate) mod engine;
pub mod nodes;
pub mod output;
pub mod painting;
pub mod resolve;
pub mod running;
pub mod text;

pub use self::config::LayoutConfig;
pub use self::diagnostics::{Diagnostics, Warning};
pub use self::elements::{
    AttachmentLink, BlockRole, BoxContent, CoverPart, Decoration, GridCell, GridRow, ImageBox, LineEnd,
    ParagraphFormat, PositionedBox, RectPaint, RunningPart, SpanStyle, Stroke, TableGrid, TextBlock, TextLine,
    TextSpan,
};
pub use self::engine::{LayoutContext, LayoutEngine};
pub use self::output::{LayoutTree, OutlineEntry, Page, PageStart, RunningContent};
pub use self::resolve::{ResolvedNode, resolve};

#[cfg(test)]
mod test_utils;
