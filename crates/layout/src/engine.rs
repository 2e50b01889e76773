//! The layout engine: walks a resolved tree and fills pages.

use crate::algorithms::pagination::Flow;
use crate::config::LayoutConfig;
use crate::diagnostics::Diagnostics;
use crate::elements::BlockRole;
use crate::nodes::{block, cover, image, list_item, page_break, paragraph, table};
use crate::output::{LayoutTree, OutlineEntry};
use crate::resolve::{ResolvedNode, resolve};
use crate::running;
use crate::text::Measurer;
use crate::LayoutError;
use folio_ast::{Node, NodeKind};
use folio_traits::MeasurementProvider;
use std::sync::Arc;

/// Mutable state shared by every node during one layout pass.
pub struct LayoutContext<'e> {
    pub config: &'e LayoutConfig,
    pub provider: &'e dyn MeasurementProvider,
    pub measurer: Measurer<'e>,
    pub diagnostics: Diagnostics,
    pub outline: Vec<OutlineEntry>,
    /// Number of titled sections enclosing the current node.
    pub section_depth: usize,
    pub list_depth: usize,
}

impl<'e> LayoutContext<'e> {
    pub fn new(config: &'e LayoutConfig, provider: &'e dyn MeasurementProvider) -> Self {
        Self {
            config,
            provider,
            measurer: Measurer::new(provider, config.fallback_font_family.clone()),
            diagnostics: Diagnostics::new(),
            outline: Vec::new(),
            section_depth: 0,
            list_depth: 0,
        }
    }
}

/// Lays out one block-level node at the flow's cursor.
pub fn layout_block(ctx: &mut LayoutContext<'_>, flow: &mut Flow, node: &ResolvedNode<'_>) -> Result<(), LayoutError> {
    match node.kind() {
        NodeKind::Section { title } => block::layout_section(ctx, flow, node, title.as_deref()),
        NodeKind::Paragraph => paragraph::layout_paragraph(ctx, flow, node, BlockRole::Body).map(|_| ()),
        NodeKind::Table => table::layout_table(ctx, flow, node),
        NodeKind::Image { data, caption } => image::layout_image(ctx, flow, node, data, caption.as_deref()),
        NodeKind::PageBreak => {
            page_break::layout_page_break(flow);
            Ok(())
        }
        NodeKind::List { ordered } => list_item::layout_list(ctx, flow, node, *ordered),
        kind @ (NodeKind::Document(_)
        | NodeKind::TextRun { .. }
        | NodeKind::Attachment { .. }
        | NodeKind::TableRow { .. }
        | NodeKind::TableCell { .. }
        | NodeKind::ListItem) => Err(LayoutError::UnsupportedNodeKind {
            node_id: node.id.clone(),
            kind: kind.name(),
            context: "as a block".to_string(),
        }),
    }
}

/// Turns resolved document trees into Layout Trees.
///
/// The engine holds no per-document state; one instance can lay out any number of
/// documents, concurrently if the provider allows it.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    provider: Arc<dyn MeasurementProvider>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig, provider: Arc<dyn MeasurementProvider>) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config, provider })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Resolves styles for `root` and lays it out.
    pub fn layout_document(&self, root: &Node) -> Result<LayoutTree, LayoutError> {
        let resolved = resolve(root, &self.config)?;
        self.layout(&resolved)
    }

    pub fn layout(&self, root: &ResolvedNode<'_>) -> Result<LayoutTree, LayoutError> {
        let NodeKind::Document(info) = root.kind() else {
            return Err(LayoutError::UnsupportedNodeKind {
                node_id: root.id.clone(),
                kind: root.kind().name(),
                context: "as the document root".to_string(),
            });
        };

        let mut ctx = LayoutContext::new(&self.config, self.provider.as_ref());
        let mut flow = Flow::for_pages(self.config.page_dimensions(), self.config.content_area());
        if self.config.cover_page {
            cover::layout_cover(&mut ctx, &mut flow, info, &root.style, &root.id);
        }
        for child in &root.children {
            flow.x = flow.content_area().x;
            flow.width = flow.content_area().width;
            layout_block(&mut ctx, &mut flow, child)?;
        }
        let mut pages = flow.finish();
        let running = running::running_content(&self.config, info);
        if !running.is_empty() {
            running::stamp_pages(&mut ctx, &mut pages, &running, &root.style, &root.id);
        }

        log::debug!(
            "Laid out '{}' on {} pages with {} warnings",
            root.id,
            pages.len(),
            ctx.diagnostics.len()
        );
        Ok(LayoutTree {
            info: info.clone(),
            page_size: self.config.page_dimensions(),
            margins: self.config.margins,
            pages,
            outline: ctx.outline,
            running,
            diagnostics: ctx.diagnostics,
        })
    }
}
