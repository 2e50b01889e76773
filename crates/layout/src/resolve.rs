//! The Style Resolver: a single top-down pass pairing every node with its cascaded style.
//!
//! The same pass enforces the structural rules of the Node Model, so the engine can trust
//! the shape of whatever it receives.

use crate::LayoutError;
use crate::config::{LayoutConfig, header_row_layer};
use folio_ast::{Node, NodeKind};
use folio_style::{Style, StyleMap};
use folio_types::NodeId;
use std::sync::Arc;

/// A node paired with its effective style.
///
/// Borrowed from the caller's tree for the duration of one render; never cached.
#[derive(Debug, Clone)]
pub struct ResolvedNode<'a> {
    pub node: &'a Node,
    /// The node's explicit id, or its path below the nearest explicit id.
    pub id: NodeId,
    /// Shared with the parent when the node adds no overrides.
    pub style: Arc<Style>,
    pub children: Vec<ResolvedNode<'a>>,
}

impl<'a> ResolvedNode<'a> {
    pub fn kind(&self) -> &'a NodeKind {
        &self.node.kind
    }

    /// Pre-order iterator over this node and its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &ResolvedNode<'a>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Where a node sits, for the structural rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Root,
    Block,
    Table,
    Row,
    Paragraph,
    List,
    Leaf,
}

/// Resolves `root` against the configured document defaults.
pub fn resolve<'a>(root: &'a Node, config: &LayoutConfig) -> Result<ResolvedNode<'a>, LayoutError> {
    let defaults = Arc::new(config.defaults.clone());
    resolve_with(root, &defaults, config)
}

/// Resolves `node` as if its parent's effective style were `inherited`.
pub fn resolve_with<'a>(
    node: &'a Node,
    inherited: &Arc<Style>,
    config: &LayoutConfig,
) -> Result<ResolvedNode<'a>, LayoutError> {
    let id = node.id.clone().unwrap_or_else(|| NodeId::from("document"));
    let resolver = Resolver {
        table_layer: &config.table_defaults,
        header_layer: header_row_layer(),
    };
    resolver.resolve_node(node, id, inherited, Parent::Root, false)
}

struct Resolver<'c> {
    table_layer: &'c StyleMap,
    header_layer: StyleMap,
}

impl Resolver<'_> {
    fn resolve_node<'a>(
        &self,
        node: &'a Node,
        id: NodeId,
        inherited: &Arc<Style>,
        parent: Parent,
        in_cell: bool,
    ) -> Result<ResolvedNode<'a>, LayoutError> {
        check_placement(node, &id, parent, in_cell)?;

        let style = self.cascade(node, &id, inherited)?;
        let child_parent = match &node.kind {
            NodeKind::Document(_) | NodeKind::Section { .. } | NodeKind::TableCell { .. } | NodeKind::ListItem => {
                Parent::Block
            }
            NodeKind::Table => Parent::Table,
            NodeKind::TableRow { .. } => Parent::Row,
            NodeKind::Paragraph => Parent::Paragraph,
            NodeKind::List { .. } => Parent::List,
            NodeKind::TextRun { .. } | NodeKind::Attachment { .. } | NodeKind::Image { .. } | NodeKind::PageBreak => {
                Parent::Leaf
            }
        };
        let child_in_cell = in_cell || matches!(node.kind, NodeKind::TableCell { .. });

        let children = node
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let child_id = child
                    .id
                    .clone()
                    .unwrap_or_else(|| NodeId::from(format!("{}/{}", id, i)));
                self.resolve_node(child, child_id, &style, child_parent, child_in_cell)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedNode {
            node,
            id,
            style,
            children,
        })
    }

    /// Folds the node's layers over the inherited snapshot, nearest last.
    fn cascade(&self, node: &Node, id: &NodeId, inherited: &Arc<Style>) -> Result<Arc<Style>, LayoutError> {
        let synthetic = match &node.kind {
            NodeKind::Table => Some(self.table_layer),
            NodeKind::TableRow { header: true } => Some(&self.header_layer),
            _ => None,
        };
        if synthetic.is_none() && node.style.is_empty() {
            return Ok(Arc::clone(inherited));
        }

        let mut style: Style = (**inherited).clone();
        for layer in synthetic.into_iter().chain(std::iter::once(&node.style)) {
            style = style
                .with_overrides(layer)
                .map_err(|source| LayoutError::UnresolvableStyleProperty {
                    node_id: id.clone(),
                    source,
                })?;
        }
        Ok(Arc::new(style))
    }
}

fn check_placement(node: &Node, id: &NodeId, parent: Parent, in_cell: bool) -> Result<(), LayoutError> {
    let unsupported = |context: &str| LayoutError::UnsupportedNodeKind {
        node_id: id.clone(),
        kind: node.kind.name(),
        context: context.to_string(),
    };

    if node.kind.is_leaf() && !node.children.is_empty() {
        return Err(unsupported("with children"));
    }

    let allowed = match (&node.kind, parent) {
        (NodeKind::Document(_), Parent::Root) => true,
        (_, Parent::Root) => return Err(unsupported("as the document root")),
        (NodeKind::Document(_), _) => false,
        (NodeKind::TextRun { .. } | NodeKind::Attachment { .. }, p) => p == Parent::Paragraph,
        (NodeKind::TableRow { .. }, p) => p == Parent::Table,
        (NodeKind::TableCell { .. }, p) => p == Parent::Row,
        (NodeKind::ListItem, p) => p == Parent::List,
        (
            NodeKind::Section { .. }
            | NodeKind::Paragraph
            | NodeKind::Table
            | NodeKind::Image { .. }
            | NodeKind::PageBreak
            | NodeKind::List { .. },
            p,
        ) => p == Parent::Block,
    };
    if !allowed {
        let context = match parent {
            Parent::Root | Parent::Block => "in a block container",
            Parent::Table => "inside a Table",
            Parent::Row => "inside a TableRow",
            Parent::Paragraph => "inside a Paragraph",
            Parent::List => "inside a List",
            Parent::Leaf => "inside a leaf node",
        };
        return Err(unsupported(context));
    }

    if in_cell && matches!(node.kind, NodeKind::PageBreak) {
        return Err(unsupported("inside a TableCell"));
    }
    if let NodeKind::TableCell { col_span, row_span } = node.kind {
        if col_span < 1 || row_span < 1 {
            return Err(unsupported("with a span below 1"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
