//! The document Node Model.
//!
//! A document is a tree of [`Node`]s owned top-down: every node except the root
//! [`NodeKind::Document`] has exactly one parent. Nodes carry style overrides but no
//! rendering logic; the pipeline never mutates a caller's tree.

mod binary;
mod builder;
mod info;

pub use binary::{BinaryData, ImageData};
pub use info::DocumentInfo;

use folio_style::{StyleMap, StyleProperty, StyleValue};
use folio_types::NodeId;
use serde::{Deserialize, Serialize};

/// The kind of a node together with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The root of the tree, carrying document metadata.
    Document(DocumentInfo),
    /// A grouping of blocks. A titled section renders its title as a heading; an untitled
    /// section is a plain sequence and adds nothing to the output.
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// A block of inline text made of `TextRun` children.
    Paragraph,
    /// A run of text sharing one style. `\n` forces a line break.
    TextRun { text: String },
    /// A file embedded in the document, shown inline as `text`.
    Attachment {
        file_name: String,
        data: BinaryData,
        text: String,
    },
    Table,
    TableRow {
        #[serde(default)]
        header: bool,
    },
    TableCell {
        #[serde(default = "one")]
        col_span: u32,
        #[serde(default = "one")]
        row_span: u32,
    },
    Image {
        data: ImageData,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Forces a new page.
    PageBreak,
    List {
        #[serde(default)]
        ordered: bool,
    },
    ListItem,
}

fn one() -> u32 {
    1
}

impl NodeKind {
    /// A stable, human-readable name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document(_) => "Document",
            NodeKind::Section { .. } => "Section",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::TextRun { .. } => "TextRun",
            NodeKind::Attachment { .. } => "Attachment",
            NodeKind::Table => "Table",
            NodeKind::TableRow { .. } => "TableRow",
            NodeKind::TableCell { .. } => "TableCell",
            NodeKind::Image { .. } => "Image",
            NodeKind::PageBreak => "PageBreak",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem => "ListItem",
        }
    }

    /// Leaf kinds never own children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::TextRun { .. } | NodeKind::Attachment { .. } | NodeKind::Image { .. } | NodeKind::PageBreak
        )
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Caller-assigned identifier. Nodes without one are identified by their tree path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            id: None,
            kind,
            style: StyleMap::new(),
            children,
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_style(mut self, property: StyleProperty, value: impl Into<StyleValue>) -> Self {
        self.style.insert(property, value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Pre-order traversal of this node and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Concatenated text of every `TextRun` and `Attachment` below this node.
    pub fn plain_text(&self) -> String {
        self.descendants()
            .filter_map(|n| match &n.kind {
                NodeKind::TextRun { text } | NodeKind::Attachment { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
