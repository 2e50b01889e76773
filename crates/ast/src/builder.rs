//! Convenience constructors for building trees in code.

use crate::{BinaryData, DocumentInfo, ImageData, Node, NodeKind};
use folio_style::{FontStyle, FontWeight, StyleProperty};

impl Node {
    pub fn document(info: DocumentInfo, children: Vec<Node>) -> Node {
        Node::new(NodeKind::Document(info), children)
    }

    pub fn section(title: impl Into<String>, children: Vec<Node>) -> Node {
        Node::new(
            NodeKind::Section {
                title: Some(title.into()),
            },
            children,
        )
    }

    /// An untitled section: groups blocks without adding anything to the output.
    pub fn sequence(children: Vec<Node>) -> Node {
        Node::new(NodeKind::Section { title: None }, children)
    }

    pub fn paragraph(runs: Vec<Node>) -> Node {
        Node::new(NodeKind::Paragraph, runs)
    }

    /// A paragraph holding a single run of `text`.
    pub fn text_paragraph(text: impl Into<String>) -> Node {
        Node::paragraph(vec![Node::text(text)])
    }

    pub fn text(text: impl Into<String>) -> Node {
        Node::new(NodeKind::TextRun { text: text.into() }, Vec::new())
    }

    /// An inline link to an embedded file.
    pub fn attachment(file_name: impl Into<String>, data: impl Into<BinaryData>, text: impl Into<String>) -> Node {
        Node::new(
            NodeKind::Attachment {
                file_name: file_name.into(),
                data: data.into(),
                text: text.into(),
            },
            Vec::new(),
        )
    }

    /// A bold run.
    pub fn strong(text: impl Into<String>) -> Node {
        Node::text(text).with_style(StyleProperty::FontWeight, FontWeight::Bold)
    }

    /// An italic run.
    pub fn emphasis(text: impl Into<String>) -> Node {
        Node::text(text).with_style(StyleProperty::FontStyle, FontStyle::Italic)
    }

    pub fn table(rows: Vec<Node>) -> Node {
        Node::new(NodeKind::Table, rows)
    }

    pub fn row(cells: Vec<Node>) -> Node {
        Node::new(NodeKind::TableRow { header: false }, cells)
    }

    pub fn header_row(cells: Vec<Node>) -> Node {
        Node::new(NodeKind::TableRow { header: true }, cells)
    }

    pub fn cell(children: Vec<Node>) -> Node {
        Node::new(
            NodeKind::TableCell {
                col_span: 1,
                row_span: 1,
            },
            children,
        )
    }

    pub fn text_cell(text: impl Into<String>) -> Node {
        Node::cell(vec![Node::text_paragraph(text)])
    }

    /// Sets the spans of a `TableCell`. Other kinds are returned unchanged.
    pub fn with_span(mut self, cols: u32, rows: u32) -> Node {
        if let NodeKind::TableCell { col_span, row_span } = &mut self.kind {
            *col_span = cols;
            *row_span = rows;
        }
        self
    }

    /// A table whose first row holds `headings`.
    pub fn simple_table<S: Into<String>>(headings: Vec<S>, rows: Vec<Vec<S>>) -> Node {
        let mut table_rows = Vec::with_capacity(rows.len() + 1);
        if !headings.is_empty() {
            table_rows.push(Node::header_row(
                headings.into_iter().map(Node::text_cell).collect(),
            ));
        }
        table_rows.extend(
            rows.into_iter()
                .map(|row| Node::row(row.into_iter().map(Node::text_cell).collect())),
        );
        Node::table(table_rows)
    }

    pub fn image(data: impl Into<ImageData>) -> Node {
        Node::new(
            NodeKind::Image {
                data: data.into(),
                caption: None,
            },
            Vec::new(),
        )
    }

    pub fn captioned_image(data: impl Into<ImageData>, caption: impl Into<String>) -> Node {
        Node::new(
            NodeKind::Image {
                data: data.into(),
                caption: Some(caption.into()),
            },
            Vec::new(),
        )
    }

    pub fn page_break() -> Node {
        Node::new(NodeKind::PageBreak, Vec::new())
    }

    pub fn list(ordered: bool, items: Vec<Node>) -> Node {
        Node::new(NodeKind::List { ordered }, items)
    }

    pub fn list_item(children: Vec<Node>) -> Node {
        Node::new(NodeKind::ListItem, children)
    }

    /// An unordered list with one paragraph per item.
    pub fn bullet_list<S: Into<String>>(items: Vec<S>) -> Node {
        Node::list(
            false,
            items
                .into_iter()
                .map(|text| Node::list_item(vec![Node::text_paragraph(text)]))
                .collect(),
        )
    }

    /// A list of terms, each rendered bold and followed by its definition.
    pub fn definition_list<S: Into<String>>(entries: Vec<(S, Node)>) -> Node {
        Node::list(
            false,
            entries
                .into_iter()
                .map(|(term, definition)| {
                    Node::list_item(vec![Node::paragraph(vec![Node::strong(term)]), definition])
                })
                .collect(),
        )
    }
}
