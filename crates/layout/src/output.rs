//! The Layout Tree: the format-independent result of layout.

use crate::diagnostics::Diagnostics;
use crate::elements::{BoxContent, PositionedBox, TextBlock};
use folio_ast::DocumentInfo;
use folio_style::Margins;
use folio_types::{Rect, Size};

/// Why a page was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStart {
    /// The cover page built from the document info.
    Cover,
    First,
    /// Content did not fit on the previous page.
    Overflow,
    /// A page break node.
    Explicit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    pub size: Size,
    pub content_area: Rect,
    pub start: PageStart,
    /// Boxes in paint order.
    pub boxes: Vec<PositionedBox>,
    /// Header, footer and page number boxes in the page margins.
    pub running: Vec<PositionedBox>,
}

impl Page {
    /// All boxes including those nested in table cells, in paint order.
    pub fn all_boxes(&self) -> Vec<&PositionedBox> {
        let mut out = Vec::new();
        for b in &self.boxes {
            b.visit(&mut |inner| out.push(inner));
        }
        out
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.boxes.iter().filter_map(|b| match &b.content {
            BoxContent::Text(block) => Some(block),
            _ => None,
        })
    }
}

/// A heading recorded for document outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub level: u8,
    pub title: String,
    pub page_index: usize,
    /// Absolute y of the heading's top edge.
    pub y: f32,
}

/// Text repeated on every body page, kept as text for backends with native headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunningContent {
    /// Header lines, top to bottom.
    pub header: Vec<String>,
    pub footer: Vec<String>,
    /// Page number template with `{page}` and `{pages}` placeholders.
    pub page_number: Option<String>,
}

impl RunningContent {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.footer.is_empty() && self.page_number.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    pub info: DocumentInfo,
    pub page_size: Size,
    pub margins: Margins,
    pub pages: Vec<Page>,
    pub outline: Vec<OutlineEntry>,
    pub running: RunningContent,
    pub diagnostics: Diagnostics,
}

impl LayoutTree {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when the first page is a cover.
    pub fn has_cover(&self) -> bool {
        self.pages.first().is_some_and(|page| page.start == PageStart::Cover)
    }
}
