//! Positioned boxes and their content payloads.
//!
//! Every box is in absolute page coordinates (points, origin top-left). Boxes own their
//! data outright; nothing here borrows from the source tree.

use folio_ast::{BinaryData, ImageData};
use folio_style::{Border, BorderStyle, Margins, TextAlign};
use folio_traits::{FontSpec, ImageKind};
use folio_types::{Color, NodeId, Rect, Size};

/// A single drawable item placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedBox {
    pub rect: Rect,
    /// The node this box was laid out from.
    pub source: NodeId,
    pub content: BoxContent,
    /// Set when the box is taller than a page and was placed anyway.
    pub oversized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    Text(TextBlock),
    Image(ImageBox),
    Table(TableGrid),
    Rect(RectPaint),
}

impl PositionedBox {
    pub fn new(rect: Rect, source: NodeId, content: BoxContent) -> Self {
        Self {
            rect,
            source,
            content,
            oversized: false,
        }
    }

    /// Moves the box and everything inside it.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.rect = self.rect.translate(dx, dy);
        match &mut self.content {
            BoxContent::Text(block) => {
                for line in &mut block.lines {
                    line.rect = line.rect.translate(dx, dy);
                    line.baseline += dy;
                    for span in &mut line.spans {
                        span.x += dx;
                    }
                }
            }
            BoxContent::Table(grid) => {
                for row in &mut grid.rows {
                    row.y += dy;
                }
                for cell in &mut grid.cells {
                    cell.rect = cell.rect.translate(dx, dy);
                    for child in &mut cell.content {
                        child.translate(dx, dy);
                    }
                }
            }
            BoxContent::Image(_) | BoxContent::Rect(_) => {}
        }
    }

    /// Flags this box and everything nested in it as exceeding the page.
    pub fn mark_oversized(&mut self) {
        self.oversized = true;
        if let BoxContent::Table(grid) = &mut self.content {
            for cell in &mut grid.cells {
                for child in &mut cell.content {
                    child.mark_oversized();
                }
            }
        }
    }

    /// Visits this box and, for tables, every box nested in its cells (pre-order).
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a PositionedBox)) {
        f(self);
        if let BoxContent::Table(grid) = &self.content {
            for cell in &grid.cells {
                for child in &cell.content {
                    child.visit(f);
                }
            }
        }
    }
}

/// Font, size and color of a run of text as it will be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanStyle {
    /// The font actually used, after any fallback.
    pub font: FontSpec,
    pub size: f32,
    pub color: Color,
    /// Set on the text of an inline attachment.
    pub attachment: Option<AttachmentLink>,
}

impl SpanStyle {
    /// The same look without any attachment.
    pub fn plain(&self) -> SpanStyle {
        SpanStyle {
            attachment: None,
            ..self.clone()
        }
    }
}

/// An embedded file linked from a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentLink {
    pub file_name: String,
    pub data: BinaryData,
}

/// A horizontally positioned piece of a line sharing one [`SpanStyle`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// May start with a single space separating it from the previous span.
    pub text: String,
    pub x: f32,
    pub width: f32,
    pub style: SpanStyle,
}

/// How a line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    /// Wrapped at a space.
    Soft,
    /// Broken by an explicit newline.
    Hard,
    /// A word too wide for the line was cut.
    Split,
    /// The last line of the paragraph.
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub rect: Rect,
    /// Absolute y of the baseline.
    pub baseline: f32,
    pub spans: Vec<TextSpan>,
    pub end: LineEnd,
}

/// What a text block represents in the document structure.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockRole {
    Body,
    Heading(u8),
    ListItem { marker: String, level: u8, indent: f32 },
    Caption,
    Cover(CoverPart),
    Running(RunningPart),
}

/// A line of the cover page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverPart {
    Title,
    Subject,
    Author,
    PlaceAndDate,
}

/// Where a running box sits in the page margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningPart {
    Header,
    Footer,
    PageNumber,
}

/// Paragraph-level formatting, kept so flow-based backends can rebuild paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphFormat {
    pub align: TextAlign,
    pub margin: Margins,
    /// Multiplier of the font size.
    pub line_height: f32,
    /// The paragraph's own font, used for empty paragraphs.
    pub base: SpanStyle,
}

/// A paragraph, or the part of one that landed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub role: BlockRole,
    pub format: ParagraphFormat,
    pub lines: Vec<TextLine>,
    /// This fragment continues a paragraph begun on an earlier page.
    pub continued: bool,
}

impl TextBlock {
    /// The block's text with soft wraps rejoined and hard breaks as `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            for span in &line.spans {
                out.push_str(&span.text);
            }
            match line.end {
                LineEnd::Soft => out.push(' '),
                LineEnd::Hard => out.push('\n'),
                LineEnd::Split | LineEnd::Last => {}
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageBox {
    pub data: ImageData,
    pub kind: ImageKind,
    /// Size before scaling; the box rect holds the placed size.
    pub intrinsic: Size,
}

/// Cell decoration, copied from the cell's resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub background: Option<Color>,
    pub border: Border,
    pub padding: Margins,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Index of the row within its table.
    pub index: usize,
    pub y: f32,
    pub height: f32,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub source: NodeId,
    /// Index of the starting row within its table.
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub rect: Rect,
    pub decoration: Decoration,
    pub content: Vec<PositionedBox>,
}

/// A table, or the rows of one that landed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub column_widths: Vec<f32>,
    pub rows: Vec<GridRow>,
    pub cells: Vec<GridCell>,
    /// This fragment continues a table begun on an earlier page.
    pub continued: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
    pub style: BorderStyle,
}

/// A filled and/or stroked rectangle. The stroke lies inside the box rect.
#[derive(Debug, Clone, PartialEq)]
pub struct RectPaint {
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}
