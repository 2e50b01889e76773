//! Page content streams.

use crate::attachments::{FileAnnotation, block_annotations};
use crate::fonts::{FontRegistry, to_win_ansi};
use crate::images::ImageRegistry;
use crate::writer::PdfWriter;
use folio_layout::{
    BlockRole, BoxContent, ImageBox, PositionedBox, RectPaint, SpanStyle, TableGrid, TextBlock,
};
use folio_render_core::utils::flip_y;
use folio_style::BorderStyle;
use folio_types::{Color, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use std::io::{Seek, Write};

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font_name: String,
    font_size: f32,
    fill_color: Option<Color>,
}

pub struct PageContext<'a, W: Write + Seek> {
    page_height: f32,
    content: Content,
    state: PageRenderState,
    writer: &'a mut PdfWriter<W>,
    fonts: &'a mut FontRegistry,
    images: &'a ImageRegistry,
    annotations: Vec<FileAnnotation>,
}

impl<'a, W: Write + Seek> PageContext<'a, W> {
    pub fn new(
        page_height: f32,
        writer: &'a mut PdfWriter<W>,
        fonts: &'a mut FontRegistry,
        images: &'a ImageRegistry,
    ) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
            writer,
            fonts,
            images,
            annotations: Vec::new(),
        }
    }

    /// The content stream and the attachment annotations found while drawing.
    pub fn finish(self) -> (Content, Vec<FileAnnotation>) {
        (self.content, self.annotations)
    }

    pub fn draw_box(&mut self, el: &PositionedBox) {
        match &el.content {
            BoxContent::Text(block) => self.draw_text_block(block, &el.rect),
            BoxContent::Image(image) => self.draw_image(image, &el.rect),
            BoxContent::Table(grid) => self.draw_table(grid),
            BoxContent::Rect(paint) => self.draw_rect(paint, &el.rect),
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn set_font(&mut self, style: &SpanStyle) {
        let name = self.fonts.resource_name(self.writer, &style.font, style.size);
        if self.state.font_name != name || self.state.font_size != style.size {
            self.push("Tf", vec![Object::Name(name.as_bytes().to_vec()), style.size.into()]);
            self.state.font_name = name;
            self.state.font_size = style.size;
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            let (r, g, b) = color.to_unit_rgb();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill_color = Some(color);
        }
    }

    fn show_text(&mut self, text: &str, x: f32, baseline: f32, style: &SpanStyle) {
        self.push("BT", vec![]);
        self.set_font(style);
        self.set_fill_color(style.color);
        let pdf_y = flip_y(baseline, self.page_height);
        self.push("Td", vec![x.into(), pdf_y.into()]);
        self.push("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]);
        self.push("ET", vec![]);
    }

    fn draw_text_block(&mut self, block: &TextBlock, rect: &Rect) {
        if let (BlockRole::ListItem { marker, indent, .. }, false) = (&block.role, block.continued) {
            if let Some(first) = block.lines.first() {
                self.show_text(marker, rect.x - indent, first.baseline, &block.format.base);
            }
        }
        for line in &block.lines {
            for span in &line.spans {
                if span.text.trim().is_empty() {
                    continue;
                }
                self.show_text(&span.text, span.x, line.baseline, &span.style);
            }
        }
        self.annotations.extend(block_annotations(block));
    }

    fn draw_image(&mut self, image: &ImageBox, rect: &Rect) {
        let Some(name) = self.images.name_for(&image.data) else {
            log::warn!("Image without an encoded XObject skipped");
            return;
        };
        let name = name.as_bytes().to_vec();
        let y = flip_y(rect.y + rect.height, self.page_height);
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![
                rect.width.into(),
                0.into(),
                0.into(),
                rect.height.into(),
                rect.x.into(),
                y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(name)]);
        self.push("Q", vec![]);
    }

    fn draw_table(&mut self, grid: &TableGrid) {
        for cell in &grid.cells {
            for inner in &cell.content {
                self.draw_box(inner);
            }
        }
    }

    /// Strokes lie inside the rectangle.
    fn draw_rect(&mut self, paint: &RectPaint, rect: &Rect) {
        let y = flip_y(rect.y + rect.height, self.page_height);
        if let Some(fill) = paint.fill {
            self.set_fill_color(fill);
            self.push("re", vec![rect.x.into(), y.into(), rect.width.into(), rect.height.into()]);
            self.push("f", vec![]);
        }
        let Some(stroke) = paint.stroke else {
            return;
        };
        let inset = stroke.width / 2.0;
        let (r, g, b) = stroke.color.to_unit_rgb();
        self.push("q", vec![]);
        self.push("w", vec![stroke.width.into()]);
        self.push("RG", vec![r.into(), g.into(), b.into()]);
        match stroke.style {
            BorderStyle::Dashed => self.push("d", vec![vec![Object::Integer(3), Object::Integer(2)].into(), 0.into()]),
            BorderStyle::Dotted => self.push("d", vec![vec![Object::Integer(1), Object::Integer(2)].into(), 0.into()]),
            _ => {}
        }
        self.push(
            "re",
            vec![
                (rect.x + inset).into(),
                (y + inset).into(),
                (rect.width - stroke.width).max(0.0).into(),
                (rect.height - stroke.width).max(0.0).into(),
            ],
        );
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }
}
