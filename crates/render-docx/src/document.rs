//! `word/document.xml`.

use crate::media::MediaRegistry;
use crate::package::Relationships;
use crate::styles::{StyleRegistry, W_NS, jc, write_run_properties, write_spacing};
use crate::units::{eighth_points, emu, twips};
use crate::xml::XmlBuilder;
use folio_layout::{
    BlockRole, Decoration, GridCell, GridRow, ImageBox, LayoutTree, TableGrid,
    TextBlock,
};
use folio_render_core::RenderError;
use folio_render_core::flow::{Block, Piece, body_blocks, cover_blocks, flow_blocks, merge_fragments, pieces};
use folio_style::{Border, BorderStyle};
use folio_types::Rect;
use itertools::Itertools;
use std::collections::HashMap;

const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Tolerance, in points, for indents and alignment offsets.
const SLACK: f32 = 0.5;
/// Distance of the header and footer from the page edge.
const GAP_TO_RUNNING: f32 = 24.0;

/// The horizontal extent content is laid out in: the page body or a cell interior.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f32,
    width: f32,
}

pub struct DocumentWriter<'r> {
    xml: XmlBuilder,
    styles: &'r mut StyleRegistry,
    media: &'r mut MediaRegistry,
    rels: &'r mut Relationships,
    drawings: u32,
    header_rel: Option<String>,
    footer_rel: Option<String>,
}

impl<'r> DocumentWriter<'r> {
    pub fn new(
        styles: &'r mut StyleRegistry,
        media: &'r mut MediaRegistry,
        rels: &'r mut Relationships,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            xml: XmlBuilder::new()?,
            styles,
            media,
            rels,
            drawings: 0,
            header_rel: None,
            footer_rel: None,
        })
    }

    /// Relationship ids of the header and footer parts the body section shows.
    pub fn with_running(mut self, header_rel: Option<String>, footer_rel: Option<String>) -> Self {
        self.header_rel = header_rel;
        self.footer_rel = footer_rel;
        self
    }

    pub fn write(mut self, tree: &LayoutTree) -> Result<Vec<u8>, RenderError> {
        self.xml.start(
            "w:document",
            &[
                ("xmlns:w", W_NS),
                ("xmlns:r", R_NS),
                ("xmlns:wp", WP_NS),
                ("xmlns:a", A_NS),
                ("xmlns:pic", PIC_NS),
            ],
        )?;
        self.xml.start("w:body", &[])?;

        let body = Frame {
            left: tree.margins.left,
            width: tree.page_size.width - tree.margins.horizontal(),
        };
        let cover = cover_blocks(tree);
        if let Some(first) = cover.first() {
            // The cover is its own section, without header or footer, whose top margin
            // drops the title to where the paginated cover sets it.
            let top = block_top(first).unwrap_or(tree.margins.top);
            for block in &cover {
                self.write_block(block, body)?;
            }
            self.xml.start("w:p", &[])?;
            self.xml.start("w:pPr", &[])?;
            self.write_section_properties(tree, top, false)?;
            self.xml.end("w:pPr")?;
            self.xml.end("w:p")?;
        }
        let blocks = body_blocks(tree);
        log::debug!("Writing {} cover and {} body blocks", cover.len(), blocks.len());
        for block in &blocks {
            self.write_block(block, body)?;
        }

        self.write_section_properties(tree, tree.margins.top, true)?;
        self.xml.end("w:body")?;
        self.xml.end("w:document")?;
        Ok(self.xml.finish())
    }

    fn write_block(&mut self, block: &Block<'_>, frame: Frame) -> Result<(), RenderError> {
        match block {
            Block::Paragraph { rect, fragments, .. } => self.write_paragraph(fragments, *rect, frame),
            Block::Image { rect, image } => self.write_image(image, *rect, frame),
            Block::Table { rect, grids, .. } => self.write_table(grids, *rect, frame),
            Block::PageBreak => self.write_page_break(),
        }
    }

    fn write_paragraph(&mut self, fragments: &[&TextBlock], rect: Rect, frame: Frame) -> Result<(), RenderError> {
        let Some(first) = fragments.first() else {
            return Ok(());
        };
        let (style_id, defined) = self.styles.style_for(&first.role, &first.format);

        self.xml.start("w:p", &[])?;
        self.xml.start("w:pPr", &[])?;
        self.xml.val("w:pStyle", &style_id)?;
        if defined.margin != first.format.margin || defined.line_height != first.format.line_height {
            write_spacing(&mut self.xml, &first.format)?;
        }
        let indent = rect.x - frame.left;
        match &first.role {
            BlockRole::ListItem { indent: hanging, .. } => {
                let left = twips(indent).to_string();
                let hanging = twips(*hanging).to_string();
                self.xml.empty("w:ind", &[("w:left", left.as_str()), ("w:hanging", hanging.as_str())])?;
            }
            _ if indent > SLACK => {
                let left = twips(indent).to_string();
                self.xml.empty("w:ind", &[("w:left", left.as_str())])?;
            }
            _ => {}
        }
        if defined.align != first.format.align {
            self.xml.val("w:jc", jc(first.format.align))?;
        }
        self.xml.end("w:pPr")?;

        let base = &defined.base;
        if let (BlockRole::ListItem { marker, .. }, false) = (&first.role, first.continued) {
            self.xml.start("w:r", &[])?;
            write_run_properties(&mut self.xml, &first.format.base, Some(base))?;
            self.write_text(marker)?;
            self.xml.empty("w:tab", &[])?;
            self.xml.end("w:r")?;
        }
        for piece in pieces(fragments) {
            self.xml.start("w:r", &[])?;
            match piece {
                Piece::Text(style, text) => {
                    write_run_properties(&mut self.xml, style, Some(base))?;
                    self.write_text(&text)?;
                }
                Piece::Break => self.xml.empty("w:br", &[])?,
            }
            self.xml.end("w:r")?;
        }
        self.xml.end("w:p")
    }

    fn write_text(&mut self, text: &str) -> Result<(), RenderError> {
        self.xml.text_element("w:t", &[("xml:space", "preserve")], text)
    }

    fn write_page_break(&mut self) -> Result<(), RenderError> {
        self.xml.start("w:p", &[])?;
        self.xml.start("w:r", &[])?;
        self.xml.empty("w:br", &[("w:type", "page")])?;
        self.xml.end("w:r")?;
        self.xml.end("w:p")
    }

    fn write_image(&mut self, image: &ImageBox, rect: Rect, frame: Frame) -> Result<(), RenderError> {
        let (rel_id, file) = {
            let item = self.media.register(image, self.rels);
            let file = item.part_name.rsplit('/').next().unwrap_or_default().to_string();
            (item.rel_id.clone(), file)
        };
        self.drawings += 1;
        let id = self.drawings.to_string();
        let name = format!("Picture {}", id);
        let cx = emu(rect.width).to_string();
        let cy = emu(rect.height).to_string();

        self.xml.start("w:p", &[])?;
        let offset = rect.x - frame.left;
        let free = frame.width - rect.width;
        let align = if free <= SLACK || offset <= SLACK {
            None
        } else if (offset - free / 2.0).abs() <= SLACK {
            Some("center")
        } else if (offset - free).abs() <= SLACK {
            Some("right")
        } else {
            None
        };
        if let Some(align) = align {
            self.xml.start("w:pPr", &[])?;
            self.xml.val("w:jc", align)?;
            self.xml.end("w:pPr")?;
        }
        self.xml.start("w:r", &[])?;
        self.xml.start("w:drawing", &[])?;
        self.xml.start(
            "wp:inline",
            &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
        )?;
        self.xml.empty("wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        self.xml.empty("wp:docPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        self.xml.start("a:graphic", &[])?;
        self.xml.start("a:graphicData", &[("uri", PIC_NS)])?;
        self.xml.start("pic:pic", &[])?;
        self.xml.start("pic:nvPicPr", &[])?;
        self.xml.empty("pic:cNvPr", &[("id", id.as_str()), ("name", file.as_str())])?;
        self.xml.empty("pic:cNvPicPr", &[])?;
        self.xml.end("pic:nvPicPr")?;
        self.xml.start("pic:blipFill", &[])?;
        self.xml.empty("a:blip", &[("r:embed", rel_id.as_str())])?;
        self.xml.start("a:stretch", &[])?;
        self.xml.empty("a:fillRect", &[])?;
        self.xml.end("a:stretch")?;
        self.xml.end("pic:blipFill")?;
        self.xml.start("pic:spPr", &[])?;
        self.xml.start("a:xfrm", &[])?;
        self.xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
        self.xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        self.xml.end("a:xfrm")?;
        self.xml.start("a:prstGeom", &[("prst", "rect")])?;
        self.xml.empty("a:avLst", &[])?;
        self.xml.end("a:prstGeom")?;
        self.xml.end("pic:spPr")?;
        self.xml.end("pic:pic")?;
        self.xml.end("a:graphicData")?;
        self.xml.end("a:graphic")?;
        self.xml.end("wp:inline")?;
        self.xml.end("w:drawing")?;
        self.xml.end("w:r")?;
        self.xml.end("w:p")
    }

    fn write_table(&mut self, grids: &[&TableGrid], rect: Rect, frame: Frame) -> Result<(), RenderError> {
        let Some(first) = grids.first() else {
            return Ok(());
        };
        let columns = &first.column_widths;
        let rows: Vec<&GridRow> = grids
            .iter()
            .flat_map(|grid| grid.rows.iter())
            .sorted_by_key(|row| row.index)
            .dedup_by(|a, b| a.index == b.index)
            .collect();
        let cells: Vec<&GridCell> = grids.iter().flat_map(|grid| grid.cells.iter()).collect();
        let origins: HashMap<(usize, usize), &GridCell> =
            cells.iter().map(|cell| ((cell.row, cell.col), *cell)).collect();
        let mut covered: HashMap<(usize, usize), &GridCell> = HashMap::new();
        for cell in &cells {
            for row in cell.row + 1..cell.row + cell.row_span {
                covered.insert((row, cell.col), *cell);
            }
        }

        self.xml.start("w:tbl", &[])?;
        self.xml.start("w:tblPr", &[])?;
        let total = twips(columns.iter().sum()).to_string();
        self.xml.empty("w:tblW", &[("w:w", total.as_str()), ("w:type", "dxa")])?;
        let indent = rect.x - frame.left;
        if indent > SLACK {
            let indent = twips(indent).to_string();
            self.xml.empty("w:tblInd", &[("w:w", indent.as_str()), ("w:type", "dxa")])?;
        }
        self.xml.empty("w:tblLayout", &[("w:type", "fixed")])?;
        self.xml.start("w:tblCellMar", &[])?;
        for side in ["w:top", "w:left", "w:bottom", "w:right"] {
            self.xml.empty(side, &[("w:w", "0"), ("w:type", "dxa")])?;
        }
        self.xml.end("w:tblCellMar")?;
        self.xml.end("w:tblPr")?;

        self.xml.start("w:tblGrid", &[])?;
        for width in columns {
            let width = twips(*width).to_string();
            self.xml.empty("w:gridCol", &[("w:w", width.as_str())])?;
        }
        self.xml.end("w:tblGrid")?;

        for row in rows {
            self.xml.start("w:tr", &[])?;
            self.xml.start("w:trPr", &[])?;
            self.xml.empty("w:cantSplit", &[])?;
            let height = twips(row.height).to_string();
            self.xml.empty("w:trHeight", &[("w:val", height.as_str()), ("w:hRule", "atLeast")])?;
            if row.header {
                self.xml.empty("w:tblHeader", &[])?;
            }
            self.xml.end("w:trPr")?;

            let mut col = 0;
            while col < columns.len() {
                if let Some(cell) = origins.get(&(row.index, col)) {
                    self.write_cell(cell, columns, Merge::of(cell))?;
                    col += cell.col_span.max(1);
                } else if let Some(cell) = covered.get(&(row.index, col)) {
                    self.write_cell(cell, columns, Merge::Continue)?;
                    col += cell.col_span.max(1);
                } else {
                    self.write_empty_cell(columns[col])?;
                    col += 1;
                }
            }
            self.xml.end("w:tr")?;
        }
        self.xml.end("w:tbl")
    }

    fn write_cell(&mut self, cell: &GridCell, columns: &[f32], merge: Merge) -> Result<(), RenderError> {
        let end = (cell.col + cell.col_span).min(columns.len());
        let width: f32 = columns[cell.col.min(end)..end].iter().sum();

        self.xml.start("w:tc", &[])?;
        self.xml.start("w:tcPr", &[])?;
        let width = twips(width).to_string();
        self.xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
        if cell.col_span > 1 {
            self.xml.val("w:gridSpan", &cell.col_span.to_string())?;
        }
        match merge {
            Merge::Restart => self.xml.val("w:vMerge", "restart")?,
            Merge::Continue => self.xml.empty("w:vMerge", &[])?,
            Merge::None => {}
        }
        self.write_cell_decoration(&cell.decoration)?;
        self.xml.end("w:tcPr")?;

        let mut wrote_paragraph_last = false;
        if merge != Merge::Continue {
            let decoration = &cell.decoration;
            let inset = decoration.border.effective_width();
            let frame = Frame {
                left: cell.rect.x + inset + decoration.padding.left,
                width: cell.rect.width - 2.0 * inset - decoration.padding.horizontal(),
            };
            let blocks: Vec<Block<'_>> = flow_blocks(&cell.content).coalesce(merge_fragments).collect();
            for block in &blocks {
                self.write_block(block, frame)?;
            }
            wrote_paragraph_last = matches!(blocks.last(), Some(Block::Paragraph { .. } | Block::Image { .. }));
        }
        if !wrote_paragraph_last {
            self.xml.empty("w:p", &[])?;
        }
        self.xml.end("w:tc")
    }

    fn write_empty_cell(&mut self, width: f32) -> Result<(), RenderError> {
        let width = twips(width).to_string();
        self.xml.start("w:tc", &[])?;
        self.xml.start("w:tcPr", &[])?;
        self.xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
        self.xml.end("w:tcPr")?;
        self.xml.empty("w:p", &[])?;
        self.xml.end("w:tc")
    }

    fn write_cell_decoration(&mut self, decoration: &Decoration) -> Result<(), RenderError> {
        self.xml.start("w:tcBorders", &[])?;
        for side in ["w:top", "w:left", "w:bottom", "w:right"] {
            self.write_border(side, &decoration.border)?;
        }
        self.xml.end("w:tcBorders")?;
        if let Some(background) = decoration.background {
            let fill = background.to_hex();
            self.xml.empty(
                "w:shd",
                &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill.as_str())],
            )?;
        }
        let padding = &decoration.padding;
        self.xml.start("w:tcMar", &[])?;
        for (side, value) in [
            ("w:top", padding.top),
            ("w:left", padding.left),
            ("w:bottom", padding.bottom),
            ("w:right", padding.right),
        ] {
            let value = twips(value).to_string();
            self.xml.empty(side, &[("w:w", value.as_str()), ("w:type", "dxa")])?;
        }
        self.xml.end("w:tcMar")
    }

    fn write_border(&mut self, side: &str, border: &Border) -> Result<(), RenderError> {
        if !border.is_visible() {
            return self.xml.val(side, "nil");
        }
        let kind = match border.style {
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
            BorderStyle::Solid | BorderStyle::None => "single",
        };
        let size = eighth_points(border.width).to_string();
        let color = border.color.to_hex();
        self.xml.empty(
            side,
            &[
                ("w:val", kind),
                ("w:sz", size.as_str()),
                ("w:space", "0"),
                ("w:color", color.as_str()),
            ],
        )
    }

    /// `w:sectPr` for a section whose content starts `top` points down the page. Only a
    /// body section shows the running header and footer.
    fn write_section_properties(&mut self, tree: &LayoutTree, top: f32, body: bool) -> Result<(), RenderError> {
        let width = twips(tree.page_size.width).to_string();
        let height = twips(tree.page_size.height).to_string();
        let margins = &tree.margins;
        let [top, right, bottom, left] =
            [top, margins.right, margins.bottom, margins.left].map(|m| twips(m).to_string());
        let running = if body {
            [("w:headerReference", &self.header_rel), ("w:footerReference", &self.footer_rel)]
                .into_iter()
                .filter_map(|(element, rel)| rel.clone().map(|rel| (element, rel)))
                .collect()
        } else {
            Vec::new()
        };
        let edge = twips(GAP_TO_RUNNING).to_string();
        let [header, footer] = [&self.header_rel, &self.footer_rel].map(|rel| match rel {
            Some(_) if body => edge.as_str(),
            _ => "0",
        });

        self.xml.start("w:sectPr", &[])?;
        for (element, rel) in &running {
            self.xml.empty(element, &[("w:type", "default"), ("r:id", rel.as_str())])?;
        }
        let mut size = vec![("w:w", width.as_str()), ("w:h", height.as_str())];
        if tree.page_size.width > tree.page_size.height {
            size.push(("w:orient", "landscape"));
        }
        self.xml.empty("w:pgSz", &size)?;
        self.xml.empty(
            "w:pgMar",
            &[
                ("w:top", top.as_str()),
                ("w:right", right.as_str()),
                ("w:bottom", bottom.as_str()),
                ("w:left", left.as_str()),
                ("w:header", header),
                ("w:footer", footer),
                ("w:gutter", "0"),
            ],
        )?;
        self.xml.end("w:sectPr")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    None,
    Restart,
    Continue,
}

impl Merge {
    fn of(cell: &GridCell) -> Merge {
        if cell.row_span > 1 { Merge::Restart } else { Merge::None }
    }
}

fn block_top(block: &Block<'_>) -> Option<f32> {
    match block {
        Block::Paragraph { rect, .. } | Block::Image { rect, .. } | Block::Table { rect, .. } => Some(rect.y),
        Block::PageBreak => None,
    }
}
