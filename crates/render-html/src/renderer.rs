use crate::inline::write_pieces;
use crate::markup::Markup;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use folio_ast::DocumentInfo;
use folio_layout::{BlockRole, CoverPart, GridCell, GridRow, ImageBox, LayoutTree, TableGrid, TextBlock};
use folio_render_core::flow::{Block, body_blocks, cover_lines, flow_blocks, merge_fragments, pieces};
use folio_render_core::{OutputFormat, RenderError, Renderer};
use itertools::Itertools;
use std::collections::HashMap;

/// Deepest heading element; section level 1 is `h2`, below the cover's `h1`.
const MAX_HEADING: u8 = 6;

/// The HTML backend. Rebuilds a flowing document from the paginated tree: sections nest
/// under their headings, list items regroup into lists, and captions join their images.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    generator: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            generator: format!("folio {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_head(&self, html: &mut Markup, info: &DocumentInfo) -> Result<(), RenderError> {
        html.start("head", &[])?;
        html.void("meta", &[("charset", "utf-8")])?;
        html.text_element("title", &[], info.title.as_deref().unwrap_or_default())?;
        let created = info.creation_date.map(|date| date.format("%Y-%m-%dT%H:%M:%S").to_string());
        let generator = info.creator.as_deref().unwrap_or(&self.generator);
        let metas = [
            ("description", info.subject.as_deref()),
            ("author", info.author.as_deref()),
            ("generator", Some(generator)),
            ("created", created.as_deref()),
        ];
        for (name, content) in metas {
            if let Some(content) = content {
                html.void("meta", &[("name", name), ("content", content)])?;
            }
        }
        html.void(
            "meta",
            &[("name", "viewport"), ("content", "width=device-width, initial-scale=1")],
        )?;
        html.end("head")
    }
}

impl Renderer for HtmlRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn render(&self, tree: &LayoutTree) -> Result<Vec<u8>, RenderError> {
        let mut html = Markup::new()?;
        let lang = tree.info.language.as_deref().unwrap_or("en");
        html.start("html", &[("lang", lang)])?;
        self.write_head(&mut html, &tree.info)?;
        html.start("body", &[])?;
        html.start("article", &[])?;

        write_cover(&mut html, tree)?;
        let blocks = body_blocks(tree);
        log::debug!("Writing {} body blocks as HTML", blocks.len());
        let mut body = BodyWriter::new(&mut html);
        body.write_blocks(&blocks)?;
        body.close_all()?;

        html.end("article")?;
        html.end("body")?;
        html.end("html")?;
        Ok(html.finish())
    }
}

/// `h1` for the title, then subject, author and place with date as one subtitle paragraph.
fn write_cover(html: &mut Markup, tree: &LayoutTree) -> Result<(), RenderError> {
    let lines = cover_lines(tree);
    if let Some((_, title)) = lines.iter().find(|(part, _)| *part == CoverPart::Title) {
        html.text_element("h1", &[], title)?;
    }
    let details: Vec<&str> = lines
        .iter()
        .filter(|(part, _)| *part != CoverPart::Title)
        .map(|(_, text)| text.as_str())
        .collect();
    if details.is_empty() {
        return Ok(());
    }
    html.start("p", &[("class", "subtitle")])?;
    for (i, text) in details.iter().enumerate() {
        if i > 0 {
            html.void("br", &[])?;
        }
        html.text_element("span", &[], text)?;
    }
    html.end("p")
}

/// An open list and whether its last item is still open.
#[derive(Debug, Clone, Copy)]
struct OpenList {
    level: u8,
    ordered: bool,
    item_open: bool,
}

impl OpenList {
    fn tag(&self) -> &'static str {
        if self.ordered { "ol" } else { "ul" }
    }
}

struct BodyWriter<'h> {
    html: &'h mut Markup,
    /// Levels of the open `section` elements, outermost first.
    sections: Vec<u8>,
    lists: Vec<OpenList>,
}

impl<'h> BodyWriter<'h> {
    fn new(html: &'h mut Markup) -> Self {
        Self {
            html,
            sections: Vec::new(),
            lists: Vec::new(),
        }
    }

    fn write_blocks(&mut self, blocks: &[Block<'_>]) -> Result<(), RenderError> {
        let mut blocks = blocks.iter().peekable();
        while let Some(block) = blocks.next() {
            match block {
                Block::Paragraph { fragments, .. } => self.write_paragraph(fragments)?,
                Block::Image { image, .. } => {
                    self.close_lists()?;
                    let caption = blocks.next_if(|next| is_caption(next));
                    let caption = match caption {
                        Some(Block::Paragraph { fragments, .. }) => Some(fragments.as_slice()),
                        _ => None,
                    };
                    self.write_figure(image, caption)?;
                }
                Block::Table { grids, .. } => {
                    self.close_lists()?;
                    self.write_table(grids)?;
                }
                Block::PageBreak => {
                    self.close_lists()?;
                    self.html.text_element("div", &[("class", "page-break")], "")?;
                }
            }
        }
        self.close_lists()
    }

    fn write_paragraph(&mut self, fragments: &[&TextBlock]) -> Result<(), RenderError> {
        let Some(first) = fragments.first() else {
            return Ok(());
        };
        match &first.role {
            BlockRole::Heading(level) => {
                self.close_lists()?;
                self.open_section(*level)?;
                let tag = format!("h{}", (level + 1).min(MAX_HEADING));
                self.write_inline(&tag, fragments)
            }
            BlockRole::ListItem { marker, level, .. } => {
                let ordered = marker.starts_with(|c: char| c.is_ascii_digit());
                self.open_item(*level, ordered, first.continued)?;
                self.write_inline("p", fragments)
            }
            BlockRole::Body | BlockRole::Caption | BlockRole::Cover(_) | BlockRole::Running(_) => {
                self.close_lists()?;
                self.write_inline("p", fragments)
            }
        }
    }

    fn write_inline(&mut self, tag: &str, fragments: &[&TextBlock]) -> Result<(), RenderError> {
        let base = match fragments.first() {
            Some(first) => &first.format.base,
            None => return Ok(()),
        };
        self.html.start(tag, &[])?;
        write_pieces(self.html, &pieces(fragments), base)?;
        self.html.end(tag)
    }

    /// Closes sections at `level` or deeper and opens one for a heading at `level`.
    fn open_section(&mut self, level: u8) -> Result<(), RenderError> {
        while self.sections.last().is_some_and(|open| *open >= level) {
            self.sections.pop();
            self.html.end("section")?;
        }
        self.html.start("section", &[])?;
        self.sections.push(level);
        Ok(())
    }

    /// Opens an `li` at `level`, nesting a new list inside the open item when deeper.
    fn open_item(&mut self, level: u8, ordered: bool, continued: bool) -> Result<(), RenderError> {
        while self.lists.last().is_some_and(|list| list.level > level) {
            self.close_list()?;
        }
        if continued && self.lists.last().is_some_and(|list| list.level == level && list.item_open) {
            return Ok(());
        }
        if let Some(list) = self.lists.last_mut().filter(|list| list.level == level) {
            if list.item_open {
                list.item_open = false;
                self.html.end("li")?;
            }
            if list.ordered != ordered {
                self.close_list()?;
            }
        }
        if self.lists.last().is_none_or(|list| list.level < level) {
            let list = OpenList {
                level,
                ordered,
                item_open: false,
            };
            self.html.start(list.tag(), &[])?;
            self.lists.push(list);
        }
        self.html.start("li", &[])?;
        if let Some(list) = self.lists.last_mut() {
            list.item_open = true;
        }
        Ok(())
    }

    fn close_list(&mut self) -> Result<(), RenderError> {
        if let Some(list) = self.lists.pop() {
            if list.item_open {
                self.html.end("li")?;
            }
            self.html.end(list.tag())?;
        }
        Ok(())
    }

    fn close_lists(&mut self) -> Result<(), RenderError> {
        while !self.lists.is_empty() {
            self.close_list()?;
        }
        Ok(())
    }

    fn close_all(&mut self) -> Result<(), RenderError> {
        self.close_lists()?;
        while self.sections.pop().is_some() {
            self.html.end("section")?;
        }
        Ok(())
    }

    fn write_figure(&mut self, image: &ImageBox, caption: Option<&[&TextBlock]>) -> Result<(), RenderError> {
        let src = format!("data:{};base64,{}", image.kind.mime_type(), STANDARD.encode(image.data.as_bytes()));
        let alt = caption
            .map(|fragments| fragments.iter().map(|f| f.text()).collect::<String>())
            .unwrap_or_default();
        self.html.start("figure", &[])?;
        self.html.void("img", &[("src", src.as_str()), ("alt", alt.as_str())])?;
        if let Some(fragments) = caption {
            self.write_inline("figcaption", fragments)?;
        }
        self.html.end("figure")
    }

    fn write_table(&mut self, grids: &[&TableGrid]) -> Result<(), RenderError> {
        let rows: Vec<&GridRow> = grids
            .iter()
            .flat_map(|grid| grid.rows.iter())
            .sorted_by_key(|row| row.index)
            .dedup_by(|a, b| a.index == b.index)
            .collect();
        let mut cells: HashMap<usize, Vec<&GridCell>> = HashMap::new();
        for cell in grids.iter().flat_map(|grid| grid.cells.iter()) {
            cells.entry(cell.row).or_default().push(cell);
        }
        let (head, body): (Vec<&GridRow>, Vec<&GridRow>) = rows.into_iter().partition(|row| row.header);

        self.html.start("table", &[])?;
        for (group, rows, cell_tag) in [("thead", &head, "th"), ("tbody", &body, "td")] {
            if rows.is_empty() {
                continue;
            }
            self.html.start(group, &[])?;
            for row in rows.iter() {
                self.html.start("tr", &[])?;
                let mut row_cells = cells.get(&row.index).cloned().unwrap_or_default();
                row_cells.sort_by_key(|cell| cell.col);
                row_cells.dedup_by_key(|cell| cell.col);
                for cell in row_cells {
                    self.write_cell(cell, cell_tag)?;
                }
                self.html.end("tr")?;
            }
            self.html.end(group)?;
        }
        self.html.end("table")
    }

    fn write_cell(&mut self, cell: &GridCell, tag: &str) -> Result<(), RenderError> {
        let col_span = cell.col_span.to_string();
        let row_span = cell.row_span.to_string();
        let mut attrs = Vec::new();
        if cell.col_span > 1 {
            attrs.push(("colspan", col_span.as_str()));
        }
        if cell.row_span > 1 {
            attrs.push(("rowspan", row_span.as_str()));
        }
        self.html.start(tag, &attrs)?;
        let blocks: Vec<Block<'_>> = flow_blocks(&cell.content).coalesce(merge_fragments).collect();
        let mut inner = BodyWriter::new(self.html);
        inner.write_blocks(&blocks)?;
        inner.close_all()?;
        self.html.end(tag)
    }
}

fn is_caption(block: &Block<'_>) -> bool {
    matches!(block, Block::Paragraph { fragments, .. }
        if fragments.first().is_some_and(|f| f.role == BlockRole::Caption))
}
