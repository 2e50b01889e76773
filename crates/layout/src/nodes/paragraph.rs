use crate::LayoutError;
use crate::algorithms::pagination::Flow;
use crate::diagnostics::Warning;
use crate::elements::{BlockRole, BoxContent, ParagraphFormat, PositionedBox, TextBlock, TextLine};
use crate::engine::LayoutContext;
use crate::output::PageStart;
use crate::resolve::ResolvedNode;
use crate::text::{InlineRun, break_lines};
use folio_ast::NodeKind;
use folio_style::Style;
use folio_types::{NodeId, Rect};

/// Where the first line of a text block landed.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub page_index: usize,
    pub y: f32,
}

pub fn layout_paragraph(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    node: &ResolvedNode<'_>,
    role: BlockRole,
) -> Result<Placement, LayoutError> {
    let runs = inline_runs(node)?;
    Ok(layout_text_block(ctx, flow, &node.id, &runs, &node.style, role))
}

/// The inline children of a paragraph as runs for the line breaker.
pub fn inline_runs<'r>(node: &'r ResolvedNode<'_>) -> Result<Vec<InlineRun<'r>>, LayoutError> {
    node.children
        .iter()
        .map(|run| match run.kind() {
            NodeKind::TextRun { text } => Ok(InlineRun::new(text, &run.style, &run.id)),
            NodeKind::Attachment { file_name, data, text } => Ok(InlineRun {
                attachment: Some((file_name.as_str(), data)),
                ..InlineRun::new(text, &run.style, &run.id)
            }),
            other => Err(LayoutError::UnsupportedNodeKind {
                node_id: run.id.clone(),
                kind: other.name(),
                context: "inside a Paragraph".to_string(),
            }),
        })
        .collect()
}

/// Line-breaks `runs` and places the lines, splitting the block across pages between lines.
pub fn layout_text_block(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    source: &NodeId,
    runs: &[InlineRun<'_>],
    base: &Style,
    role: BlockRole,
) -> Placement {
    let margins = flow.block_margins(base);
    let (x, width) = flow.block_span(&margins);
    let lines = break_lines(
        runs,
        width,
        base,
        source,
        base.text_align,
        &mut ctx.measurer,
        &mut ctx.diagnostics,
    );
    let (base_span, _) = ctx.measurer.span_style(base, source, &mut ctx.diagnostics);
    let format = ParagraphFormat {
        align: base.text_align,
        margin: base.margin,
        line_height: base.line_height,
        base: base_span,
    };

    let mut fragment = Fragment::new(x, width);
    let mut first: Option<Placement> = None;

    for line in lines {
        if fragment.lines.is_empty() {
            let margin_top = if fragment.continued { 0.0 } else { margins.top };
            if !flow.fits(line.height, margin_top) && !flow.at_page_top() {
                flow.break_page(PageStart::Overflow);
            }
            fragment.top = flow.begin_block(margin_top);
        } else if !flow.fits(line.height, 0.0) {
            fragment.emit(flow, source, &role, &format);
            flow.break_page(PageStart::Overflow);
            fragment.top = flow.begin_block(0.0);
        }

        if flow.exceeds_page(line.height) {
            fragment.oversized = true;
            ctx.diagnostics.push(Warning::OversizedContent {
                node_id: source.clone(),
                page_index: flow.page_index(),
                height: line.height,
                available: flow.content_area().height,
            });
        }

        let y = flow.cursor_y();
        first.get_or_insert(Placement {
            page_index: flow.page_index(),
            y,
        });
        let mut spans = line.spans;
        for span in &mut spans {
            span.x += x;
        }
        fragment.lines.push(TextLine {
            rect: Rect::new(x, y, width, line.height),
            baseline: y + line.baseline,
            spans,
            end: line.end,
        });
        flow.advance(line.height);
    }
    fragment.emit(flow, source, &role, &format);
    flow.end_block(margins.bottom);

    first.unwrap_or(Placement {
        page_index: flow.page_index(),
        y: flow.cursor_y(),
    })
}

/// The lines of a block collected for the current page.
struct Fragment {
    x: f32,
    width: f32,
    top: f32,
    lines: Vec<TextLine>,
    continued: bool,
    oversized: bool,
}

impl Fragment {
    fn new(x: f32, width: f32) -> Self {
        Self {
            x,
            width,
            top: 0.0,
            lines: Vec::new(),
            continued: false,
            oversized: false,
        }
    }

    fn emit(&mut self, flow: &mut Flow, source: &NodeId, role: &BlockRole, format: &ParagraphFormat) {
        if self.lines.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.lines);
        let height: f32 = lines.iter().map(|l| l.rect.height).sum();
        let mut positioned = PositionedBox::new(
            Rect::new(self.x, self.top, self.width, height),
            source.clone(),
            BoxContent::Text(TextBlock {
                role: role.clone(),
                format: format.clone(),
                lines,
                continued: self.continued,
            }),
        );
        positioned.oversized = self.oversized;
        flow.place(positioned);
        self.continued = true;
        self.oversized = false;
    }
}
