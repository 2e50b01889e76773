use crate::algorithms::pagination::Flow;
use crate::elements::BlockRole;
use crate::engine::LayoutContext;
use crate::nodes::paragraph::layout_text_block;
use crate::output::{OutlineEntry, PageStart};
use crate::resolve::ResolvedNode;
use crate::text::{InlineRun, break_lines};
use folio_style::{FontWeight, Margins, Style};

/// Deepest heading level recorded in the tree.
const MAX_LEVEL: usize = 6;

/// Sets a section title as a bold heading sized by nesting depth and records it in the outline.
///
/// The heading moves to the next page unless `keep_with_next` points of the following
/// content fit below it.
pub fn layout_heading(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    section: &ResolvedNode<'_>,
    title: &str,
    keep_with_next: f32,
) {
    let depth = ctx.section_depth.max(1);
    let style = Style {
        font_size: ctx.config.heading_size(depth),
        font_weight: FontWeight::Bold,
        margin: Margins {
            top: ctx.config.heading_spacing,
            ..section.style.margin
        },
        ..(*section.style).clone()
    };
    let level = depth.min(MAX_LEVEL) as u8;
    let runs = [InlineRun::new(title, &style, &section.id)];

    if keep_with_next > 0.0 && flow.paginates() && !flow.at_page_top() {
        let margins = flow.block_margins(&style);
        let (_, width) = flow.block_span(&margins);
        let height: f32 = break_lines(
            &runs,
            width,
            &style,
            &section.id,
            style.text_align,
            &mut ctx.measurer,
            &mut ctx.diagnostics,
        )
        .iter()
        .map(|line| line.height)
        .sum();
        let needed = height + margins.bottom + keep_with_next;
        if !flow.fits(needed, margins.top) && !flow.exceeds_page(needed) {
            log::debug!("Heading '{}' moved to the next page with its content", title);
            flow.break_page(PageStart::Overflow);
        }
    }

    let placement = layout_text_block(ctx, flow, &section.id, &runs, &style, BlockRole::Heading(level));
    if flow.paginates() {
        ctx.outline.push(OutlineEntry {
            level,
            title: title.to_string(),
            page_index: placement.page_index,
            y: placement.y,
        });
    }
}
