use crate::LayoutError;
use crate::algorithms::pagination::Flow;
use crate::engine::{LayoutContext, layout_block};
use crate::nodes::heading::layout_heading;
use crate::resolve::ResolvedNode;

/// Lays out a section's children in the horizontal context the section was entered with.
///
/// Untitled sections are plain sequences: they add no depth and nothing to the output.
pub fn layout_section(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    section: &ResolvedNode<'_>,
    title: Option<&str>,
) -> Result<(), LayoutError> {
    let (x, width) = (flow.x, flow.width);

    if let Some(title) = title {
        ctx.section_depth += 1;
        let keep_with_next = if section.children.is_empty() {
            0.0
        } else {
            section.style.line_advance()
        };
        layout_heading(ctx, flow, section, title, keep_with_next);
    }
    let result = section.children.iter().try_for_each(|child| {
        flow.x = x;
        flow.width = width;
        layout_block(ctx, flow, child)
    });
    if title.is_some() {
        ctx.section_depth -= 1;
    }

    flow.x = x;
    flow.width = width;
    result
}
