use crate::LayoutError;
use crate::algorithms::pagination::Flow;
use crate::elements::BlockRole;
use crate::engine::{LayoutContext, layout_block};
use crate::nodes::paragraph::{layout_paragraph, layout_text_block};
use crate::resolve::ResolvedNode;
use folio_ast::NodeKind;

const BULLET: &str = "\u{2022}";

pub fn marker(ordered: bool, index: usize) -> String {
    if ordered {
        format!("{}.", index + 1)
    } else {
        BULLET.to_string()
    }
}

/// Lays out list items indented by the configured list indent.
///
/// The item's marker rides on its first paragraph. An item that starts with anything else
/// gets a paragraph holding only the marker.
pub fn layout_list(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    list: &ResolvedNode<'_>,
    ordered: bool,
) -> Result<(), LayoutError> {
    let indent = ctx.config.list_indent;
    let margins = flow.block_margins(&list.style);
    let (x, width) = (flow.x, flow.width);

    flow.collapse_margin(margins.top);
    ctx.list_depth += 1;
    let level = ctx.list_depth.min(u8::MAX as usize) as u8;

    let result = list.children.iter().enumerate().try_for_each(|(index, item)| {
        flow.x = x + indent.min(width);
        flow.width = (width - indent).max(0.0);
        let role = BlockRole::ListItem {
            marker: marker(ordered, index),
            level,
            indent,
        };
        layout_item(ctx, flow, item, role)
    });

    ctx.list_depth -= 1;
    flow.x = x;
    flow.width = width;
    flow.end_block(margins.bottom);
    result
}

fn layout_item(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    item: &ResolvedNode<'_>,
    role: BlockRole,
) -> Result<(), LayoutError> {
    let (x, width) = (flow.x, flow.width);
    let rest = match item.children.split_first() {
        Some((first, rest)) if matches!(first.kind(), NodeKind::Paragraph) => {
            layout_paragraph(ctx, flow, first, role)?;
            rest
        }
        _ => {
            layout_text_block(ctx, flow, &item.id, &[], &item.style, role);
            &item.children[..]
        }
    };
    for child in rest {
        flow.x = x;
        flow.width = width;
        layout_block(ctx, flow, child)?;
    }
    Ok(())
}
