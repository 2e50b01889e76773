use crate::LayoutError;
use crate::algorithms::pagination::Flow;
use crate::diagnostics::Warning;
use crate::elements::{BlockRole, BoxContent, ImageBox, PositionedBox};
use crate::engine::LayoutContext;
use crate::nodes::paragraph::layout_text_block;
use crate::output::PageStart;
use crate::resolve::ResolvedNode;
use crate::text::InlineRun;
use folio_ast::ImageData;
use folio_style::{FontStyle, Margins, Style, TextAlign};
use folio_traits::sniff_kind;
use folio_types::Rect;

/// Places an image scaled down to the available width, then its caption if any.
pub fn layout_image(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    node: &ResolvedNode<'_>,
    data: &ImageData,
    caption: Option<&str>,
) -> Result<(), LayoutError> {
    let invalid = |reason: String| LayoutError::InvalidImage {
        node_id: node.id.clone(),
        reason,
    };
    let kind = sniff_kind(data).map_err(|e| invalid(e.to_string()))?;
    let intrinsic = ctx
        .provider
        .image_intrinsic_size(data)
        .map_err(|e| invalid(e.to_string()))?;
    if intrinsic.width <= 0.0 || intrinsic.height <= 0.0 {
        return Err(invalid(format!(
            "image has no area ({}x{})",
            intrinsic.width, intrinsic.height
        )));
    }

    let margins = flow.block_margins(&node.style);
    let (x, width) = flow.block_span(&margins);
    let size = intrinsic.fit_width(width);
    let caption_text = caption.map(|_| caption_style(&node.style));

    // The image and the first line of its caption go on the same page.
    let kept = size.height + caption_text.as_ref().map_or(0.0, Style::line_advance);
    let keep = if flow.exceeds_page(kept) { size.height } else { kept };
    if !flow.fits(keep, margins.top) && !flow.at_page_top() {
        flow.break_page(PageStart::Overflow);
    }
    let y = flow.begin_block(margins.top);

    let offset = match node.style.text_align {
        TextAlign::Center => (width - size.width) / 2.0,
        TextAlign::Right => width - size.width,
        TextAlign::Left | TextAlign::Justify => 0.0,
    };
    let mut positioned = PositionedBox::new(
        Rect::new(x + offset, y, size.width, size.height),
        node.id.clone(),
        BoxContent::Image(ImageBox {
            data: data.clone(),
            kind,
            intrinsic,
        }),
    );
    if flow.exceeds_page(size.height) {
        positioned.oversized = true;
        ctx.diagnostics.push(Warning::OversizedContent {
            node_id: node.id.clone(),
            page_index: flow.page_index(),
            height: size.height,
            available: flow.content_area().height,
        });
    }
    log::debug!(
        "Image '{}' placed at {}x{} (intrinsic {}x{})",
        node.id,
        size.width,
        size.height,
        intrinsic.width,
        intrinsic.height
    );
    flow.place(positioned);
    flow.advance(size.height);

    match caption.zip(caption_text) {
        Some((text, style)) => {
            flow.end_block(0.0);
            let runs = [InlineRun::new(text, &style, &node.id)];
            layout_text_block(ctx, flow, &node.id, &runs, &style, BlockRole::Caption);
        }
        None => flow.end_block(margins.bottom),
    }
    Ok(())
}

fn caption_style(image: &Style) -> Style {
    Style {
        font_style: FontStyle::Italic,
        text_align: TextAlign::Center,
        margin: Margins {
            top: 0.0,
            ..image.margin
        },
        ..image.clone()
    }
}
