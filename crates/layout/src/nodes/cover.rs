//! The cover page: title, subject, author and place with date, set from the document info.

use crate::algorithms::pagination::Flow;
use crate::elements::{BlockRole, CoverPart};
use crate::engine::LayoutContext;
use crate::nodes::paragraph::layout_text_block;
use crate::output::PageStart;
use crate::text::InlineRun;
use folio_ast::DocumentInfo;
use folio_style::{FontWeight, Margins, Style, TextAlign};
use folio_types::NodeId;

/// Where the cover text starts, as fractions of the page: 60mm across and 140mm down on A4.
const LEFT: f32 = 60.0 / 210.0;
const TOP: f32 = 140.0 / 297.0;

const TITLE_SIZE: f32 = 24.0;
const DETAIL_SIZE: f32 = 12.0;

/// The non-empty cover lines in the order they are set.
pub fn cover_lines(info: &DocumentInfo) -> Vec<(CoverPart, String)> {
    [
        (CoverPart::Title, info.title.clone()),
        (CoverPart::Subject, info.subject.clone()),
        (CoverPart::Author, info.author.clone()),
        (CoverPart::PlaceAndDate, info.place_and_date()),
    ]
    .into_iter()
    .filter_map(|(part, text)| text.filter(|t| !t.trim().is_empty()).map(|t| (part, t)))
    .collect()
}

/// Sets the cover on the flow's first page and opens the body on the next one.
///
/// Returns false, leaving the flow untouched, when the info has nothing to show.
pub fn layout_cover(
    ctx: &mut LayoutContext<'_>,
    flow: &mut Flow,
    info: &DocumentInfo,
    base: &Style,
    source: &NodeId,
) -> bool {
    let lines = cover_lines(info);
    if lines.is_empty() {
        log::debug!("No document info for a cover page on '{}'", source);
        return false;
    }

    let content = flow.content_area();
    let page = ctx.config.page_dimensions();
    let left = (page.width * LEFT).max(content.x);
    flow.mark_page(PageStart::Cover);
    if left < content.right() {
        flow.x = left;
        flow.width = content.right() - left;
    }
    let top = (page.height * TOP).max(content.y);
    flow.advance(top - content.y);

    for (part, text) in &lines {
        let style = Style {
            font_size: if *part == CoverPart::Title { TITLE_SIZE } else { DETAIL_SIZE },
            font_weight: if *part == CoverPart::Title { FontWeight::Bold } else { base.font_weight },
            text_align: TextAlign::Left,
            margin: Margins::default(),
            ..base.clone()
        };
        let runs = [InlineRun::new(text, &style, source)];
        layout_text_block(ctx, flow, source, &runs, &style, BlockRole::Cover(*part));
    }

    flow.break_page(PageStart::First);
    flow.x = content.x;
    flow.width = content.width;
    true
}
