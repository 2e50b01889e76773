//! Running header, footer and page numbers, stamped into the page margins once the body
//! is paginated and the page count is known.

use crate::algorithms::pagination::Flow;
use crate::config::LayoutConfig;
use crate::elements::{BlockRole, PositionedBox, RunningPart};
use crate::engine::LayoutContext;
use crate::nodes::paragraph::layout_text_block;
use crate::output::{Page, PageStart, RunningContent};
use crate::text::InlineRun;
use folio_ast::DocumentInfo;
use folio_style::dimension::MM;
use folio_style::{Margins, Style, TextAlign};
use folio_types::NodeId;

const RUNNING_SIZE: f32 = 8.0;
/// Distance between the content area and the header or footer.
const GAP: f32 = 6.0;
/// Top of the page number line, measured up from the bottom of the page.
const PAGE_NUMBER_RISE: f32 = 15.0 * MM;

/// What the configuration asks to repeat on every body page.
pub fn running_content(config: &LayoutConfig, info: &DocumentInfo) -> RunningContent {
    let present = |text: Option<String>| text.filter(|t| !t.trim().is_empty());
    let mut content = RunningContent {
        page_number: config.page_numbers.clone(),
        ..RunningContent::default()
    };
    if config.running_header {
        content.header = [info.title.clone(), info.subject.clone()]
            .into_iter()
            .filter_map(present)
            .collect();
        content.footer = [info.author.clone(), info.place_and_date()]
            .into_iter()
            .filter_map(present)
            .collect();
    }
    content
}

/// Fills in the `{page}` and `{pages}` placeholders.
pub fn page_number_text(template: &str, page: usize, pages: usize) -> String {
    template
        .replace("{page}", &page.to_string())
        .replace("{pages}", &pages.to_string())
}

/// Adds the running boxes to every page except the cover.
///
/// Page numbers count the cover, so the first body page after one is page 2.
pub fn stamp_pages(
    ctx: &mut LayoutContext<'_>,
    pages: &mut [Page],
    running: &RunningContent,
    base: &Style,
    root: &NodeId,
) {
    let total = pages.len();
    let header_id = NodeId::new(format!("{}/header", root));
    let footer_id = NodeId::new(format!("{}/footer", root));
    let number_id = NodeId::new(format!("{}/page-number", root));
    let width = ctx.config.content_area().width;

    let header = (!running.header.is_empty())
        .then(|| set_lines(ctx, &running.header.join("\n"), RunningPart::Header, base, &header_id, width));
    let footer = (!running.footer.is_empty())
        .then(|| set_lines(ctx, &running.footer.join("\n"), RunningPart::Footer, base, &footer_id, width));

    for page in pages.iter_mut().filter(|page| page.start != PageStart::Cover) {
        let content = page.content_area;
        let mut footer_bottom = content.bottom();
        if let Some((boxes, height)) = &header {
            let top = (content.y - GAP - height).max(0.0);
            page.running.extend(moved(boxes, content.x, top));
        }
        if let Some((boxes, height)) = &footer {
            let top = content.bottom() + GAP;
            page.running.extend(moved(boxes, content.x, top));
            footer_bottom = top + height;
        }
        if let Some(template) = &running.page_number {
            let text = page_number_text(template, page.index + 1, total);
            let (boxes, _) = set_lines(ctx, &text, RunningPart::PageNumber, base, &number_id, width);
            let top = (page.size.height - PAGE_NUMBER_RISE).max(footer_bottom);
            page.running.extend(moved(&boxes, content.x, top));
        }
    }
    log::debug!("Stamped running content on {} pages", total);
}

/// Lays `text` out at the origin of a throwaway column and returns its boxes and height.
fn set_lines(
    ctx: &mut LayoutContext<'_>,
    text: &str,
    part: RunningPart,
    base: &Style,
    source: &NodeId,
    width: f32,
) -> (Vec<PositionedBox>, f32) {
    let style = Style {
        font_size: RUNNING_SIZE,
        text_align: match part {
            RunningPart::PageNumber => TextAlign::Center,
            RunningPart::Header | RunningPart::Footer => TextAlign::Right,
        },
        margin: Margins::default(),
        ..base.clone()
    };
    let mut flow = Flow::for_cell(width);
    let runs = [InlineRun::new(text, &style, source)];
    layout_text_block(ctx, &mut flow, source, &runs, &style, BlockRole::Running(part));
    let height = flow.content_height();
    (flow.into_boxes(), height)
}

fn moved(boxes: &[PositionedBox], dx: f32, dy: f32) -> Vec<PositionedBox> {
    boxes
        .iter()
        .cloned()
        .map(|mut positioned| {
            positioned.translate(dx, dy);
            positioned
        })
        .collect()
}
