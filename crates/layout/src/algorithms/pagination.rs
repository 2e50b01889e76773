//! Vertical flow state: the cursor, collapsing margins and page breaks.

use crate::elements::PositionedBox;
use crate::output::{Page, PageStart};
use folio_style::{Margins, Style};
use folio_types::{EPSILON, Rect, Size};

pub struct BreakAnalysis {
    pub should_break: bool,
    pub remaining_height: f32,
}

/// Checks whether a child of `child_height` fits below `cursor_y` inside `bounds`.
///
/// `cursor_y` is absolute, like `bounds`.
pub fn check_child_fit(cursor_y: f32, child_height: f32, bounds: Rect) -> BreakAnalysis {
    let available = (bounds.bottom() - cursor_y).max(0.0);
    BreakAnalysis {
        should_break: child_height > available + EPSILON,
        remaining_height: available,
    }
}

/// A column of content being filled top to bottom.
///
/// A page flow breaks onto new pages; a cell flow grows without bound and collects its boxes
/// in coordinates relative to the cell's content box.
#[derive(Debug)]
pub struct Flow {
    paginate: bool,
    page_size: Size,
    content: Rect,
    /// Left edge of the current horizontal context.
    pub x: f32,
    /// Width of the current horizontal context.
    pub width: f32,
    cursor_y: f32,
    pending_margin: f32,
    boxes: Vec<PositionedBox>,
    pages: Vec<Page>,
    start: PageStart,
}

impl Flow {
    pub fn for_pages(page_size: Size, content: Rect) -> Self {
        Self {
            paginate: true,
            page_size,
            content,
            x: content.x,
            width: content.width,
            cursor_y: content.y,
            pending_margin: 0.0,
            boxes: Vec::new(),
            pages: Vec::new(),
            start: PageStart::First,
        }
    }

    pub fn for_cell(width: f32) -> Self {
        let content = Rect::new(0.0, 0.0, width, f32::INFINITY);
        Self {
            paginate: false,
            page_size: Size::new(width, f32::INFINITY),
            content,
            x: 0.0,
            width,
            cursor_y: 0.0,
            pending_margin: 0.0,
            boxes: Vec::new(),
            pages: Vec::new(),
            start: PageStart::First,
        }
    }

    pub fn paginates(&self) -> bool {
        self.paginate
    }

    pub fn page_index(&self) -> usize {
        self.pages.len()
    }

    pub fn content_area(&self) -> Rect {
        self.content
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// True while nothing has been placed on the current page.
    pub fn at_page_top(&self) -> bool {
        self.cursor_y <= self.content.y + EPSILON
    }

    /// Margins a block in `style` is given here. Content inside table cells sits flush.
    pub fn block_margins(&self, style: &Style) -> Margins {
        if !self.paginate {
            return Margins::default();
        }
        let m = style.margin;
        Margins {
            top: m.top.max(0.0),
            right: m.right.max(0.0),
            bottom: m.bottom.max(0.0),
            left: m.left.max(0.0),
        }
    }

    /// Left edge and width of a block with `margins` in the current context.
    pub fn block_span(&self, margins: &Margins) -> (f32, f32) {
        let width = (self.width - margins.horizontal()).max(0.0);
        (self.x + margins.left.min(self.width), width)
    }

    /// Space above a block whose own top margin is `margin_top`, after collapsing.
    fn gap_above(&self, margin_top: f32) -> f32 {
        if self.at_page_top() {
            0.0
        } else {
            self.pending_margin.max(margin_top)
        }
    }

    /// Height left on the current page below the cursor.
    pub fn remaining(&self) -> f32 {
        (self.content.bottom() - self.cursor_y).max(0.0)
    }

    pub fn fits(&self, height: f32, margin_top: f32) -> bool {
        if !self.paginate {
            return true;
        }
        !check_child_fit(self.cursor_y + self.gap_above(margin_top), height, self.content).should_break
    }

    /// True when `height` exceeds an entire page, so breaking would not help.
    pub fn exceeds_page(&self, height: f32) -> bool {
        self.paginate && height > self.content.height + EPSILON
    }

    /// Moves the cursor past the collapsed margin and returns the block's top edge.
    pub fn begin_block(&mut self, margin_top: f32) -> f32 {
        self.cursor_y += self.gap_above(margin_top);
        self.pending_margin = 0.0;
        self.cursor_y
    }

    pub fn advance(&mut self, height: f32) {
        self.cursor_y += height;
    }

    /// Records the bottom margin of the block just finished.
    pub fn end_block(&mut self, margin_bottom: f32) {
        self.pending_margin = self.pending_margin.max(margin_bottom);
    }

    /// Adds a margin that collapses with its neighbours without starting a block.
    pub fn collapse_margin(&mut self, margin: f32) {
        if !self.at_page_top() {
            self.pending_margin = self.pending_margin.max(margin);
        }
    }

    pub fn place(&mut self, positioned: PositionedBox) {
        self.boxes.push(positioned);
    }

    /// Closes the current page and opens the next. A no-op for cell flows.
    pub fn break_page(&mut self, start: PageStart) {
        if !self.paginate {
            return;
        }
        log::debug!("Page {} closed with {} boxes", self.pages.len() + 1, self.boxes.len());
        let page = Page {
            index: self.pages.len(),
            size: self.page_size,
            content_area: self.content,
            start: self.start,
            boxes: std::mem::take(&mut self.boxes),
            running: Vec::new(),
        };
        self.pages.push(page);
        self.start = start;
        self.cursor_y = self.content.y;
        self.pending_margin = 0.0;
    }

    /// Changes the recorded reason the current page was started.
    pub fn mark_page(&mut self, start: PageStart) {
        self.start = start;
    }

    /// Closes the last page. There is always at least one.
    pub fn finish(mut self) -> Vec<Page> {
        self.break_page(PageStart::Overflow);
        self.pages
    }

    /// Height used by a cell flow.
    pub fn content_height(&self) -> f32 {
        self.cursor_y - self.content.y
    }

    pub fn into_boxes(self) -> Vec<PositionedBox> {
        self.boxes
    }
}
