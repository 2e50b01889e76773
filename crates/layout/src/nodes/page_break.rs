use crate::algorithms::pagination::Flow;
use crate::output::PageStart;

/// Starts a new page regardless of the space left on the current one.
pub fn layout_page_break(flow: &mut Flow) {
    flow.break_page(PageStart::Explicit);
}
