//! Table layout: natural widths, column fitting, cell layout and row-group pagination.

mod grid;

pub use grid::{CellSlot, Grid};

use crate::LayoutError;
use crate::algorithms::pagination::Flow;
use crate::diagnostics::Warning;
use crate::elements::{BoxContent, GridCell, GridRow, PositionedBox, TableGrid};
use crate::engine::{LayoutContext, layout_block};
use crate::nodes::paragraph::inline_runs;
use crate::nodes::table_solver::TableSolver;
use crate::output::PageStart;
use crate::painting::box_painter::{create_background_and_borders, decoration_of};
use crate::resolve::ResolvedNode;
use crate::text::{InlineRun, break_lines};
use folio_ast::NodeKind;
use folio_style::{FontWeight, Style};
use folio_types::Rect;
use std::ops::Range;

/// A cell whose content has been laid out relative to its content box.
struct LaidCell {
    boxes: Option<Vec<PositionedBox>>,
    height: f32,
    inset_x: f32,
    inset_y: f32,
}

pub fn layout_table(ctx: &mut LayoutContext<'_>, flow: &mut Flow, table: &ResolvedNode<'_>) -> Result<(), LayoutError> {
    let grid = Grid::build(table)?;
    if grid.columns == 0 {
        log::debug!("Table '{}' has no cells", table.id);
        return Ok(());
    }

    let margins = flow.block_margins(&table.style);
    let (x, available) = flow.block_span(&margins);

    let naturals = natural_column_widths(ctx, &grid)?;
    let widths = TableSolver::new(&table.style.column_widths, ctx.config.min_column_width)
        .resolve_widths(available, &naturals);
    let mut column_x = Vec::with_capacity(widths.len() + 1);
    column_x.push(x);
    for w in &widths {
        let last = column_x[column_x.len() - 1];
        column_x.push(last + w);
    }
    log::debug!("Table '{}': {} columns, widths {:?}", table.id, widths.len(), widths);

    let mut laid = Vec::with_capacity(grid.cells.len());
    for slot in &grid.cells {
        let width = column_x[slot.col + slot.col_span] - column_x[slot.col];
        laid.push(layout_cell(ctx, slot.node, width)?);
    }

    let heights = row_heights(&grid, &laid);
    let groups = grid.row_groups();

    let mut fragment = TableFragment::default();
    let first_height = groups.first().map(|g| span_height(&heights, g.clone())).unwrap_or(0.0);
    if !flow.fits(first_height, margins.top) && !flow.at_page_top() {
        flow.break_page(PageStart::Overflow);
    }
    fragment.top = flow.begin_block(margins.top);

    for group in groups {
        let height = span_height(&heights, group.clone());
        if !fragment.rows.is_empty() && !flow.fits(height, 0.0) {
            fragment.emit(flow, table, &grid, &mut laid, &widths, &column_x, &heights);
            flow.break_page(PageStart::Overflow);
            fragment.top = flow.begin_block(0.0);
        }
        if flow.exceeds_page(height) {
            fragment.oversized = true;
            ctx.diagnostics.push(Warning::OversizedContent {
                node_id: grid.rows[group.start].id.clone(),
                page_index: flow.page_index(),
                height,
                available: flow.content_area().height,
            });
        }
        for r in group {
            fragment.rows.push((r, flow.cursor_y()));
            flow.advance(heights[r]);
        }
    }
    fragment.emit(flow, table, &grid, &mut laid, &widths, &column_x, &heights);
    flow.end_block(margins.bottom);
    Ok(())
}

fn span_height(heights: &[f32], rows: Range<usize>) -> f32 {
    heights[rows].iter().sum()
}

fn layout_cell(ctx: &mut LayoutContext<'_>, cell: &ResolvedNode<'_>, width: f32) -> Result<LaidCell, LayoutError> {
    let border = cell.style.border.effective_width();
    let padding = cell.style.padding;
    let inner = (width - padding.horizontal() - 2.0 * border).max(0.0);

    let mut flow = Flow::for_cell(inner);
    for child in &cell.children {
        flow.x = 0.0;
        flow.width = inner;
        layout_block(ctx, &mut flow, child)?;
    }
    let content_height = flow.content_height();
    Ok(LaidCell {
        boxes: Some(flow.into_boxes()),
        height: content_height + padding.vertical() + 2.0 * border,
        inset_x: padding.left + border,
        inset_y: padding.top + border,
    })
}

/// Row heights: the row minimum, grown to fit single-row cells, then grown at the last
/// spanned row to fit row-spanning cells.
fn row_heights(grid: &Grid<'_, '_>, laid: &[LaidCell]) -> Vec<f32> {
    let mut heights: Vec<f32> = grid.rows.iter().map(|row| row.style.row_height).collect();
    for (slot, cell) in grid.cells.iter().zip(laid) {
        if slot.row_span == 1 {
            heights[slot.row] = heights[slot.row].max(cell.height);
        }
    }
    for (slot, cell) in grid.cells.iter().zip(laid) {
        if slot.row_span > 1 {
            let rows = slot.row..slot.row + slot.row_span;
            let spanned = span_height(&heights, rows.clone());
            if cell.height > spanned {
                heights[rows.end - 1] += cell.height - spanned;
            }
        }
    }
    heights
}

#[derive(Default)]
struct TableFragment {
    top: f32,
    /// Row index and absolute y of each row on the current page.
    rows: Vec<(usize, f32)>,
    continued: bool,
    oversized: bool,
}

impl TableFragment {
    #[allow(clippy::too_many_arguments)]
    fn emit(
        &mut self,
        flow: &mut Flow,
        table: &ResolvedNode<'_>,
        grid: &Grid<'_, '_>,
        laid: &mut [LaidCell],
        widths: &[f32],
        column_x: &[f32],
        heights: &[f32],
    ) {
        if self.rows.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.rows);
        let row_y = |r: usize| rows.iter().find(|(i, _)| *i == r).map(|(_, y)| *y);

        let mut decorations = Vec::new();
        let mut cells = Vec::new();
        for (slot, cell) in grid.cells.iter().zip(laid.iter_mut()) {
            let Some(y) = row_y(slot.row) else { continue };
            let rect = Rect::new(
                column_x[slot.col],
                y,
                column_x[slot.col + slot.col_span] - column_x[slot.col],
                span_height(heights, slot.row..slot.row + slot.row_span),
            );
            let decoration = decoration_of(&slot.node.style);
            if let Some(painted) = create_background_and_borders(rect, &decoration, &slot.node.id) {
                decorations.push(painted);
            }
            let mut content = cell.boxes.take().unwrap_or_default();
            for child in &mut content {
                child.translate(rect.x + cell.inset_x, rect.y + cell.inset_y);
            }
            cells.push(GridCell {
                source: slot.node.id.clone(),
                row: slot.row,
                col: slot.col,
                row_span: slot.row_span,
                col_span: slot.col_span,
                rect,
                decoration,
                content,
            });
        }

        let grid_rows: Vec<GridRow> = rows
            .iter()
            .map(|&(index, y)| GridRow {
                index,
                y,
                height: heights[index],
                header: matches!(grid.rows[index].kind(), NodeKind::TableRow { header: true }),
            })
            .collect();
        let height: f32 = grid_rows.iter().map(|r| r.height).sum();
        let width: f32 = widths.iter().sum();

        let mut positioned = PositionedBox::new(
            Rect::new(column_x[0], self.top, width, height),
            table.id.clone(),
            BoxContent::Table(TableGrid {
                column_widths: widths.to_vec(),
                rows: grid_rows,
                cells,
                continued: self.continued,
            }),
        );
        if self.oversized {
            positioned.mark_oversized();
            decorations.iter_mut().for_each(PositionedBox::mark_oversized);
        }
        for painted in decorations {
            flow.place(painted);
        }
        flow.place(positioned);
        self.continued = true;
        self.oversized = false;
    }
}

/// Natural column widths: the widest unwrapped content of single-span cells, then widened
/// evenly where a spanning cell needs more than its columns offer.
fn natural_column_widths(ctx: &mut LayoutContext<'_>, grid: &Grid<'_, '_>) -> Result<Vec<f32>, LayoutError> {
    let mut naturals = vec![0.0f32; grid.columns];
    let mut spanning = Vec::new();
    for slot in &grid.cells {
        let style = &slot.node.style;
        let chrome = style.padding.horizontal() + 2.0 * style.border.effective_width();
        let natural = widest_child(ctx, &slot.node.children)? + chrome;
        if slot.col_span == 1 {
            naturals[slot.col] = naturals[slot.col].max(natural);
        } else {
            spanning.push((slot.col..slot.col + slot.col_span, natural));
        }
    }
    for (columns, natural) in spanning {
        let current: f32 = naturals[columns.clone()].iter().sum();
        if natural > current {
            let extra = (natural - current) / columns.len() as f32;
            for w in &mut naturals[columns] {
                *w += extra;
            }
        }
    }
    Ok(naturals)
}

/// Width `node` would take with no wrapping at all.
fn max_content_width(ctx: &mut LayoutContext<'_>, node: &ResolvedNode<'_>) -> Result<f32, LayoutError> {
    match node.kind() {
        NodeKind::Paragraph => {
            let runs = inline_runs(node)?;
            Ok(unwrapped_width(ctx, &runs, &node.style, node))
        }
        NodeKind::Section { title } => {
            let heading = match title {
                Some(text) => {
                    let style = Style {
                        font_size: ctx.config.heading_size(ctx.section_depth + 1),
                        font_weight: FontWeight::Bold,
                        ..(*node.style).clone()
                    };
                    let runs = [InlineRun::new(text, &style, &node.id)];
                    unwrapped_width(ctx, &runs, &style, node)
                }
                None => 0.0,
            };
            Ok(heading.max(widest_child(ctx, &node.children)?))
        }
        NodeKind::Image { data, .. } => ctx
            .provider
            .image_intrinsic_size(data)
            .map(|size| size.width)
            .map_err(|e| LayoutError::InvalidImage {
                node_id: node.id.clone(),
                reason: e.to_string(),
            }),
        NodeKind::List { .. } => {
            let indent = ctx.config.list_indent;
            let mut widest = 0.0f32;
            for item in &node.children {
                widest = widest.max(widest_child(ctx, &item.children)?);
            }
            Ok(indent + widest)
        }
        NodeKind::ListItem | NodeKind::TableCell { .. } => widest_child(ctx, &node.children),
        NodeKind::Table => {
            let mut widest = 0.0f32;
            for row in &node.children {
                let mut sum = 0.0;
                for cell in &row.children {
                    let chrome = cell.style.padding.horizontal() + 2.0 * cell.style.border.effective_width();
                    sum += chrome + widest_child(ctx, &cell.children)?;
                }
                widest = widest.max(sum);
            }
            Ok(widest)
        }
        NodeKind::Document(_)
        | NodeKind::TableRow { .. }
        | NodeKind::TextRun { .. }
        | NodeKind::Attachment { .. }
        | NodeKind::PageBreak => Ok(0.0),
    }
}

fn widest_child(ctx: &mut LayoutContext<'_>, children: &[ResolvedNode<'_>]) -> Result<f32, LayoutError> {
    let mut widest = 0.0f32;
    for child in children {
        widest = widest.max(max_content_width(ctx, child)?);
    }
    Ok(widest)
}

fn unwrapped_width(ctx: &mut LayoutContext<'_>, runs: &[InlineRun<'_>], base: &Style, node: &ResolvedNode<'_>) -> f32 {
    break_lines(
        runs,
        f32::INFINITY,
        base,
        &node.id,
        base.text_align,
        &mut ctx.measurer,
        &mut ctx.diagnostics,
    )
    .iter()
    .map(|line| line.width)
    .fold(0.0, f32::max)
}
