//! Maps rows and cells onto grid slots, honouring row and column spans.

use crate::LayoutError;
use crate::resolve::ResolvedNode;
use folio_ast::NodeKind;
use std::ops::Range;

#[derive(Debug)]
pub struct CellSlot<'r, 'a> {
    pub node: &'r ResolvedNode<'a>,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

#[derive(Debug)]
pub struct Grid<'r, 'a> {
    pub rows: Vec<&'r ResolvedNode<'a>>,
    pub cells: Vec<CellSlot<'r, 'a>>,
    pub columns: usize,
}

impl<'r, 'a> Grid<'r, 'a> {
    /// Places every cell in the first free column of its row.
    ///
    /// Row spans reaching past the last row are clipped to it.
    pub fn build(table: &'r ResolvedNode<'a>) -> Result<Self, LayoutError> {
        let rows: Vec<&ResolvedNode> = table.children.iter().collect();
        let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); rows.len()];
        let mut cells = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            let mut col = 0;
            for cell in &row.children {
                let (col_span, row_span) = match cell.kind() {
                    NodeKind::TableCell { col_span, row_span } => (*col_span as usize, *row_span as usize),
                    other => {
                        return Err(LayoutError::UnsupportedNodeKind {
                            node_id: cell.id.clone(),
                            kind: other.name(),
                            context: "inside a TableRow".to_string(),
                        });
                    }
                };
                while occupied[r].get(col).copied().unwrap_or(false) {
                    col += 1;
                }
                let row_span = row_span.min(rows.len() - r);
                for slots in occupied.iter_mut().skip(r).take(row_span) {
                    if slots.len() < col + col_span {
                        slots.resize(col + col_span, false);
                    }
                    for slot in &mut slots[col..col + col_span] {
                        *slot = true;
                    }
                }
                cells.push(CellSlot {
                    node: cell,
                    row: r,
                    col,
                    row_span,
                    col_span,
                });
                col += col_span;
            }
        }

        let columns = occupied.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Self { rows, cells, columns })
    }

    /// Consecutive rows that row-spanning cells tie together.
    pub fn row_groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = 0;
        let mut end = 0;
        for r in 0..self.rows.len() {
            let reach = self
                .cells
                .iter()
                .filter(|c| c.row == r)
                .map(|c| c.row + c.row_span)
                .max()
                .unwrap_or(r + 1);
            end = end.max(reach).max(r + 1);
            if end == r + 1 {
                groups.push(start..end);
                start = end;
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::resolve::resolve;
    use folio_ast::{DocumentInfo, Node};

    fn table_doc(rows: Vec<Node>) -> Node {
        Node::document(DocumentInfo::default(), vec![Node::table(rows)])
    }

    #[test]
    fn spans_push_later_cells_right() {
        let doc = table_doc(vec![
            Node::row(vec![Node::text_cell("a").with_span(1, 2), Node::text_cell("b").with_span(2, 1)]),
            Node::row(vec![Node::text_cell("c"), Node::text_cell("d")]),
            Node::row(vec![Node::text_cell("e")]),
        ]);
        let resolved = resolve(&doc, &LayoutConfig::default()).unwrap();
        let grid = Grid::build(&resolved.children[0]).unwrap();

        assert_eq!(grid.columns, 3);
        let slots: Vec<(usize, usize)> = grid.cells.iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(slots, vec![(0, 0), (0, 1), (1, 1), (1, 2), (2, 0)]);
        assert_eq!(grid.row_groups(), vec![0..2, 2..3]);
    }

    #[test]
    fn row_span_past_the_end_is_clipped() {
        let doc = table_doc(vec![Node::row(vec![Node::text_cell("a").with_span(1, 5)])]);
        let resolved = resolve(&doc, &LayoutConfig::default()).unwrap();
        let grid = Grid::build(&resolved.children[0]).unwrap();
        assert_eq!(grid.cells[0].row_span, 1);
        assert_eq!(grid.row_groups(), vec![0..1]);
    }
}
