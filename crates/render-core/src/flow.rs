//! Rebuilds the document flow from paginated boxes, for backends without fixed pages.

use folio_layout::{
    BlockRole, BoxContent, CoverPart, ImageBox, LayoutTree, LineEnd, PageStart, PositionedBox, SpanStyle, TableGrid,
    TextBlock,
};
use folio_types::{NodeId, Rect};
use itertools::Itertools;

/// One body-level element of the flow.
#[derive(Debug, Clone)]
pub enum Block<'t> {
    Paragraph {
        source: &'t NodeId,
        rect: Rect,
        fragments: Vec<&'t TextBlock>,
    },
    Image {
        rect: Rect,
        image: &'t ImageBox,
    },
    Table {
        source: &'t NodeId,
        rect: Rect,
        grids: Vec<&'t TableGrid>,
    },
    PageBreak,
}

/// The document body: explicit page breaks become [`Block::PageBreak`] and fragments of a
/// paragraph or table continued on the next page are merged back together. The cover page
/// is left out; see [`cover_lines`].
pub fn body_blocks(tree: &LayoutTree) -> Vec<Block<'_>> {
    tree.pages
        .iter()
        .filter(|page| page.start != PageStart::Cover)
        .flat_map(|page| {
            let page_break = (page.start == PageStart::Explicit).then_some(Block::PageBreak);
            page_break.into_iter().chain(flow_blocks(&page.boxes))
        })
        .coalesce(merge_fragments)
        .collect()
}

/// The cover page as flow elements; empty when the document has no cover.
pub fn cover_blocks(tree: &LayoutTree) -> Vec<Block<'_>> {
    tree.pages
        .iter()
        .filter(|page| page.start == PageStart::Cover)
        .flat_map(|page| flow_blocks(&page.boxes))
        .coalesce(merge_fragments)
        .collect()
}

/// The cover page's text by part, in the order it is set.
pub fn cover_lines(tree: &LayoutTree) -> Vec<(CoverPart, String)> {
    tree.pages
        .iter()
        .filter(|page| page.start == PageStart::Cover)
        .flat_map(|page| page.text_blocks())
        .filter_map(|block| match block.role {
            BlockRole::Cover(part) => Some((part, block.text())),
            _ => None,
        })
        .collect()
}

/// Flow elements of one box list. Decoration rectangles are dropped; tables carry their
/// own cell decoration.
pub fn flow_blocks(boxes: &[PositionedBox]) -> impl Iterator<Item = Block<'_>> {
    boxes.iter().filter_map(|positioned| match &positioned.content {
        BoxContent::Text(block) => Some(Block::Paragraph {
            source: &positioned.source,
            rect: positioned.rect,
            fragments: vec![block],
        }),
        BoxContent::Image(image) => Some(Block::Image {
            rect: positioned.rect,
            image,
        }),
        BoxContent::Table(grid) => Some(Block::Table {
            source: &positioned.source,
            rect: positioned.rect,
            grids: vec![grid],
        }),
        BoxContent::Rect(_) => None,
    })
}

pub fn merge_fragments<'t>(
    prev: Block<'t>,
    next: Block<'t>,
) -> Result<Block<'t>, (Block<'t>, Block<'t>)> {
    if !continues(&prev, &next) {
        return Err((prev, next));
    }
    match (prev, next) {
        (
            Block::Paragraph { source, rect, mut fragments },
            Block::Paragraph { fragments: more, .. },
        ) => {
            fragments.extend(more);
            Ok(Block::Paragraph { source, rect, fragments })
        }
        (Block::Table { source, rect, mut grids }, Block::Table { grids: more, .. }) => {
            grids.extend(more);
            Ok(Block::Table { source, rect, grids })
        }
        (prev, next) => Err((prev, next)),
    }
}

fn continues(prev: &Block<'_>, next: &Block<'_>) -> bool {
    match (prev, next) {
        (
            Block::Paragraph { source: a, .. },
            Block::Paragraph { source: b, fragments, .. },
        ) => a == b && fragments.first().is_some_and(|f| f.continued),
        (Block::Table { source: a, .. }, Block::Table { source: b, grids, .. }) => {
            a == b && grids.first().is_some_and(|g| g.continued)
        }
        _ => false,
    }
}

/// A run of text sharing one style, or a hard line break.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<'t> {
    Text(&'t SpanStyle, String),
    Break,
}

/// Rejoins the lines of a paragraph's fragments: soft wraps become spaces and adjacent
/// runs of one style are merged.
pub fn pieces<'t>(fragments: &[&'t TextBlock]) -> Vec<Piece<'t>> {
    let mut out = Vec::new();
    for line in fragments.iter().flat_map(|f| f.lines.iter()) {
        for span in &line.spans {
            out.push(Piece::Text(&span.style, span.text.clone()));
        }
        match line.end {
            LineEnd::Soft => {
                if let Some(last) = line.spans.last() {
                    out.push(Piece::Text(&last.style, " ".to_string()));
                }
            }
            LineEnd::Hard => out.push(Piece::Break),
            LineEnd::Split | LineEnd::Last => {}
        }
    }
    out.into_iter()
        .coalesce(|a, b| match (a, b) {
            (Piece::Text(style, mut text), Piece::Text(next, more)) if style == next => {
                text.push_str(&more);
                Ok(Piece::Text(style, text))
            }
            (a, b) => Err((a, b)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_ast::{DocumentInfo, Node};
    use folio_layout::{LayoutConfig, LayoutEngine, ParagraphFormat, TextLine, TextSpan};
    use folio_style::{Margins, TextAlign};
    use folio_traits::{FontSpec, StandardFontMetrics};
    use folio_types::Color;
    use std::sync::Arc;

    fn lay_out(config: LayoutConfig, info: DocumentInfo, children: Vec<Node>) -> LayoutTree {
        let engine = LayoutEngine::new(config, Arc::new(StandardFontMetrics)).unwrap();
        engine.layout_document(&Node::document(info, children)).unwrap()
    }

    fn long_text() -> String {
        vec!["split across pages"; 60].join(" ")
    }

    #[test]
    fn split_paragraphs_are_merged_and_breaks_kept() {
        let config = LayoutConfig {
            page_size: folio_style::PageSize::Custom { width: 200.0, height: 150.0 },
            margins: folio_style::Margins::all(10.0),
            ..LayoutConfig::default()
        };
        let tree = lay_out(
            config,
            DocumentInfo::default(),
            vec![Node::text_paragraph(long_text()), Node::page_break(), Node::text_paragraph("after")],
        );
        assert!(tree.page_count() > 2);

        let blocks = body_blocks(&tree);
        assert_eq!(blocks.len(), 3);
        match &blocks[0] {
            Block::Paragraph { fragments, .. } => {
                assert!(fragments.len() > 1);
                let text: String = fragments.iter().map(|f| f.text()).collect();
                assert_eq!(text, long_text());
            }
            other => panic!("expected a paragraph, got {:?}", other),
        }
        assert!(matches!(blocks[1], Block::PageBreak));
    }

    #[test]
    fn cover_is_kept_apart_from_the_body() {
        let config = LayoutConfig {
            cover_page: true,
            ..LayoutConfig::default()
        };
        let info = DocumentInfo {
            author: Some("Jo Doe".into()),
            ..DocumentInfo::titled("Minutes")
        };
        let tree = lay_out(config, info, vec![Node::text_paragraph("body")]);

        assert_eq!(
            cover_lines(&tree),
            vec![(CoverPart::Title, "Minutes".to_string()), (CoverPart::Author, "Jo Doe".to_string())]
        );
        assert_eq!(cover_blocks(&tree).len(), 2);
        let blocks = body_blocks(&tree);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], Block::Paragraph { fragments, .. } if fragments[0].text() == "body"));
    }

    fn style(bold: bool) -> SpanStyle {
        SpanStyle {
            font: FontSpec::new("Helvetica", bold, false),
            size: 10.0,
            color: Color::BLACK,
            attachment: None,
        }
    }

    fn line(spans: &[(&str, bool)], end: LineEnd) -> TextLine {
        TextLine {
            rect: Rect::new(0.0, 0.0, 100.0, 15.0),
            baseline: 11.0,
            spans: spans
                .iter()
                .map(|(text, bold)| TextSpan {
                    text: text.to_string(),
                    x: 0.0,
                    width: 10.0,
                    style: style(*bold),
                })
                .collect(),
            end,
        }
    }

    fn block(lines: Vec<TextLine>, continued: bool) -> TextBlock {
        TextBlock {
            role: BlockRole::Body,
            format: ParagraphFormat {
                align: TextAlign::Left,
                margin: Margins::default(),
                line_height: 1.5,
                base: style(false),
            },
            lines,
            continued,
        }
    }

    fn texts(pieces: &[Piece<'_>]) -> Vec<String> {
        pieces
            .iter()
            .map(|p| match p {
                Piece::Text(_, text) => text.clone(),
                Piece::Break => "<br>".to_string(),
            })
            .collect()
    }

    #[test]
    fn soft_wraps_rejoin_with_spaces_across_fragments() {
        let a = block(vec![line(&[("one two", false)], LineEnd::Soft)], false);
        let b = block(vec![line(&[("three", false)], LineEnd::Last)], true);
        assert_eq!(texts(&pieces(&[&a, &b])), vec!["one two three"]);
    }

    #[test]
    fn hard_breaks_and_style_changes_split_runs() {
        let a = block(
            vec![
                line(&[("plain ", false), ("bold", true)], LineEnd::Hard),
                line(&[("next", false)], LineEnd::Split),
                line(&[("word", false)], LineEnd::Last),
            ],
            false,
        );
        assert_eq!(texts(&pieces(&[&a])), vec!["plain ", "bold", "<br>", "nextword"]);
    }
}
