use crate::config::LayoutConfig;
use crate::elements::{BoxContent, PositionedBox};
use crate::engine::LayoutEngine;
use crate::output::LayoutTree;
use folio_ast::{DocumentInfo, Node};
use folio_style::{Margins, PageSize};
use folio_traits::StandardFontMetrics;
use folio_types::EPSILON;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// A small page (200x200pt, 10pt margins) so pagination is easy to provoke.
pub fn small_page_config() -> LayoutConfig {
    LayoutConfig {
        page_size: PageSize::Custom {
            width: 200.0,
            height: 200.0,
        },
        margins: Margins::all(10.0),
        ..Default::default()
    }
}

pub fn lay_out_with(config: LayoutConfig, children: Vec<Node>) -> LayoutTree {
    lay_out_document(config, DocumentInfo::default(), children)
}

pub fn lay_out_document(config: LayoutConfig, info: DocumentInfo, children: Vec<Node>) -> LayoutTree {
    init_logger();
    let engine = LayoutEngine::new(config, Arc::new(StandardFontMetrics)).unwrap();
    engine.layout_document(&Node::document(info, children)).unwrap()
}

pub fn lay_out(children: Vec<Node>) -> LayoutTree {
    lay_out_with(LayoutConfig::default(), children)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Every box of every page, nested ones included, with its page index.
pub fn all_boxes(tree: &LayoutTree) -> Vec<(usize, &PositionedBox)> {
    tree.pages
        .iter()
        .flat_map(|page| page.all_boxes().into_iter().map(move |b| (page.index, b)))
        .collect()
}

/// Words of all text in paint order, spaces and line structure removed.
pub fn words(tree: &LayoutTree) -> Vec<String> {
    all_boxes(tree)
        .into_iter()
        .filter_map(|(_, b)| match &b.content {
            BoxContent::Text(block) => Some(block.text()),
            _ => None,
        })
        .flat_map(|text| text.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

/// Asserts that no box outside an oversized one leaves its page's content area.
pub fn assert_contained(tree: &LayoutTree) {
    for page in &tree.pages {
        for b in page.all_boxes() {
            if b.oversized {
                continue;
            }
            assert!(
                page.content_area.contains(&b.rect),
                "box {} at {:?} leaves the content area {:?} of page {}",
                b.source,
                b.rect,
                page.content_area,
                page.index
            );
        }
    }
}
