use folio::{DocumentInfo, Node};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

pub fn document(children: Vec<Node>) -> Node {
    Node::document(DocumentInfo::titled("Test document"), children)
}

/// A paragraph long enough to wrap over several lines at A4 width.
pub fn long_paragraph(index: usize) -> Node {
    Node::text_paragraph(format!(
        "Paragraph {} with enough running text to wrap across several lines of an A4 page. \
         It keeps going with more words so that a hundred of these overflow onto many pages \
         and the pagination logic has real work to do.",
        index
    ))
}

/// A small report touching every node kind.
pub fn report() -> Node {
    Node::document(
        DocumentInfo {
            author: Some("Folio Tests".to_string()),
            language: Some("en".to_string()),
            ..DocumentInfo::titled("Quarterly report")
        },
        vec![
            Node::section(
                "Summary",
                vec![
                    Node::paragraph(vec![
                        Node::text("Revenue grew "),
                        Node::strong("12%"),
                        Node::text(" over the "),
                        Node::emphasis("previous"),
                        Node::text(" quarter."),
                    ]),
                    Node::bullet_list(vec!["North region", "South region"]),
                ],
            ),
            Node::section(
                "Figures",
                vec![
                    Node::simple_table(
                        vec!["Region", "Q1", "Q2"],
                        vec![vec!["North", "10", "12"], vec!["South", "8", "9"]],
                    ),
                    Node::captioned_image(png(60, 30), "Figure 1: growth"),
                ],
            ),
            Node::page_break(),
            Node::section("Appendix", vec![Node::text_paragraph("Raw data follows.")]),
        ],
    )
}
