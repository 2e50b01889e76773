use crate::LopdfRenderer;
use folio_ast::{DocumentInfo, Node};
use folio_layout::{LayoutConfig, LayoutEngine, LayoutTree};
use folio_render_core::Renderer;
use folio_traits::StandardFontMetrics;
use image::{ImageFormat, RgbImage, RgbaImage};
use lopdf::{Document, Object};
use std::io::Cursor;
use std::sync::Arc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn lay_out(info: DocumentInfo, children: Vec<Node>) -> LayoutTree {
    lay_out_with(LayoutConfig::default(), info, children)
}

fn lay_out_with(config: LayoutConfig, info: DocumentInfo, children: Vec<Node>) -> LayoutTree {
    init_logger();
    let engine = LayoutEngine::new(config, Arc::new(StandardFontMetrics)).unwrap();
    engine.layout_document(&Node::document(info, children)).unwrap()
}

fn render(info: DocumentInfo, children: Vec<Node>) -> Vec<u8> {
    LopdfRenderer::new().render(&lay_out(info, children)).unwrap()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, image::Rgba([0, 90, 200, 128]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(width, height, image::Rgb([120, 120, 120]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn mixed_document() -> Vec<Node> {
    vec![
        Node::section(
            "Overview",
            vec![
                Node::paragraph(vec![Node::text("Hello world, "), Node::strong("in bold.")]),
                Node::simple_table(
                    vec!["Name".to_string(), "Qty".to_string()],
                    vec![vec!["Bolts".to_string(), "12".to_string()]],
                ),
            ],
        ),
        Node::page_break(),
        Node::section(
            "Details",
            vec![
                Node::captioned_image(png(40, 20), "A figure"),
                Node::list(false, vec![Node::list_item(vec![Node::text_paragraph("First point")])]),
            ],
        ),
    ]
}

fn subtype_count(doc: &Document, subtype: &[u8]) -> usize {
    doc.objects
        .values()
        .filter(|object| match object {
            Object::Stream(stream) => {
                matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == subtype)
            }
            _ => false,
        })
        .count()
}

fn base_fonts(doc: &Document) -> Vec<String> {
    let mut names: Vec<String> = doc
        .objects
        .values()
        .filter_map(|object| match object {
            Object::Dictionary(dict) => match dict.get(b"BaseFont") {
                Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    names.sort();
    names
}

#[test]
fn xref_offsets_point_at_objects() {
    let bytes = render(DocumentInfo::titled("Offsets"), mixed_document());
    let text = String::from_utf8_lossy(&bytes);
    let startxref = text.rfind("startxref").unwrap();
    let xref_start: usize = text[startxref + "startxref".len()..]
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(bytes[xref_start..].starts_with(b"xref\n"));

    let mut lines = text[xref_start..].lines().skip(1);
    let header: Vec<usize> = lines
        .next()
        .unwrap()
        .split_whitespace()
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(header[0], 0);
    let mut checked = 0;
    for (id, entry) in lines.take(header[1]).enumerate() {
        if !entry.ends_with("n ") {
            continue;
        }
        let offset: usize = entry[..10].parse().unwrap();
        let expected = format!("{} 0 obj", id);
        assert!(
            bytes[offset..].starts_with(expected.as_bytes()),
            "xref entry for object {} points at the wrong offset",
            id
        );
        checked += 1;
    }
    assert!(checked > 10);
}

#[test]
fn output_reparses_with_pages_and_outline() {
    let info = DocumentInfo {
        language: Some("en-GB".into()),
        ..DocumentInfo::titled("Report")
    };
    let bytes = render(info, mixed_document());
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc.get_dictionary(root).unwrap();
    assert!(catalog.get(b"Outlines").is_ok());
    assert!(matches!(catalog.get(b"Lang"), Ok(Object::String(s, _)) if s.as_slice() == b"en-GB"));
    assert!(doc.trailer.get(b"Info").is_ok());
}

#[test]
fn identical_input_gives_identical_bytes() {
    let a = render(DocumentInfo::titled("Same"), mixed_document());
    let b = render(DocumentInfo::titled("Same"), mixed_document());
    assert_eq!(a, b);
}

#[test]
fn images_are_embedded_once_per_content() {
    let picture = png(30, 30);
    let bytes = render(
        DocumentInfo::default(),
        vec![
            Node::image(picture.clone()),
            Node::image(picture),
            Node::image(jpeg(16, 8)),
        ],
    );
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(subtype_count(&doc, b"Image"), 2);
    let filters: Vec<Vec<u8>> = doc
        .objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) => match stream.dict.get(b"Filter") {
                Ok(Object::Name(name)) => Some(name.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert!(filters.contains(&b"DCTDecode".to_vec()));
    assert!(filters.contains(&b"FlateDecode".to_vec()));
}

#[test]
fn base_fonts_follow_weight_and_are_shared() {
    let bytes = render(
        DocumentInfo::default(),
        vec![
            Node::text_paragraph("plain"),
            Node::paragraph(vec![Node::strong("bold")]),
            Node::section("Heading in bold", vec![Node::text_paragraph("plain again")]),
        ],
    );
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(base_fonts(&doc), vec!["Helvetica", "Helvetica-Bold"]);
}

#[test]
fn text_and_list_markers_are_drawn() {
    let bytes = render(
        DocumentInfo::default(),
        vec![
            Node::text_paragraph("Hello world"),
            Node::list(true, vec![Node::list_item(vec![Node::text_paragraph("step")])]),
            Node::list(false, vec![Node::list_item(vec![Node::text_paragraph("dot")])]),
        ],
    );
    assert!(contains(&bytes, b"(Hello world) Tj"));
    assert!(contains(&bytes, b"(1.) Tj"));
    assert!(contains(&bytes, &[b'(', 0x95, b')']));
}

#[test]
fn info_dictionary_carries_metadata() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let info = DocumentInfo {
        author: Some("Jo Doe".into()),
        creation_date: Some(date),
        ..DocumentInfo::titled("Minutes")
    };
    let bytes = render(info, vec![Node::text_paragraph("x")]);
    assert!(contains(&bytes, b"/Title (Minutes)"));
    assert!(contains(&bytes, b"/Author (Jo Doe)"));
    assert!(contains(&bytes, b"/CreationDate (D:20240301093000)"));
}

#[test]
fn empty_document_still_has_a_page() {
    let bytes = render(DocumentInfo::default(), vec![]);
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

fn annotations(doc: &Document) -> Vec<&lopdf::Dictionary> {
    doc.objects
        .values()
        .filter_map(|object| match object {
            Object::Dictionary(dict) if matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == b"FileAttachment") => {
                Some(dict)
            }
            _ => None,
        })
        .collect()
}

#[test]
fn attachments_become_file_annotations() {
    let bytes = render(
        DocumentInfo::default(),
        vec![
            Node::paragraph(vec![
                Node::text("Raw data: "),
                Node::attachment("data.csv", b"a,b\n1,2\n".to_vec(), "data.csv"),
            ]),
            Node::paragraph(vec![Node::attachment("empty.bin", Vec::new(), "nothing inside")]),
        ],
    );
    let doc = Document::load_mem(&bytes).unwrap();
    let annots = annotations(&doc);
    assert_eq!(annots.len(), 2);
    assert_eq!(subtype_count(&doc, b"Image"), 0);

    let page_id = doc.get_pages()[&1];
    let page = doc.get_dictionary(page_id).unwrap();
    assert_eq!(page.get(b"Annots").unwrap().as_array().unwrap().len(), 2);

    let embedded = doc
        .objects
        .values()
        .filter(|object| match object {
            Object::Stream(stream) => {
                matches!(stream.dict.get(b"Type"), Ok(Object::Name(n)) if n.as_slice() == b"EmbeddedFile")
            }
            _ => false,
        })
        .count();
    assert_eq!(embedded, 2);
    assert!(contains(&bytes, b"/F (data.csv)"));
    assert!(contains(&bytes, b"/Name /PushPin"));
}

#[test]
fn front_matter_is_drawn_outside_the_body() {
    let config = LayoutConfig {
        cover_page: true,
        running_header: true,
        page_numbers: Some("Strona {page}/{pages}".to_string()),
        ..LayoutConfig::default()
    };
    let info = DocumentInfo {
        subject: Some("Quarterly".into()),
        author: Some("Jo Doe".into()),
        creation_place: Some("Warsaw".into()),
        ..DocumentInfo::titled("Minutes")
    };
    let tree = lay_out_with(config, info, vec![Node::text_paragraph("body")]);
    let bytes = LopdfRenderer::new().render(&tree).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    assert!(contains(&bytes, b"(Minutes) Tj"));
    assert!(contains(&bytes, b"(Strona 2/2) Tj"));
    assert!(!contains(&bytes, b"(Strona 1/2) Tj"));
    assert!(contains(&bytes, b"(Warsaw) Tj"));
}
