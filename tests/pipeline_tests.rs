mod common;

use common::fixtures::*;
use common::{TestResult, init_logger};
use folio::{
    FolioError, LayoutError, Node, NodeKind, OutputFormat, PipelineBuilder, RenderOptions, StyleProperty,
    render_document,
};

#[test]
fn test_rendering_is_idempotent_for_every_format() -> TestResult {
    init_logger();
    let options = RenderOptions::default();
    for format in [OutputFormat::Pdf, OutputFormat::Docx, OutputFormat::Html] {
        let first = render_document(&report(), format, &options)?;
        let second = render_document(&report(), format, &options)?;
        assert_eq!(first.bytes, second.bytes, "{} output differs between runs", format);
        assert_eq!(first.format, format);
    }
    Ok(())
}

#[test]
fn test_untitled_sections_do_not_change_output() -> TestResult {
    init_logger();
    let leaves = || vec![Node::text_paragraph("one"), Node::text_paragraph("two"), Node::text_paragraph("three")];
    let flat = document(leaves());
    let mut nested_leaves = leaves();
    let third = nested_leaves.pop().ok_or("no leaves")?;
    let nested = document(vec![
        Node::sequence(vec![Node::sequence(nested_leaves)]),
        Node::sequence(vec![third]),
    ]);

    let options = RenderOptions::default();
    let a = render_document(&flat, OutputFormat::Pdf, &options)?;
    let b = render_document(&nested, OutputFormat::Pdf, &options)?;
    assert_eq!(a.bytes, b.bytes);
    Ok(())
}

#[test]
fn test_misplaced_node_is_a_fatal_error() {
    init_logger();
    let root = document(vec![Node::text("a bare text run")]);
    let err = render_document(&root, OutputFormat::Pdf, &RenderOptions::default()).unwrap_err();
    match err {
        FolioError::Layout(LayoutError::UnsupportedNodeKind { kind, .. }) => assert_eq!(kind, "TextRun"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_page_break_inside_cell_is_rejected() {
    init_logger();
    let table = Node::table(vec![Node::row(vec![Node::cell(vec![Node::page_break()])])]);
    let err = render_document(&document(vec![table]), OutputFormat::Docx, &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, FolioError::Layout(LayoutError::UnsupportedNodeKind { .. })));
}

#[test]
fn test_malformed_style_names_the_node() {
    init_logger();
    let paragraph = Node::text_paragraph("sized")
        .with_id("bad-size")
        .with_style(StyleProperty::FontSize, "enormous");
    let err = render_document(&document(vec![paragraph]), OutputFormat::Pdf, &RenderOptions::default()).unwrap_err();
    match err {
        FolioError::Layout(LayoutError::UnresolvableStyleProperty { node_id, .. }) => {
            assert_eq!(node_id.as_str(), "bad-size")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_invalid_options_fail_at_build() {
    let err = PipelineBuilder::new()
        .with_options_json(r#"{"margins": "400mm"}"#)
        .and_then(|builder| builder.build())
        .unwrap_err();
    assert!(matches!(err, FolioError::Layout(LayoutError::InvalidConfig(_))));
}

#[test]
fn test_non_positive_default_font_size_is_rejected() {
    init_logger();
    let options = RenderOptions {
        default_font_size: -10.0,
        line_height: 0.0,
        ..RenderOptions::default()
    };
    let err = render_document(&report(), OutputFormat::Pdf, &options).unwrap_err();
    assert!(matches!(err, FolioError::Layout(LayoutError::InvalidConfig(_))));
}

#[test]
fn test_render_to_file_infers_format() -> TestResult {
    init_logger();
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new().build()?;

    let pdf_path = dir.path().join("report.pdf");
    let output = pipeline.render_to_file(&report(), &pdf_path)?;
    assert_eq!(output.format, OutputFormat::Pdf);
    assert!(std::fs::read(&pdf_path)?.starts_with(b"%PDF-1.7"));

    let docx_path = dir.path().join("report.DOCX");
    let output = pipeline.render_to_file(&report(), &docx_path)?;
    assert_eq!(output.format, OutputFormat::Docx);
    assert!(std::fs::read(&docx_path)?.starts_with(b"PK"));

    let html_path = dir.path().join("report.htm");
    let output = pipeline.render_to_file(&report(), &html_path)?;
    assert_eq!(output.format, OutputFormat::Html);
    assert!(std::fs::read(&html_path)?.starts_with(b"<!DOCTYPE html>"));

    let odt_path = dir.path().join("report.odt");
    let err = pipeline.render_to_file(&report(), &odt_path).unwrap_err();
    assert!(matches!(err, FolioError::UnsupportedFormat(_)));
    assert!(!odt_path.exists());
    Ok(())
}

#[test]
fn test_failed_render_writes_no_file() -> TestResult {
    init_logger();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.pdf");
    let broken = document(vec![Node::image(b"not an image".to_vec())]);
    let err = PipelineBuilder::new().build()?.render_to_file(&broken, &path).unwrap_err();
    assert!(matches!(err, FolioError::Layout(LayoutError::InvalidImage { .. })));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_json_document_round_trips_through_the_pipeline() -> TestResult {
    init_logger();
    let json = r#"{
        "kind": {"document": {"title": "From JSON"}},
        "children": [
            {"kind": {"section": {"title": "Intro"}}, "children": [
                {"kind": "paragraph", "style": {"text-align": "center"}, "children": [
                    {"kind": {"textRun": {"text": "Hello from JSON"}}}
                ]},
                {"kind": "table", "children": [
                    {"kind": {"tableRow": {"header": true}}, "children": [
                        {"kind": {"tableCell": {}}, "children": [
                            {"kind": "paragraph", "children": [{"kind": {"textRun": {"text": "H"}}}]}
                        ]}
                    ]}
                ]}
            ]}
        ]
    }"#;
    let root: Node = serde_json::from_str(json)?;
    assert!(matches!(root.kind, NodeKind::Document(_)));

    let output = render_document(&root, OutputFormat::Pdf, &RenderOptions::default())?;
    assert_eq!(output.page_count, 1);
    assert!(output.diagnostics.is_empty());
    Ok(())
}

#[cfg(feature = "rayon")]
#[test]
fn test_render_many_matches_sequential_rendering() -> TestResult {
    init_logger();
    let pipeline = PipelineBuilder::new().build()?;
    let roots: Vec<Node> = (0..8)
        .map(|i| document((0..=i).map(long_paragraph).collect()))
        .collect();

    let parallel = pipeline.render_many(&roots, OutputFormat::Pdf);
    assert_eq!(parallel.len(), roots.len());
    for (root, result) in roots.iter().zip(parallel) {
        let sequential = pipeline.render(root, OutputFormat::Pdf)?;
        assert_eq!(result?.bytes, sequential.bytes);
    }
    Ok(())
}
