mod common;

use common::fixtures::*;
use common::{TestResult, W_NS, generate_docx, generate_docx_with};
use folio::{Margins, Node, PageSize, RenderOptions};
use roxmltree::Document;

#[test]
fn test_required_parts_and_relationship_targets() -> TestResult {
    let docx = generate_docx(&report())?;
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/core.xml",
        "docProps/app.xml",
        "word/document.xml",
        "word/styles.xml",
        "word/_rels/document.xml.rels",
    ] {
        assert!(docx.parts.contains_key(part), "missing {}", part);
    }

    for (rels, base) in [("_rels/.rels", ""), ("word/_rels/document.xml.rels", "word/")] {
        let xml = docx.xml(rels);
        let doc = Document::parse(&xml)?;
        for target in doc.descendants().filter_map(|n| n.attribute("Target")) {
            let part = format!("{}{}", base, target);
            assert!(docx.parts.contains_key(&part), "{} targets missing {}", rels, part);
        }
    }
    Ok(())
}

#[test]
fn test_overflowing_paragraphs_are_not_duplicated() -> TestResult {
    let paragraphs = (1..=100).map(long_paragraph).collect();
    let docx = generate_docx(&document(paragraphs))?;
    assert!(docx.output.page_count > 3);

    let texts = docx.body_paragraphs();
    assert_eq!(texts.len(), 100);
    for (i, text) in texts.iter().enumerate() {
        assert!(text.starts_with(&format!("Paragraph {} with", i + 1)));
        assert!(text.ends_with("real work to do."));
    }
    assert_eq!(docx.count_elements("word/document.xml", "br"), 0);
    Ok(())
}

#[test]
fn test_table_split_across_pages_is_one_table() -> TestResult {
    let rows: Vec<Vec<String>> = (0..80).map(|i| vec![format!("r{}", i), i.to_string()]).collect();
    let table = Node::simple_table(vec!["Key".to_string(), "Value".to_string()], rows);
    let docx = generate_docx(&document(vec![table]))?;
    assert!(docx.output.page_count >= 2);

    assert_eq!(docx.count_elements("word/document.xml", "tbl"), 1);
    assert_eq!(docx.count_elements("word/document.xml", "tr"), 81);
    assert_eq!(docx.count_elements("word/document.xml", "tblHeader"), 1);
    assert_eq!(docx.count_elements("word/document.xml", "gridCol"), 2);
    Ok(())
}

#[test]
fn test_core_properties_carry_metadata() -> TestResult {
    let docx = generate_docx(&report())?;
    let xml = docx.xml("docProps/core.xml");
    let doc = Document::parse(&xml)?;
    let text_of = |local: &str| {
        doc.descendants()
            .find(|n| n.tag_name().name() == local)
            .and_then(|n| n.text())
            .map(str::to_string)
    };
    assert_eq!(text_of("title").as_deref(), Some("Quarterly report"));
    assert_eq!(text_of("creator").as_deref(), Some("Folio Tests"));
    assert_eq!(text_of("language").as_deref(), Some("en"));
    assert_eq!(text_of("created"), None);

    let app = docx.xml("docProps/app.xml");
    assert!(app.contains(&format!("<Pages>{}</Pages>", docx.output.page_count)));
    Ok(())
}

#[test]
fn test_explicit_breaks_only() -> TestResult {
    let docx = generate_docx(&report())?;
    let xml = docx.xml("word/document.xml");
    let doc = Document::parse(&xml)?;
    let page_breaks = doc
        .descendants()
        .filter(|n| n.has_tag_name((W_NS, "br")) && n.attribute((W_NS, "type")) == Some("page"))
        .count();
    assert_eq!(page_breaks, 1);
    Ok(())
}

#[test]
fn test_landscape_page_is_marked() -> TestResult {
    let options = RenderOptions::default()
        .with_page_size(PageSize::Custom { width: 842.0, height: 595.0 })
        .with_margins(Margins::all(36.0));
    let docx = generate_docx_with(&document(vec![Node::text_paragraph("Wide")]), &options)?;
    let xml = docx.xml("word/document.xml");
    let doc = Document::parse(&xml)?;
    let size = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "pgSz")))
        .ok_or("no pgSz")?;
    assert_eq!(size.attribute((W_NS, "orient")), Some("landscape"));
    assert_eq!(size.attribute((W_NS, "w")), Some("16840"));
    Ok(())
}

#[test]
fn test_media_parts_match_content_types() -> TestResult {
    let docx = generate_docx(&document(vec![Node::image(png(10, 10)), Node::image(jpeg(10, 10))]))?;
    let media: Vec<&String> = docx.parts.keys().filter(|k| k.starts_with("word/media/")).collect();
    assert_eq!(media.len(), 2);

    let types = docx.xml("[Content_Types].xml");
    assert!(types.contains("Extension=\"png\" ContentType=\"image/png\""));
    assert!(types.contains("Extension=\"jpeg\" ContentType=\"image/jpeg\""));
    Ok(())
}

#[test]
fn test_front_matter_uses_header_and_footer_parts() -> TestResult {
    let docx = generate_docx_with(&report(), &RenderOptions::default().with_front_matter())?;
    assert_eq!(docx.body_paragraphs().first().map(String::as_str), Some("Quarterly report"));
    assert!(docx.xml("word/header1.xml").contains("Quarterly report"));
    let footer = docx.xml("word/footer1.xml");
    assert!(footer.contains("Folio Tests"));
    assert!(footer.contains("w:instr=\" PAGE \""));
    assert_eq!(docx.count_elements("word/document.xml", "sectPr"), 2);

    let plain = generate_docx(&report())?;
    assert!(!plain.parts.contains_key("word/header1.xml"));
    assert_eq!(plain.count_elements("word/document.xml", "sectPr"), 1);
    Ok(())
}
