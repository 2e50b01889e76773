//! Header and footer parts repeated on every body page.

use crate::package::{REL_FOOTER, REL_HEADER, Relationships};
use crate::styles::W_NS;
use crate::xml::XmlBuilder;
use folio_layout::RunningContent;
use folio_render_core::RenderError;

pub const HEADER_PART: &str = "word/header1.xml";
pub const FOOTER_PART: &str = "word/footer1.xml";
pub const CT_HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
pub const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

/// Half-points of running text.
const RUNNING_SIZE: &str = "16";
/// Twips between the running text and its rule.
const RULE_SPACE: &str = "120";

/// A header or footer part and the relationship id the body section refers to it by.
#[derive(Debug, Clone)]
pub struct HeaderFooterPart {
    pub rel_id: String,
    pub part_name: &'static str,
    pub content_type: &'static str,
    pub xml: Vec<u8>,
}

/// The header and footer parts `running` needs, registered with the document's relationships.
pub fn running_parts(
    running: &RunningContent,
    rels: &mut Relationships,
) -> Result<(Option<HeaderFooterPart>, Option<HeaderFooterPart>), RenderError> {
    let header = if running.header.is_empty() {
        None
    } else {
        Some(HeaderFooterPart {
            rel_id: rels.add(REL_HEADER, "header1.xml"),
            part_name: HEADER_PART,
            content_type: CT_HEADER,
            xml: part_xml("w:hdr", &running.header, "w:bottom", None)?,
        })
    };
    let footer = if running.footer.is_empty() && running.page_number.is_none() {
        None
    } else {
        Some(HeaderFooterPart {
            rel_id: rels.add(REL_FOOTER, "footer1.xml"),
            part_name: FOOTER_PART,
            content_type: CT_FOOTER,
            xml: part_xml("w:ftr", &running.footer, "w:top", running.page_number.as_deref())?,
        })
    };
    Ok((header, footer))
}

/// A right-aligned paragraph of `lines` ruled on `rule_side`, then the page number line.
fn part_xml(root: &str, lines: &[String], rule_side: &str, page_number: Option<&str>) -> Result<Vec<u8>, RenderError> {
    let mut xml = XmlBuilder::new()?;
    xml.start(root, &[("xmlns:w", W_NS)])?;
    if !lines.is_empty() {
        xml.start("w:p", &[])?;
        xml.start("w:pPr", &[])?;
        xml.start("w:pBdr", &[])?;
        xml.empty(
            rule_side,
            &[("w:val", "single"), ("w:sz", "4"), ("w:space", "1"), ("w:color", "auto")],
        )?;
        xml.end("w:pBdr")?;
        xml.empty("w:spacing", &[("w:before", RULE_SPACE), ("w:after", RULE_SPACE)])?;
        xml.val("w:jc", "right")?;
        xml.end("w:pPr")?;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                xml.start("w:r", &[])?;
                xml.empty("w:br", &[])?;
                xml.end("w:r")?;
            }
            write_run(&mut xml, line)?;
        }
        xml.end("w:p")?;
    }
    if let Some(template) = page_number {
        xml.start("w:p", &[])?;
        xml.start("w:pPr", &[])?;
        xml.val("w:jc", "center")?;
        xml.end("w:pPr")?;
        for piece in template_pieces(template) {
            match piece {
                Piece::Text(text) => write_run(&mut xml, text)?,
                Piece::Field(instr) => {
                    xml.start("w:fldSimple", &[("w:instr", instr)])?;
                    write_run(&mut xml, "1")?;
                    xml.end("w:fldSimple")?;
                }
            }
        }
        xml.end("w:p")?;
    }
    xml.end(root)?;
    Ok(xml.finish())
}

fn write_run(xml: &mut XmlBuilder, text: &str) -> Result<(), RenderError> {
    xml.start("w:r", &[])?;
    xml.start("w:rPr", &[])?;
    xml.val("w:sz", RUNNING_SIZE)?;
    xml.val("w:szCs", RUNNING_SIZE)?;
    xml.end("w:rPr")?;
    xml.text_element("w:t", &[("xml:space", "preserve")], text)?;
    xml.end("w:r")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'t> {
    Text(&'t str),
    Field(&'static str),
}

/// Splits a page number template into text and `PAGE`/`NUMPAGES` fields.
fn template_pieces(template: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    loop {
        let next = [("{page}", " PAGE "), ("{pages}", " NUMPAGES ")]
            .into_iter()
            .filter_map(|(placeholder, instr)| rest.find(placeholder).map(|at| (at, placeholder, instr)))
            .min_by_key(|(at, _, _)| *at);
        let Some((at, placeholder, instr)) = next else {
            break;
        };
        if at > 0 {
            out.push(Piece::Text(&rest[..at]));
        }
        out.push(Piece::Field(instr));
        rest = &rest[at + placeholder.len()..];
    }
    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_template_becomes_fields() {
        assert_eq!(
            template_pieces("Strona {page}/{pages}"),
            vec![
                Piece::Text("Strona "),
                Piece::Field(" PAGE "),
                Piece::Text("/"),
                Piece::Field(" NUMPAGES "),
            ]
        );
        assert_eq!(template_pieces("{pages}"), vec![Piece::Field(" NUMPAGES ")]);
        assert_eq!(template_pieces("plain"), vec![Piece::Text("plain")]);
    }

    #[test]
    fn parts_are_registered_only_when_needed() {
        let mut rels = Relationships::default();
        let running = RunningContent {
            page_number: Some("{page}".to_string()),
            ..RunningContent::default()
        };
        let (header, footer) = running_parts(&running, &mut rels).unwrap();
        assert!(header.is_none());
        let footer = footer.unwrap();
        assert_eq!(footer.rel_id, "rId1");
        let xml = String::from_utf8(footer.xml).unwrap();
        assert!(xml.contains("w:instr=\" PAGE \""));
        assert!(!xml.contains("w:pBdr"));
    }
}
