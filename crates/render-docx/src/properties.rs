//! `docProps/core.xml` and `docProps/app.xml`.

use crate::xml::XmlBuilder;
use folio_ast::DocumentInfo;
use folio_render_core::RenderError;

const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const APP_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

pub fn core_xml(info: &DocumentInfo) -> Result<Vec<u8>, RenderError> {
    let mut xml = XmlBuilder::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            ("xmlns:cp", CP_NS),
            ("xmlns:dc", DC_NS),
            ("xmlns:dcterms", DCTERMS_NS),
            ("xmlns:xsi", XSI_NS),
        ],
    )?;
    let fields = [
        ("dc:title", &info.title),
        ("dc:subject", &info.subject),
        ("dc:creator", &info.author),
        ("dc:language", &info.language),
        ("dc:coverage", &info.creation_place),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            xml.text_element(name, &[], value)?;
        }
    }
    if let Some(date) = info.creation_date {
        let stamp = date.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        xml.text_element("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &stamp)?;
    }
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

pub fn app_xml(info: &DocumentInfo, pages: usize) -> Result<Vec<u8>, RenderError> {
    let mut xml = XmlBuilder::new()?;
    xml.start("Properties", &[("xmlns", APP_NS)])?;
    let application = info.creator.as_deref().unwrap_or("folio");
    xml.text_element("Application", &[], application)?;
    xml.text_element("Pages", &[], &pages.to_string())?;
    xml.end("Properties")?;
    Ok(xml.finish())
}
