#![allow(dead_code)]

pub mod fixtures;

use folio::{Node, OutputFormat, RenderOptions, RenderOutput, render_document};
use lopdf::Document as LopdfDocument;
use roxmltree::Document as XmlDocument;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub output: RenderOutput,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_output(output: RenderOutput) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&output.bytes)?;
        Ok(Self { output, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Decoded content stream of a 1-based page.
    pub fn page_content(&self, page: u32) -> String {
        let pages = self.doc.get_pages();
        let content = pages
            .get(&page)
            .and_then(|id| self.doc.get_page_content(*id).ok())
            .unwrap_or_default();
        String::from_utf8_lossy(&content).into_owned()
    }

    /// The 1-based pages whose content stream contains `text`.
    pub fn pages_containing(&self, text: &str) -> Vec<u32> {
        (1..=self.page_count() as u32)
            .filter(|page| self.page_content(*page).contains(text))
            .collect()
    }

    pub fn all_content(&self) -> String {
        (1..=self.page_count() as u32)
            .map(|page| self.page_content(page))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Wrapper around a generated DOCX archive
pub struct GeneratedDocx {
    pub output: RenderOutput,
    pub parts: BTreeMap<String, Vec<u8>>,
}

impl GeneratedDocx {
    pub fn from_output(output: RenderOutput) -> Result<Self, Box<dyn std::error::Error>> {
        let mut parts = BTreeMap::new();
        {
            let mut archive = ZipArchive::new(Cursor::new(output.bytes.as_slice()))?;
            for i in 0..archive.len() {
                let mut file = archive.by_index(i)?;
                let mut data = Vec::new();
                file.read_to_end(&mut data)?;
                parts.insert(file.name().to_string(), data);
            }
        }
        Ok(Self { output, parts })
    }

    pub fn xml(&self, name: &str) -> String {
        let data = self
            .parts
            .get(name)
            .unwrap_or_else(|| panic!("missing part {}", name));
        String::from_utf8_lossy(data).into_owned()
    }

    /// Text of each body-level `w:p`, with `w:t` contents concatenated.
    pub fn body_paragraphs(&self) -> Vec<String> {
        let xml = self.xml("word/document.xml");
        let doc = XmlDocument::parse(&xml).unwrap();
        let body = doc.descendants().find(|n| n.has_tag_name((W_NS, "body"))).unwrap();
        body.children()
            .filter(|n| n.has_tag_name((W_NS, "p")))
            .map(|p| {
                p.descendants()
                    .filter(|n| n.has_tag_name((W_NS, "t")))
                    .filter_map(|t| t.text())
                    .collect()
            })
            .collect()
    }

    pub fn count_elements(&self, part: &str, local_name: &str) -> usize {
        let xml = self.xml(part);
        let doc = XmlDocument::parse(&xml).unwrap();
        doc.descendants().filter(|n| n.has_tag_name((W_NS, local_name))).count()
    }
}

/// A generated HTML page, kept as text and parsed on demand.
pub struct GeneratedHtml {
    pub output: RenderOutput,
    pub text: String,
}

impl GeneratedHtml {
    pub fn from_output(output: RenderOutput) -> Result<Self, Box<dyn std::error::Error>> {
        let text = String::from_utf8(output.bytes.clone())?;
        Ok(Self { output, text })
    }

    /// The markup after the doctype, as an XML document.
    pub fn parse(&self) -> XmlDocument<'_> {
        let markup = self.text.trim_start_matches("<!DOCTYPE html>");
        XmlDocument::parse(markup).unwrap()
    }

    /// Text content of every element named `tag`, in document order.
    pub fn texts_of(&self, tag: &str) -> Vec<String> {
        self.parse()
            .descendants()
            .filter(|n| n.has_tag_name(tag))
            .map(|n| n.descendants().filter(|t| t.is_text()).filter_map(|t| t.text()).collect())
            .collect()
    }
}

pub fn generate_html_with(root: &Node, options: &RenderOptions) -> Result<GeneratedHtml, Box<dyn std::error::Error>> {
    init_logger();
    GeneratedHtml::from_output(render_document(root, OutputFormat::Html, options)?)
}

pub fn generate_pdf(root: &Node) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    generate_pdf_with(root, &RenderOptions::default())
}

pub fn generate_pdf_with(root: &Node, options: &RenderOptions) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    init_logger();
    GeneratedPdf::from_output(render_document(root, OutputFormat::Pdf, options)?)
}

pub fn generate_docx(root: &Node) -> Result<GeneratedDocx, Box<dyn std::error::Error>> {
    generate_docx_with(root, &RenderOptions::default())
}

pub fn generate_docx_with(root: &Node, options: &RenderOptions) -> Result<GeneratedDocx, Box<dyn std::error::Error>> {
    init_logger();
    GeneratedDocx::from_output(render_document(root, OutputFormat::Docx, options)?)
}

#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $expected:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $expected,
            "expected {} pages, got {}",
            $expected,
            $pdf.page_count()
        );
    };
}

#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $text:expr) => {
        assert!(
            $pdf.all_content().contains($text),
            "PDF content does not contain '{}'",
            $text
        );
    };
}
