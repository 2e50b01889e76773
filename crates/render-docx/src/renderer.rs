use crate::document::DocumentWriter;
use crate::media::MediaRegistry;
use crate::package::{
    Package, REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES, REL_OFFICE_DOCUMENT, REL_STYLES, Relationships,
};
use crate::properties::{app_xml, core_xml};
use crate::running::running_parts;
use crate::styles::StyleRegistry;
use folio_layout::LayoutTree;
use folio_render_core::{OutputFormat, RenderError, Renderer};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const CORE_PART: &str = "docProps/core.xml";
const APP_PART: &str = "docProps/app.xml";

const CT_DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// The DOCX backend. Rebuilds a flowing document from the paginated tree: paragraphs split
/// across pages are rejoined and page breaks survive only where the document asked for them.
/// A cover page becomes its own section; running text becomes header and footer parts.
/// Inline attachments are written as their text only.
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DocxRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn render(&self, tree: &LayoutTree) -> Result<Vec<u8>, RenderError> {
        let mut styles = StyleRegistry::default();
        let mut media = MediaRegistry::default();
        let mut document_rels = Relationships::default();
        document_rels.add(REL_STYLES, "styles.xml");

        let (header, footer) = running_parts(&tree.running, &mut document_rels)?;
        let document = DocumentWriter::new(&mut styles, &mut media, &mut document_rels)?
            .with_running(
                header.as_ref().map(|part| part.rel_id.clone()),
                footer.as_ref().map(|part| part.rel_id.clone()),
            )
            .write(tree)?;

        let mut package = Package::new();
        package.add_part(DOCUMENT_PART, Some(CT_DOCUMENT), document);
        package.add_part(STYLES_PART, Some(CT_STYLES), styles.to_xml(tree.info.language.as_deref())?);
        for part in header.into_iter().chain(footer) {
            package.add_part(part.part_name, Some(part.content_type), part.xml);
        }
        for item in media.items() {
            package.add_default(item.kind.extension(), item.kind.mime_type());
            package.add_part(item.part_name.clone(), None, item.data.as_bytes().to_vec());
        }
        package.add_part(CORE_PART, Some(CT_CORE), core_xml(&tree.info)?);
        package.add_part(APP_PART, Some(CT_APP), app_xml(&tree.info, tree.page_count())?);

        let mut root_rels = Relationships::default();
        root_rels.add(REL_OFFICE_DOCUMENT, DOCUMENT_PART);
        root_rels.add(REL_CORE_PROPERTIES, CORE_PART);
        root_rels.add(REL_EXTENDED_PROPERTIES, APP_PART);
        package.set_relationships("", root_rels);
        package.set_relationships(DOCUMENT_PART, document_rels);

        log::debug!(
            "Rendering DOCX with {} paragraph styles and {} media parts",
            styles.len(),
            media.items().len()
        );
        package.into_zip()
    }
}
