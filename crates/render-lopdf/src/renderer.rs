use crate::attachments::write_annotation;
use crate::content::PageContext;
use crate::fonts::{FontRegistry, text_string};
use crate::images::ImageRegistry;
use crate::outline::build_outlines;
use crate::writer::PdfWriter;
use folio_ast::DocumentInfo;
use folio_layout::{LayoutTree, Page};
use folio_render_core::{OutputFormat, RenderError, Renderer};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use std::io::{Cursor, Seek, Write};

/// The PDF backend.
#[derive(Debug, Clone)]
pub struct LopdfRenderer {
    version: &'static str,
    producer: String,
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self {
            version: "1.7",
            producer: format!("folio {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LopdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the whole document into `writer`.
    pub fn render_to<W: Write + Seek>(&self, tree: &LayoutTree, writer: W) -> Result<W, RenderError> {
        let mut writer = PdfWriter::new(writer, self.version)?;
        let images = ImageRegistry::prepare(tree, &mut writer)?;
        let mut fonts = FontRegistry::default();

        let mut page_ids = Vec::with_capacity(tree.pages.len());
        for page in &tree.pages {
            page_ids.push(self.write_page(page, &mut writer, &mut fonts, &images)?);
        }

        let mut resources = dictionary! { "Font" => fonts.resource_dictionary() };
        if !images.is_empty() {
            resources.set("XObject", images.resource_dictionary());
        }
        writer.buffer_object_at_id(writer.resources_id, resources.into());

        let outline = build_outlines(&mut writer, &tree.outline, &page_ids, tree.page_size.height);
        writer.set_outline_root_id(outline);
        writer.set_page_ids(page_ids);
        writer.set_info(self.info_dictionary(&tree.info));
        writer.set_language(tree.info.language.clone());

        log::debug!(
            "Rendering PDF with {} pages, {} font faces, {} images",
            tree.page_count(),
            fonts.face_count(),
            images.len()
        );
        writer.finish()
    }

    fn write_page<W: Write + Seek>(
        &self,
        page: &Page,
        writer: &mut PdfWriter<W>,
        fonts: &mut FontRegistry,
        images: &ImageRegistry,
    ) -> Result<ObjectId, RenderError> {
        let mut ctx = PageContext::new(page.size.height, writer, fonts, images);
        for el in page.boxes.iter().chain(&page.running) {
            ctx.draw_box(el);
        }
        let (content, annotations) = ctx.finish();
        let content_id = writer.buffer_object(Object::Stream(Stream::new(Dictionary::new(), content.encode()?)));

        let media_box: Vec<Object> =
            vec![0.into(), 0.into(), page.size.width.into(), page.size.height.into()];
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => writer.pages_id,
            "MediaBox" => media_box,
            "Contents" => content_id,
            "Resources" => writer.resources_id,
        };
        if !annotations.is_empty() {
            let annots = annotations
                .iter()
                .map(|annotation| write_annotation(writer, annotation, page.size.height))
                .collect::<Result<Vec<_>, _>>()?;
            page_dict.set("Annots", annots);
        }
        Ok(writer.buffer_object(page_dict.into()))
    }

    fn info_dictionary(&self, info: &DocumentInfo) -> Dictionary {
        let mut dict = dictionary! { "Producer" => text_string(&self.producer) };
        let fields = [
            ("Title", &info.title),
            ("Subject", &info.subject),
            ("Author", &info.author),
            ("Creator", &info.creator),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                dict.set(key, text_string(value));
            }
        }
        if let Some(date) = info.creation_date {
            let stamp = format!("D:{}", date.format("%Y%m%d%H%M%S"));
            dict.set("CreationDate", Object::string_literal(stamp.into_bytes()));
        }
        dict
    }
}

impl Renderer for LopdfRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn render(&self, tree: &LayoutTree) -> Result<Vec<u8>, RenderError> {
        Ok(self.render_to(tree, Cursor::new(Vec::new()))?.into_inner())
    }
}
