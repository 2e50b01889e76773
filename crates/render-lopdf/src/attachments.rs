//! Embedded files shown as file attachment annotations next to the text that links them.

use crate::fonts::text_string;
use crate::writer::PdfWriter;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use folio_layout::{AttachmentLink, TextBlock};
use folio_render_core::RenderError;
use folio_render_core::utils::flip_y;
use folio_types::Rect;
use lopdf::{Object, Stream, dictionary};
use md5::{Digest, Md5};
use std::io::{Seek, Write};

/// An annotation waiting for its page to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAnnotation {
    /// Icon area in layout coordinates.
    pub rect: Rect,
    pub link: AttachmentLink,
}

/// One annotation per attachment in `block`, a square icon the size of the text placed
/// just after its last span.
pub fn block_annotations(block: &TextBlock) -> Vec<FileAnnotation> {
    let mut out: Vec<FileAnnotation> = Vec::new();
    let mut open = false;
    for line in &block.lines {
        for span in &line.spans {
            let Some(link) = &span.style.attachment else {
                open = false;
                continue;
            };
            let size = span.style.size;
            let rect = Rect::new(span.x + span.width, line.rect.y, size, size);
            match out.last_mut() {
                Some(last) if open && last.link == *link => last.rect = rect,
                _ => out.push(FileAnnotation {
                    rect,
                    link: link.clone(),
                }),
            }
            open = true;
        }
    }
    out
}

/// Buffers the embedded file, its file specification and the annotation, returning the
/// annotation's reference for the page's `/Annots`.
pub fn write_annotation<W: Write + Seek>(
    writer: &mut PdfWriter<W>,
    annotation: &FileAnnotation,
    page_height: f32,
) -> Result<Object, RenderError> {
    let bytes = annotation.link.data.as_bytes();
    let checksum: [u8; 16] = Md5::digest(bytes).into();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    let file = Stream::new(
        dictionary! {
            "Type" => "EmbeddedFile",
            "Filter" => "FlateDecode",
            "Params" => dictionary! {
                "Size" => bytes.len() as i64,
                "CheckSum" => Object::String(checksum.to_vec(), lopdf::StringFormat::Hexadecimal),
            },
        },
        encoder.finish()?,
    );
    let file_id = writer.buffer_object(Object::Stream(file));

    let name = text_string(&annotation.link.file_name);
    let spec_id = writer.buffer_object(
        dictionary! {
            "Type" => "Filespec",
            "F" => name.clone(),
            "UF" => name.clone(),
            "EF" => dictionary! { "F" => file_id, "UF" => file_id },
        }
        .into(),
    );

    let r = annotation.rect;
    let rect: Vec<Object> = vec![
        r.x.into(),
        flip_y(r.y + r.height, page_height).into(),
        (r.x + r.width).into(),
        flip_y(r.y, page_height).into(),
    ];
    let annot_id = writer.buffer_object(
        dictionary! {
            "Type" => "Annot",
            "Subtype" => "FileAttachment",
            "Rect" => rect,
            "FS" => spec_id,
            "Contents" => name,
            "Name" => "PushPin",
            "F" => 4,
        }
        .into(),
    );
    Ok(annot_id.into())
}
