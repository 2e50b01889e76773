//! Image XObjects, deduplicated by content hash.

use crate::writer::PdfWriter;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use folio_ast::ImageData;
use folio_layout::{BoxContent, ImageBox, LayoutTree};
use folio_render_core::RenderError;
use folio_traits::ImageKind;
use image::{ColorType, ImageFormat};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use md5::{Digest, Md5};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Seek, Write};

#[cfg(feature = "parallel-render")]
use rayon::prelude::*;

pub type ContentHash = [u8; 16];

pub fn content_hash(data: &ImageData) -> ContentHash {
    Md5::digest(data.as_bytes()).into()
}

#[derive(Default)]
pub struct ImageRegistry {
    names: HashMap<ContentHash, String>,
    resources: BTreeMap<String, ObjectId>,
}

impl ImageRegistry {
    /// Encodes every distinct image of the tree once and buffers its XObject.
    pub fn prepare<W: Write + Seek>(
        tree: &LayoutTree,
        writer: &mut PdfWriter<W>,
    ) -> Result<Self, RenderError> {
        let mut seen = HashSet::new();
        let mut unique: Vec<(ContentHash, &ImageBox)> = Vec::new();
        for page in &tree.pages {
            for positioned in page.all_boxes() {
                if let BoxContent::Image(image) = &positioned.content {
                    let hash = content_hash(&image.data);
                    if seen.insert(hash) {
                        unique.push((hash, image));
                    }
                }
            }
        }

        #[cfg(feature = "parallel-render")]
        let encoded: Vec<Result<Stream, RenderError>> =
            unique.par_iter().map(|(_, image)| encode_image(image)).collect();
        #[cfg(not(feature = "parallel-render"))]
        let encoded: Vec<Result<Stream, RenderError>> =
            unique.iter().map(|(_, image)| encode_image(image)).collect();

        let mut registry = ImageRegistry::default();
        for ((hash, _), stream) in unique.iter().zip(encoded) {
            let id = writer.buffer_object(Object::Stream(stream?));
            let name = format!("Im{}", registry.names.len() + 1);
            registry.names.insert(*hash, name.clone());
            registry.resources.insert(name, id);
        }
        log::debug!("Embedded {} distinct images", registry.len());
        Ok(registry)
    }

    pub fn name_for(&self, data: &ImageData) -> Option<&str> {
        self.names.get(&content_hash(data)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn resource_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for (name, id) in &self.resources {
            dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        dict
    }
}

/// JPEG data passes through as `DCTDecode`; anything else is decoded, flattened over white
/// and stored as Flate-compressed RGB.
fn encode_image(image: &ImageBox) -> Result<Stream, RenderError> {
    let bytes = image.data.as_bytes();
    if image.kind == ImageKind::Jpeg {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        let color_space = match decoded.color() {
            ColorType::L8 | ColorType::L16 => "DeviceGray",
            _ => "DeviceRGB",
        };
        let dict = image_dictionary(decoded.width(), decoded.height(), color_space, "DCTDecode");
        return Ok(Stream::new(dict, bytes.to_vec()));
    }

    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        for channel in [r, g, b] {
            rgb.push(over_white(channel, a));
        }
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&rgb)?;
    let compressed = encoder.finish()?;
    let dict = image_dictionary(width, height, "DeviceRGB", "FlateDecode");
    Ok(Stream::new(dict, compressed))
}

fn image_dictionary(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8i64,
        "Filter" => Object::Name(filter.as_bytes().to_vec()),
    }
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u16, alpha as u16);
    ((c * a + 255 * (255 - a)) / 255) as u8
}
