//! Header-level inspection of encoded images.

use crate::measurement::MeasurementError;
use folio_ast::ImageData;
use folio_types::Size;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// The encodings backends care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Gif => "gif",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
        }
    }
}

/// Detects the encoding from the leading magic bytes.
pub fn sniff_kind(image: &ImageData) -> Result<ImageKind, MeasurementError> {
    match image::guess_format(image.as_bytes()) {
        Ok(ImageFormat::Png) => Ok(ImageKind::Png),
        Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
        Ok(ImageFormat::Gif) => Ok(ImageKind::Gif),
        Ok(other) => Err(MeasurementError::Image(format!("unsupported image format {:?}", other))),
        Err(e) => Err(MeasurementError::Image(e.to_string())),
    }
}

/// Reads the pixel dimensions from the image header without decoding pixel data.
pub fn intrinsic_size(image: &ImageData) -> Result<Size, MeasurementError> {
    sniff_kind(image)?;
    let (width, height) = ImageReader::new(Cursor::new(image.as_bytes()))
        .with_guessed_format()
        .map_err(|e| MeasurementError::Image(e.to_string()))?
        .into_dimensions()
        .map_err(|e| MeasurementError::Image(e.to_string()))?;
    Ok(Size::new(width as f32, height as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> ImageData {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageData::from(bytes)
    }

    #[test]
    fn reads_png_dimensions() {
        let image = png(40, 10);
        assert_eq!(sniff_kind(&image).unwrap(), ImageKind::Png);
        assert_eq!(intrinsic_size(&image).unwrap(), Size::new(40.0, 10.0));
    }

    #[test]
    fn rejects_garbage() {
        let image = ImageData::from(b"definitely not an image".to_vec());
        assert!(matches!(intrinsic_size(&image), Err(MeasurementError::Image(_))));
    }
}
