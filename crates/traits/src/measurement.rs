//! The measurement boundary between layout and font/image metrics.

use folio_ast::ImageData;
use folio_types::Size;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Font family '{0}' is not available")]
    FontUnavailable(String),

    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    #[error("Cannot read image: {0}")]
    Image(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// A font request: family plus the two style axes the pipeline distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            family: family.into(),
            bold,
            italic,
        }
    }

    pub fn regular(family: impl Into<String>) -> Self {
        Self::new(family, false, false)
    }

    /// The same style axes in another family.
    pub fn with_family(&self, family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..self.clone()
        }
    }
}

/// Metrics for one measured run of text, in points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextMetrics {
    /// One advance per `char` of the measured text.
    pub advance_widths: Vec<f32>,
    /// The font's natural line height at this size.
    pub line_height: f32,
    /// Distance from the top of the natural line box to the baseline.
    pub ascent: f32,
}

impl TextMetrics {
    pub fn width(&self) -> f32 {
        self.advance_widths.iter().sum()
    }
}

/// Supplies text and image metrics to the layout engine.
///
/// Implementations must be deterministic for a given input. Any cache they keep is shared
/// between concurrent renders and must allow concurrent reads.
pub trait MeasurementProvider: Send + Sync + Debug {
    fn measure(&self, text: &str, font: &FontSpec, size: f32) -> Result<TextMetrics, MeasurementError>;

    /// Intrinsic size of an image in points (one pixel per point).
    fn image_intrinsic_size(&self, image: &ImageData) -> Result<Size, MeasurementError> {
        crate::image_info::intrinsic_size(image)
    }
}
