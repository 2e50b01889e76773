pub mod image_info;
pub mod measurement;
pub mod standard;
pub mod truetype;

pub use image_info::{ImageKind, intrinsic_size, sniff_kind};
pub use measurement::{FontSpec, MeasurementError, MeasurementProvider, TextMetrics};
pub use standard::{StandardFont, StandardFontMetrics};
pub use truetype::TrueTypeMetrics;
