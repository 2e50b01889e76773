//! Metrics read from caller-supplied TrueType/OpenType font bytes.
//!
//! Font *loading* stays outside the pipeline: callers hand over bytes, this provider
//! only reads advance widths and vertical metrics from them.

use crate::measurement::{FontSpec, MeasurementError, MeasurementProvider, TextMetrics};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl FaceKey {
    fn new(font: &FontSpec) -> Self {
        Self {
            family: font.family.trim().to_lowercase(),
            bold: font.bold,
            italic: font.italic,
        }
    }
}

#[derive(Debug)]
struct RegisteredFace {
    data: Arc<[u8]>,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    line_gap: f32,
}

/// A [`MeasurementProvider`] over registered font faces.
///
/// Glyph advances are cached per face; the cache sits behind an `RwLock` so concurrent
/// renders only contend on first use of a glyph.
#[derive(Debug, Default)]
pub struct TrueTypeMetrics {
    faces: HashMap<FaceKey, RegisteredFace>,
    advance_cache: RwLock<HashMap<(FaceKey, char), f32>>,
}

impl TrueTypeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a face for `font`'s family and style axes.
    pub fn register(&mut self, font: &FontSpec, data: impl Into<Arc<[u8]>>) -> Result<(), MeasurementError> {
        let data: Arc<[u8]> = data.into();
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| MeasurementError::InvalidFont(e.to_string()))?;
        let registered = RegisteredFace {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            line_gap: face.line_gap() as f32,
            data: data.clone(),
        };
        log::debug!(
            "Registered font face '{}' (bold: {}, italic: {})",
            font.family,
            font.bold,
            font.italic
        );
        self.faces.insert(FaceKey::new(font), registered);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        let family = family.trim().to_lowercase();
        self.faces.keys().any(|k| k.family == family)
    }

    /// Exact match first, then any face of the same family.
    fn lookup(&self, font: &FontSpec) -> Option<(FaceKey, &RegisteredFace)> {
        let key = FaceKey::new(font);
        if let Some(face) = self.faces.get(&key) {
            return Some((key, face));
        }
        let mut same_family: Vec<_> = self.faces.iter().filter(|(k, _)| k.family == key.family).collect();
        same_family.sort_by_key(|(k, _)| (k.bold != font.bold, k.italic != font.italic));
        same_family.into_iter().next().map(|(k, f)| (k.clone(), f))
    }

    fn advance_units(&self, key: &FaceKey, face: &RegisteredFace, c: char) -> Result<f32, MeasurementError> {
        let cache_key = (key.clone(), c);
        {
            let cache = self
                .advance_cache
                .read()
                .map_err(|e| MeasurementError::LockPoisoned(e.to_string()))?;
            if let Some(advance) = cache.get(&cache_key) {
                return Ok(*advance);
            }
        }

        let parsed =
            ttf_parser::Face::parse(&face.data, 0).map_err(|e| MeasurementError::InvalidFont(e.to_string()))?;
        let advance = parsed
            .glyph_index(c)
            .or_else(|| parsed.glyph_index('?'))
            .and_then(|g| parsed.glyph_hor_advance(g))
            .map(|a| a as f32)
            .unwrap_or(face.units_per_em / 2.0);

        self.advance_cache
            .write()
            .map_err(|e| MeasurementError::LockPoisoned(e.to_string()))?
            .insert(cache_key, advance);
        Ok(advance)
    }
}

impl MeasurementProvider for TrueTypeMetrics {
    fn measure(&self, text: &str, font: &FontSpec, size: f32) -> Result<TextMetrics, MeasurementError> {
        let (key, face) = self
            .lookup(font)
            .ok_or_else(|| MeasurementError::FontUnavailable(font.family.clone()))?;
        let scale = size / face.units_per_em;
        let advance_widths = text
            .chars()
            .map(|c| self.advance_units(&key, face, c).map(|units| units * scale))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TextMetrics {
            advance_widths,
            line_height: (face.ascender - face.descender + face.line_gap) * scale,
            ascent: (face.ascender + face.line_gap / 2.0) * scale,
        })
    }
}
