//! Built-in metrics for the PDF base-14 text faces.
//!
//! Widths are the Adobe AFM advance widths (thousandths of an em) for the printable ASCII
//! range. These faces need no font files, which makes this provider fully deterministic.

use crate::measurement::{FontSpec, MeasurementError, MeasurementProvider, TextMetrics};

/// A base-14 face a PDF viewer is guaranteed to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

#[derive(Clone, Copy)]
enum Family {
    Helvetica,
    Times,
    Courier,
}

impl StandardFont {
    /// Maps a family name (including common aliases) and style axes to a base-14 face.
    pub fn resolve(font: &FontSpec) -> Option<StandardFont> {
        let family = match font.family.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans-serif" | "sans" | "liberation sans" => Family::Helvetica,
            "times" | "times-roman" | "times roman" | "times new roman" | "serif" => Family::Times,
            "courier" | "courier new" | "monospace" | "mono" => Family::Courier,
            _ => return None,
        };
        Some(match (family, font.bold, font.italic) {
            (Family::Helvetica, false, false) => StandardFont::Helvetica,
            (Family::Helvetica, true, false) => StandardFont::HelveticaBold,
            (Family::Helvetica, false, true) => StandardFont::HelveticaOblique,
            (Family::Helvetica, true, true) => StandardFont::HelveticaBoldOblique,
            (Family::Times, false, false) => StandardFont::TimesRoman,
            (Family::Times, true, false) => StandardFont::TimesBold,
            (Family::Times, false, true) => StandardFont::TimesItalic,
            (Family::Times, true, true) => StandardFont::TimesBoldItalic,
            (Family::Courier, false, false) => StandardFont::Courier,
            (Family::Courier, true, false) => StandardFont::CourierBold,
            (Family::Courier, false, true) => StandardFont::CourierOblique,
            (Family::Courier, true, true) => StandardFont::CourierBoldOblique,
        })
    }

    /// The PostScript name used as `/BaseFont`.
    pub fn base_font_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Ascender and descender in thousandths of an em.
    fn vertical_metrics(&self) -> (f32, f32) {
        match self.family() {
            Family::Helvetica => (718.0, -207.0),
            Family::Times => (683.0, -217.0),
            Family::Courier => (629.0, -157.0),
        }
    }

    fn family(&self) -> Family {
        match self {
            StandardFont::Helvetica
            | StandardFont::HelveticaBold
            | StandardFont::HelveticaOblique
            | StandardFont::HelveticaBoldOblique => Family::Helvetica,
            StandardFont::TimesRoman
            | StandardFont::TimesBold
            | StandardFont::TimesItalic
            | StandardFont::TimesBoldItalic => Family::Times,
            _ => Family::Courier,
        }
    }

    // Italic faces share their upright widths.
    fn width_table(&self) -> Option<&'static [u16; 95]> {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => Some(&HELVETICA),
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => Some(&HELVETICA_BOLD),
            StandardFont::TimesRoman | StandardFont::TimesItalic => Some(&TIMES_ROMAN),
            StandardFont::TimesBold | StandardFont::TimesBoldItalic => Some(&TIMES_BOLD),
            _ => None,
        }
    }

    /// Advance width of `c` in thousandths of an em.
    pub fn char_width(&self, c: char) -> u16 {
        let Some(table) = self.width_table() else {
            return 600;
        };
        match c {
            ' '..='~' => table[c as usize - 32],
            '\u{a0}' => table[0],
            '\u{2022}' => 350,
            '\u{2013}' => 500,
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => 333,
            '\u{201c}' | '\u{201d}' => 444,
            // Digits are a representative average for the rest of Latin-1.
            _ => table['0' as usize - 32],
        }
    }
}

/// Measures text set in the base-14 faces. Unknown families are reported as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFontMetrics;

impl StandardFontMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl MeasurementProvider for StandardFontMetrics {
    fn measure(&self, text: &str, font: &FontSpec, size: f32) -> Result<TextMetrics, MeasurementError> {
        let face = StandardFont::resolve(font)
            .ok_or_else(|| MeasurementError::FontUnavailable(font.family.clone()))?;
        let scale = size / 1000.0;
        let (ascender, descender) = face.vertical_metrics();
        Ok(TextMetrics {
            advance_widths: text.chars().map(|c| face.char_width(c) as f32 * scale).collect(),
            line_height: (ascender - descender) * scale * 1.2,
            ascent: ascender * scale + (ascender - descender) * scale * 0.1,
        })
    }
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];
