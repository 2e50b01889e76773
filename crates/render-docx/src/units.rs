//! Conversions from points to the integer units OOXML uses.

/// Twentieths of a point: page sizes, margins, indents, spacing, widths.
pub fn twips(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

/// Font sizes.
pub fn half_points(pt: f32) -> i64 {
    (pt * 2.0).round() as i64
}

/// Border widths.
pub fn eighth_points(pt: f32) -> i64 {
    (pt * 8.0).round() as i64
}

/// English Metric Units, for drawing extents.
pub fn emu(pt: f32) -> i64 {
    (pt * 12700.0).round() as i64
}

/// `w:line` with `w:lineRule="auto"` counts 240ths of a single line.
pub fn line_spacing(factor: f32) -> i64 {
    (factor * 240.0).round() as i64
}
