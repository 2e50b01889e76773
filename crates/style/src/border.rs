use folio_types::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BorderStyle::None => "none",
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
        })
    }
}

/// A uniform border drawn on all four sides of a box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Border {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Color,
}

impl Border {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn solid(width: f32, color: Color) -> Self {
        Self {
            width,
            style: BorderStyle::Solid,
            color,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width > 0.0
    }

    /// Width the border occupies, zero when it is not drawn.
    pub fn effective_width(&self) -> f32 {
        if self.is_visible() { self.width } else { 0.0 }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_visible() {
            return f.write_str("none");
        }
        write!(f, "{}pt {} {}", self.width, self.style, self.color)
    }
}
