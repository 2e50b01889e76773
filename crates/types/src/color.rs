use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// An opaque sRGB color.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value }
    }

    /// Components scaled to `0.0..=1.0`, as PDF color operators expect them.
    pub fn to_unit_rgb(self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }

    /// Uppercase `RRGGBB` without the leading `#`, as OOXML expects it.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse a hex color string (#RGB or #RRGGBB format)
    pub fn from_hex(s: &str) -> Result<Color, String> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("Color must start with #, got: {}", s))?;
        let component = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|e| format!("Invalid color component '{}': {}", digits, e))
        };

        match hex.len() {
            3 => {
                let r = component(&hex[0..1].repeat(2))?;
                let g = component(&hex[1..2].repeat(2))?;
                let b = component(&hex[2..3].repeat(2))?;
                Ok(Color { r, g, b })
            }
            6 => Ok(Color {
                r: component(&hex[0..2])?,
                g: component(&hex[2..4])?,
                b: component(&hex[4..6])?,
            }),
            _ => Err(format!("Invalid hex color length: expected 3 or 6, got {}", hex.len())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map { r: u8, g: u8, b: u8 },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => Self::from_hex(&s).map_err(de::Error::custom),
            ColorDef::Map { r, g, b } => Ok(Color { r, g, b }),
        }
    }
}
