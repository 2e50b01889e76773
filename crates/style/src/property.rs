//! Style property keys and the values a node may override them with.

use crate::border::Border;
use crate::dimension::{Dimension, Margins};
use crate::font::{FontStyle, FontWeight};
use crate::parsers::StyleParseError;
use crate::text::TextAlign;
use folio_types::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of style keys a node can override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProperty {
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    Color,
    TextAlign,
    LineHeight,
    Margin,
    Padding,
    Border,
    BackgroundColor,
    ColumnWidths,
    RowHeight,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 13] = [
        StyleProperty::FontFamily,
        StyleProperty::FontSize,
        StyleProperty::FontWeight,
        StyleProperty::FontStyle,
        StyleProperty::Color,
        StyleProperty::TextAlign,
        StyleProperty::LineHeight,
        StyleProperty::Margin,
        StyleProperty::Padding,
        StyleProperty::Border,
        StyleProperty::BackgroundColor,
        StyleProperty::ColumnWidths,
        StyleProperty::RowHeight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StyleProperty::FontFamily => "font-family",
            StyleProperty::FontSize => "font-size",
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::Color => "color",
            StyleProperty::TextAlign => "text-align",
            StyleProperty::LineHeight => "line-height",
            StyleProperty::Margin => "margin",
            StyleProperty::Padding => "padding",
            StyleProperty::Border => "border",
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::ColumnWidths => "column-widths",
            StyleProperty::RowHeight => "row-height",
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleProperty {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleProperty::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| StyleParseError::Parse(format!("Unknown style property '{}'", s)))
    }
}

/// A style override value. `Raw` text is parsed when the style is resolved.
///
/// Equality follows the serialized form: a typed value equals the raw text it prints as,
/// so `Weight(Bold)` and `Raw("bold")` compare equal.
#[derive(Debug, Clone)]
pub enum StyleValue {
    Raw(String),
    Number(f32),
    Length(f32),
    Family(String),
    Weight(FontWeight),
    FontStyle(FontStyle),
    Color(Color),
    Align(TextAlign),
    Margins(Margins),
    Border(Border),
    Columns(Vec<Dimension>),
    /// Explicitly cleared, e.g. `background-color: none`.
    None,
}

impl PartialEq for StyleValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StyleValue::Number(a), StyleValue::Number(b)) => a == b,
            (StyleValue::Number(_), _) | (_, StyleValue::Number(_)) => false,
            (StyleValue::Raw(a), StyleValue::Raw(b)) => a == b,
            (a, b) => a.to_string() == b.to_string(),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Raw(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Raw(s)
    }
}

impl From<f32> for StyleValue {
    fn from(v: f32) -> Self {
        StyleValue::Number(v)
    }
}

impl From<Color> for StyleValue {
    fn from(c: Color) -> Self {
        StyleValue::Color(c)
    }
}

impl From<Border> for StyleValue {
    fn from(b: Border) -> Self {
        StyleValue::Border(b)
    }
}

impl From<Margins> for StyleValue {
    fn from(m: Margins) -> Self {
        StyleValue::Margins(m)
    }
}

impl From<TextAlign> for StyleValue {
    fn from(a: TextAlign) -> Self {
        StyleValue::Align(a)
    }
}

impl From<FontWeight> for StyleValue {
    fn from(w: FontWeight) -> Self {
        StyleValue::Weight(w)
    }
}

impl From<FontStyle> for StyleValue {
    fn from(s: FontStyle) -> Self {
        StyleValue::FontStyle(s)
    }
}

impl From<Vec<Dimension>> for StyleValue {
    fn from(cols: Vec<Dimension>) -> Self {
        StyleValue::Columns(cols)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Raw(s) | StyleValue::Family(s) => f.write_str(s),
            StyleValue::Number(v) => write!(f, "{}", v),
            StyleValue::Length(v) => write!(f, "{}pt", v),
            StyleValue::Weight(w) => write!(f, "{}", w),
            StyleValue::FontStyle(s) => write!(f, "{}", s),
            StyleValue::Color(c) => write!(f, "{}", c),
            StyleValue::Align(a) => write!(f, "{}", a),
            StyleValue::Margins(m) => write!(f, "{}", m),
            StyleValue::Border(b) => write!(f, "{}", b),
            StyleValue::Columns(cols) => {
                for (i, c) in cols.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            StyleValue::None => f.write_str("none"),
        }
    }
}

impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StyleValue::Number(v) => serializer.serialize_f32(*v),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for StyleValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StyleValueDef {
            Num(f32),
            Str(String),
        }

        match StyleValueDef::deserialize(deserializer) {
            Ok(StyleValueDef::Num(v)) => Ok(StyleValue::Number(v)),
            Ok(StyleValueDef::Str(s)) => Ok(StyleValue::Raw(s)),
            Err(_) => Err(de::Error::custom("style values must be strings or numbers")),
        }
    }
}

/// A node's style overrides, ordered by key for deterministic iteration.
pub type StyleMap = BTreeMap<StyleProperty, StyleValue>;

/// A style value that could not be applied to its property.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot apply '{value}' to '{property}': {source}")]
pub struct PropertyError {
    pub property: StyleProperty,
    pub value: String,
    #[source]
    pub source: StyleParseError,
}
