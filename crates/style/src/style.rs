//! The resolved style snapshot every node carries after cascading.

use crate::border::Border;
use crate::dimension::{Dimension, Margins};
use crate::font::{FontStyle, FontWeight};
use crate::parsers::{
    StyleParseError, parse_border, parse_color, parse_column_widths, parse_font_family, parse_font_style,
    parse_font_weight, parse_length, parse_shorthand_margins, parse_text_align, run_parser,
};
use crate::property::{PropertyError, StyleMap, StyleProperty, StyleValue};
use crate::text::TextAlign;
use folio_types::Color;

/// An effective style with every property concrete.
///
/// Styles are immutable once resolved: [`Style::with_overrides`] returns a new value and
/// leaves `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: Color,
    pub text_align: TextAlign,
    /// Multiplier of `font_size`.
    pub line_height: f32,
    pub margin: Margins,
    pub padding: Margins,
    pub border: Border,
    pub background_color: Option<Color>,
    pub column_widths: Vec<Dimension>,
    /// Minimum height of a table row.
    pub row_height: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 10.0,
            font_weight: FontWeight::Regular,
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            line_height: 1.5,
            margin: Margins {
                top: 0.0,
                right: 0.0,
                bottom: 6.0,
                left: 0.0,
            },
            padding: Margins::default(),
            border: Border::none(),
            background_color: None,
            column_widths: Vec::new(),
            row_height: 0.0,
        }
    }
}

impl Style {
    /// The vertical advance of one line set in this style.
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Applies every override in `overrides` on top of `self`, returning a new snapshot.
    pub fn with_overrides(&self, overrides: &StyleMap) -> Result<Style, PropertyError> {
        let mut style = self.clone();
        for (property, value) in overrides {
            style.apply(*property, value).map_err(|source| PropertyError {
                property: *property,
                value: value.to_string(),
                source,
            })?;
        }
        Ok(style)
    }

    /// Applies a single override.
    pub fn apply(&mut self, property: StyleProperty, value: &StyleValue) -> Result<(), StyleParseError> {
        let mismatch = || StyleParseError::InvalidValue {
            property: property.name().to_string(),
            value: value.to_string(),
        };

        match (property, value) {
            (StyleProperty::FontFamily, StyleValue::Family(f)) => self.font_family = parse_font_family(f)?,
            (StyleProperty::FontFamily, StyleValue::Raw(s)) => self.font_family = parse_font_family(s)?,

            (StyleProperty::FontSize, StyleValue::Length(v) | StyleValue::Number(v)) => {
                self.font_size = positive(*v).ok_or_else(mismatch)?
            }
            (StyleProperty::FontSize, StyleValue::Raw(s)) => {
                self.font_size = positive(run_parser(parse_length, s)?).ok_or_else(mismatch)?
            }

            (StyleProperty::FontWeight, StyleValue::Weight(w)) => self.font_weight = *w,
            (StyleProperty::FontWeight, StyleValue::Number(n)) => {
                self.font_weight = parse_font_weight(&format!("{}", *n as u16))?
            }
            (StyleProperty::FontWeight, StyleValue::Raw(s)) => self.font_weight = parse_font_weight(s)?,

            (StyleProperty::FontStyle, StyleValue::FontStyle(s)) => self.font_style = *s,
            (StyleProperty::FontStyle, StyleValue::Raw(s)) => self.font_style = parse_font_style(s)?,

            (StyleProperty::Color, StyleValue::Color(c)) => self.color = *c,
            (StyleProperty::Color, StyleValue::Raw(s)) => self.color = run_parser(parse_color, s)?,

            (StyleProperty::TextAlign, StyleValue::Align(a)) => self.text_align = *a,
            (StyleProperty::TextAlign, StyleValue::Raw(s)) => self.text_align = parse_text_align(s)?,

            (StyleProperty::LineHeight, StyleValue::Number(v)) => {
                self.line_height = positive(*v).ok_or_else(mismatch)?
            }
            (StyleProperty::LineHeight, StyleValue::Raw(s)) => {
                let v = s.trim().parse::<f32>().map_err(|_| mismatch())?;
                self.line_height = positive(v).ok_or_else(mismatch)?
            }

            (StyleProperty::Margin, StyleValue::Margins(m)) => self.margin = *m,
            (StyleProperty::Margin, StyleValue::Length(v) | StyleValue::Number(v)) => {
                self.margin = Margins::all(*v)
            }
            (StyleProperty::Margin, StyleValue::Raw(s)) => self.margin = parse_shorthand_margins(s)?,

            (StyleProperty::Padding, StyleValue::Margins(m)) => {
                self.padding = non_negative_margins(*m).ok_or_else(mismatch)?
            }
            (StyleProperty::Padding, StyleValue::Length(v) | StyleValue::Number(v)) => {
                self.padding = non_negative_margins(Margins::all(*v)).ok_or_else(mismatch)?
            }
            (StyleProperty::Padding, StyleValue::Raw(s)) => {
                self.padding = non_negative_margins(parse_shorthand_margins(s)?).ok_or_else(mismatch)?
            }

            (StyleProperty::Border, StyleValue::Border(b)) => self.border = *b,
            (StyleProperty::Border, StyleValue::None) => self.border = Border::none(),
            (StyleProperty::Border, StyleValue::Raw(s)) => self.border = run_parser(parse_border, s)?,

            (StyleProperty::BackgroundColor, StyleValue::Color(c)) => self.background_color = Some(*c),
            (StyleProperty::BackgroundColor, StyleValue::None) => self.background_color = None,
            (StyleProperty::BackgroundColor, StyleValue::Raw(s)) => {
                self.background_color = if s.trim().eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(run_parser(parse_color, s)?)
                }
            }

            (StyleProperty::ColumnWidths, StyleValue::Columns(cols)) => self.column_widths = cols.clone(),
            (StyleProperty::ColumnWidths, StyleValue::Raw(s)) => {
                self.column_widths = run_parser(parse_column_widths, s)?
            }

            (StyleProperty::RowHeight, StyleValue::Length(v) | StyleValue::Number(v)) if *v >= 0.0 => {
                self.row_height = *v
            }
            (StyleProperty::RowHeight, StyleValue::Raw(s)) => {
                let v = run_parser(parse_length, s)?;
                if v < 0.0 {
                    return Err(mismatch());
                }
                self.row_height = v
            }

            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// Returns the typed value of `property` in this snapshot.
    pub fn value(&self, property: StyleProperty) -> StyleValue {
        match property {
            StyleProperty::FontFamily => StyleValue::Family(self.font_family.clone()),
            StyleProperty::FontSize => StyleValue::Length(self.font_size),
            StyleProperty::FontWeight => StyleValue::Weight(self.font_weight),
            StyleProperty::FontStyle => StyleValue::FontStyle(self.font_style),
            StyleProperty::Color => StyleValue::Color(self.color),
            StyleProperty::TextAlign => StyleValue::Align(self.text_align),
            StyleProperty::LineHeight => StyleValue::Number(self.line_height),
            StyleProperty::Margin => StyleValue::Margins(self.margin),
            StyleProperty::Padding => StyleValue::Margins(self.padding),
            StyleProperty::Border => StyleValue::Border(self.border),
            StyleProperty::BackgroundColor => match self.background_color {
                Some(c) => StyleValue::Color(c),
                None => StyleValue::None,
            },
            StyleProperty::ColumnWidths => StyleValue::Columns(self.column_widths.clone()),
            StyleProperty::RowHeight => StyleValue::Length(self.row_height),
        }
    }
}

fn positive(v: f32) -> Option<f32> {
    (v.is_finite() && v > 0.0).then_some(v)
}

fn non_negative_margins(m: Margins) -> Option<Margins> {
    (m.top >= 0.0 && m.right >= 0.0 && m.bottom >= 0.0 && m.left >= 0.0).then_some(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderStyle;

    fn map(entries: &[(StyleProperty, StyleValue)]) -> StyleMap {
        entries.iter().cloned().collect()
    }

    #[test]
    fn raw_overrides_are_parsed() {
        let overrides = map(&[
            (StyleProperty::FontSize, "14pt".into()),
            (StyleProperty::Color, "#336699".into()),
            (StyleProperty::Border, "1pt dashed #000".into()),
            (StyleProperty::Padding, "2pt 4pt".into()),
            (StyleProperty::LineHeight, "1.2".into()),
        ]);
        let style = Style::default().with_overrides(&overrides).unwrap();
        assert_eq!(style.font_size, 14.0);
        assert_eq!(style.color, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(style.border.style, BorderStyle::Dashed);
        assert_eq!(style.padding, Margins { top: 2.0, right: 4.0, bottom: 2.0, left: 4.0 });
        assert!((style.line_advance() - 16.8).abs() < 1e-4);
    }

    #[test]
    fn overrides_do_not_mutate_parent() {
        let parent = Style::default();
        let child = parent
            .with_overrides(&map(&[(StyleProperty::FontWeight, "bold".into())]))
            .unwrap();
        assert_eq!(parent.font_weight, FontWeight::Regular);
        assert!(child.font_weight.is_bold());
    }

    #[test]
    fn malformed_and_mistyped_values_are_rejected() {
        let err = Style::default()
            .with_overrides(&map(&[(StyleProperty::FontSize, "huge".into())]))
            .unwrap_err();
        assert_eq!(err.property, StyleProperty::FontSize);
        assert_eq!(err.value, "huge");

        let err = Style::default()
            .with_overrides(&map(&[(StyleProperty::Color, StyleValue::Length(3.0))]))
            .unwrap_err();
        assert_eq!(err.property, StyleProperty::Color);

        assert!(
            Style::default()
                .with_overrides(&map(&[(StyleProperty::FontSize, StyleValue::Number(-2.0))]))
                .is_err()
        );
    }

    #[test]
    fn value_reflects_applied_override() {
        let style = Style::default()
            .with_overrides(&map(&[(StyleProperty::ColumnWidths, "50% auto".into())]))
            .unwrap();
        assert_eq!(
            style.value(StyleProperty::ColumnWidths),
            StyleValue::Columns(vec![Dimension::Percent(50.0), Dimension::Auto])
        );
        assert_eq!(style.value(StyleProperty::BackgroundColor), StyleValue::None);
    }

    #[test]
    fn style_map_serde_uses_css_text() {
        let overrides = map(&[
            (StyleProperty::FontSize, StyleValue::Number(12.0)),
            (StyleProperty::Color, StyleValue::Color(Color::rgb(255, 0, 0))),
        ]);
        let json = serde_json::to_string(&overrides).unwrap();
        assert_eq!(json, r##"{"font-size":12.0,"color":"#FF0000"}"##);
        let back: StyleMap = serde_json::from_str(&json).unwrap();
        let a = Style::default().with_overrides(&overrides).unwrap();
        let b = Style::default().with_overrides(&back).unwrap();
        assert_eq!(a, b);
    }
}
