//! Paragraph styles: each distinct resolved paragraph format becomes a named style.

use crate::units::{half_points, line_spacing, twips};
use crate::xml::XmlBuilder;
use folio_layout::{BlockRole, CoverPart, ParagraphFormat, SpanStyle};
use folio_render_core::RenderError;
use folio_style::TextAlign;
use std::collections::BTreeMap;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Default)]
pub struct StyleRegistry {
    body: Vec<ParagraphFormat>,
    headings: BTreeMap<u8, ParagraphFormat>,
    caption: Option<ParagraphFormat>,
    title: Option<ParagraphFormat>,
}

impl StyleRegistry {
    /// The style id for a paragraph and the format that style defines.
    pub fn style_for(&mut self, role: &BlockRole, format: &ParagraphFormat) -> (String, ParagraphFormat) {
        match role {
            BlockRole::Heading(level) => {
                let level = (*level).clamp(1, 6);
                let defined = self.headings.entry(level).or_insert_with(|| format.clone());
                (format!("Heading{}", level), defined.clone())
            }
            BlockRole::Caption => {
                let defined = self.caption.get_or_insert_with(|| format.clone());
                ("Caption".to_string(), defined.clone())
            }
            BlockRole::Cover(CoverPart::Title) => {
                let defined = self.title.get_or_insert_with(|| format.clone());
                ("Title".to_string(), defined.clone())
            }
            BlockRole::Body | BlockRole::ListItem { .. } | BlockRole::Cover(_) | BlockRole::Running(_) => {
                let index = match self.body.iter().position(|f| f == format) {
                    Some(index) => index,
                    None => {
                        self.body.push(format.clone());
                        self.body.len() - 1
                    }
                };
                (format!("Body{}", index + 1), format.clone())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.body.len() + self.headings.len() + usize::from(self.caption.is_some()) + usize::from(self.title.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_xml(&self, language: Option<&str>) -> Result<Vec<u8>, RenderError> {
        let mut xml = XmlBuilder::new()?;
        xml.start("w:styles", &[("xmlns:w", W_NS)])?;

        xml.start("w:docDefaults", &[])?;
        xml.start("w:rPrDefault", &[])?;
        xml.start("w:rPr", &[])?;
        if let Some(base) = self.body.first().map(|f| &f.base) {
            write_fonts(&mut xml, &base.font.family)?;
            let size = half_points(base.size).to_string();
            xml.val("w:sz", &size)?;
            xml.val("w:szCs", &size)?;
        }
        if let Some(language) = language {
            xml.val("w:lang", language)?;
        }
        xml.end("w:rPr")?;
        xml.end("w:rPrDefault")?;
        xml.start("w:pPrDefault", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:spacing", &[("w:after", "0"), ("w:line", "240"), ("w:lineRule", "auto")])?;
        xml.end("w:pPr")?;
        xml.end("w:pPrDefault")?;
        xml.end("w:docDefaults")?;

        xml.start(
            "w:style",
            &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
        )?;
        xml.val("w:name", "Normal")?;
        xml.empty("w:qFormat", &[])?;
        xml.end("w:style")?;

        for (level, format) in &self.headings {
            let id = format!("Heading{}", level);
            let name = format!("heading {}", level);
            let outline = (level - 1).to_string();
            write_style(&mut xml, &id, &name, format, Some(&outline))?;
        }
        if let Some(format) = &self.title {
            write_style(&mut xml, "Title", "Title", format, None)?;
        }
        if let Some(format) = &self.caption {
            write_style(&mut xml, "Caption", "caption", format, None)?;
        }
        for (i, format) in self.body.iter().enumerate() {
            let id = format!("Body{}", i + 1);
            let name = format!("Body {}", i + 1);
            write_style(&mut xml, &id, &name, format, None)?;
        }

        xml.end("w:styles")?;
        Ok(xml.finish())
    }
}

fn write_style(
    xml: &mut XmlBuilder,
    id: &str,
    name: &str,
    format: &ParagraphFormat,
    outline_level: Option<&str>,
) -> Result<(), RenderError> {
    xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", id)])?;
    xml.val("w:name", name)?;
    xml.val("w:basedOn", "Normal")?;
    xml.val("w:next", "Normal")?;
    xml.empty("w:qFormat", &[])?;
    xml.start("w:pPr", &[])?;
    if outline_level.is_some() {
        xml.empty("w:keepNext", &[])?;
    }
    write_spacing(xml, format)?;
    xml.val("w:jc", jc(format.align))?;
    if let Some(level) = outline_level {
        xml.val("w:outlineLvl", level)?;
    }
    xml.end("w:pPr")?;
    write_run_properties(xml, &format.base, None)?;
    xml.end("w:style")
}

pub fn write_spacing(xml: &mut XmlBuilder, format: &ParagraphFormat) -> Result<(), RenderError> {
    let before = twips(format.margin.top).to_string();
    let after = twips(format.margin.bottom).to_string();
    let line = line_spacing(format.line_height).to_string();
    xml.empty(
        "w:spacing",
        &[
            ("w:before", before.as_str()),
            ("w:after", after.as_str()),
            ("w:line", line.as_str()),
            ("w:lineRule", "auto"),
        ],
    )
}

pub fn jc(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Right => "right",
        TextAlign::Center => "center",
        TextAlign::Justify => "both",
    }
}

fn write_fonts(xml: &mut XmlBuilder, family: &str) -> Result<(), RenderError> {
    xml.empty(
        "w:rFonts",
        &[("w:ascii", family), ("w:hAnsi", family), ("w:cs", family)],
    )
}

/// Writes `w:rPr` for `style`. With a `base`, only the properties that differ from it are
/// written, and nothing at all when none do.
pub fn write_run_properties(
    xml: &mut XmlBuilder,
    style: &SpanStyle,
    base: Option<&SpanStyle>,
) -> Result<(), RenderError> {
    let differs_family = base.is_none_or(|b| b.font.family != style.font.family);
    let differs_bold = base.map_or(style.font.bold, |b| b.font.bold != style.font.bold);
    let differs_italic = base.map_or(style.font.italic, |b| b.font.italic != style.font.italic);
    let differs_color = base.is_none_or(|b| b.color != style.color);
    let differs_size = base.is_none_or(|b| b.size != style.size);
    if !(differs_family || differs_bold || differs_italic || differs_color || differs_size) {
        return Ok(());
    }

    xml.start("w:rPr", &[])?;
    if differs_family {
        write_fonts(xml, &style.font.family)?;
    }
    if differs_bold {
        let on = if style.font.bold { "1" } else { "0" };
        xml.val("w:b", on)?;
        xml.val("w:bCs", on)?;
    }
    if differs_italic {
        let on = if style.font.italic { "1" } else { "0" };
        xml.val("w:i", on)?;
        xml.val("w:iCs", on)?;
    }
    if differs_color {
        xml.val("w:color", &style.color.to_hex())?;
    }
    if differs_size {
        let size = half_points(style.size).to_string();
        xml.val("w:sz", &size)?;
        xml.val("w:szCs", &size)?;
    }
    xml.end("w:rPr")
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::Margins;
    use folio_traits::FontSpec;
    use folio_types::Color;

    fn format(size: f32) -> ParagraphFormat {
        ParagraphFormat {
            align: TextAlign::Left,
            margin: Margins::y(6.0),
            line_height: 1.5,
            base: SpanStyle {
                font: FontSpec::regular("Helvetica"),
                size,
                color: Color::BLACK,
                attachment: None,
            },
        }
    }

    #[test]
    fn equal_formats_share_a_style() {
        let mut styles = StyleRegistry::default();
        let (a, _) = styles.style_for(&BlockRole::Body, &format(10.0));
        let (b, _) = styles.style_for(&BlockRole::Body, &format(10.0));
        let (c, _) = styles.style_for(&BlockRole::Body, &format(12.0));
        assert_eq!(a, "Body1");
        assert_eq!(b, "Body1");
        assert_eq!(c, "Body2");
        let (h, _) = styles.style_for(&BlockRole::Heading(2), &format(14.0));
        assert_eq!(h, "Heading2");
        assert_eq!(styles.len(), 3);
        let (t, _) = styles.style_for(&BlockRole::Cover(CoverPart::Title), &format(24.0));
        assert_eq!(t, "Title");
        let (s, _) = styles.style_for(&BlockRole::Cover(CoverPart::Author), &format(12.0));
        assert_eq!(s, "Body3");
        assert_eq!(styles.len(), 5);
    }

    #[test]
    fn run_properties_only_list_differences() {
        let base = format(10.0).base;
        let mut bold = base.clone();
        bold.font.bold = true;

        let mut xml = XmlBuilder::new().unwrap();
        write_run_properties(&mut xml, &base, Some(&base)).unwrap();
        write_run_properties(&mut xml, &bold, Some(&base)).unwrap();
        let out = String::from_utf8(xml.finish()).unwrap();
        assert!(out.ends_with("<w:rPr><w:b w:val=\"1\"/><w:bCs w:val=\"1\"/></w:rPr>"));
    }
}
