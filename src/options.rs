//! Caller-facing render options.

use folio_layout::LayoutConfig;
use folio_style::dimension::MM;
use folio_style::{Margins, PageSize, Style};
use serde::{Deserialize, Deserializer, Serialize};

/// Options of a render call. Every field has a default, so `{}` is a valid JSON options object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// A preset (`"A4"`, `"letter"`), explicit dimensions (`"210mm 297mm"`), or
    /// `{"custom": {"width": .., "height": ..}}` in points.
    #[serde(deserialize_with = "page_size_from_any")]
    pub page_size: PageSize,
    pub margins: Margins,
    /// Family used for all text without an override, and for text whose family cannot be measured.
    pub default_font: String,
    pub default_font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    pub min_column_width: f32,
    pub list_indent: f32,
    /// Open with a cover page showing title, subject, author, place and date.
    pub cover_page: bool,
    /// Title and subject in the header, author with place and date in the footer.
    pub running_header: bool,
    /// Page number line, e.g. `"Page {page}/{pages}"`.
    pub page_numbers: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: Margins::all(20.0 * MM),
            default_font: "Helvetica".to_string(),
            default_font_size: 10.0,
            line_height: 1.5,
            min_column_width: 36.0,
            list_indent: 18.0,
            cover_page: false,
            running_header: false,
            page_numbers: None,
        }
    }
}

impl RenderOptions {
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_default_font(mut self, family: impl Into<String>, size: f32) -> Self {
        self.default_font = family.into();
        self.default_font_size = size;
        self
    }

    /// Adds the cover page, running header and footer, and `Page {page}/{pages}` numbers.
    pub fn with_front_matter(mut self) -> Self {
        self.cover_page = true;
        self.running_header = true;
        self.page_numbers = Some("Page {page}/{pages}".to_string());
        self
    }

    /// The layout configuration these options describe.
    pub fn to_layout_config(&self) -> LayoutConfig {
        let defaults = Style {
            font_family: self.default_font.clone(),
            font_size: self.default_font_size,
            line_height: self.line_height,
            ..Style::default()
        };
        LayoutConfig {
            page_size: self.page_size,
            margins: self.margins,
            min_column_width: self.min_column_width,
            list_indent: self.list_indent,
            fallback_font_family: self.default_font.clone(),
            defaults,
            cover_page: self.cover_page,
            running_header: self.running_header,
            page_numbers: self.page_numbers.clone(),
            ..LayoutConfig::default()
        }
    }
}

fn page_size_from_any<'de, D>(deserializer: D) -> Result<PageSize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PageSizeInput {
        Text(String),
        Typed(PageSize),
    }

    match PageSizeInput::deserialize(deserializer)? {
        PageSizeInput::Text(text) => text.parse().map_err(serde::de::Error::custom),
        PageSizeInput::Typed(size) => Ok(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
        let config = options.to_layout_config();
        assert_eq!(config.page_size, PageSize::A4);
        assert!((config.margins.left - 56.69).abs() < 0.01);
        assert_eq!(config.defaults.font_family, "Helvetica");
    }

    #[test]
    fn page_size_accepts_names_dimensions_and_custom() {
        let options: RenderOptions = serde_json::from_str(r#"{"pageSize": "Letter"}"#).unwrap();
        assert_eq!(options.page_size, PageSize::Letter);

        let options: RenderOptions = serde_json::from_str(r#"{"pageSize": "100mm x 50mm"}"#).unwrap();
        let (w, h) = options.page_size.dimensions_pt();
        assert!((w - 100.0 * MM).abs() < 0.01);
        assert!((h - 50.0 * MM).abs() < 0.01);

        let options: RenderOptions =
            serde_json::from_str(r#"{"pageSize": {"custom": {"width": 300, "height": 400}}}"#).unwrap();
        assert_eq!(options.page_size, PageSize::Custom { width: 300.0, height: 400.0 });

        assert!(serde_json::from_str::<RenderOptions>(r#"{"pageSize": "B9"}"#).is_err());
    }

    #[test]
    fn font_options_reach_the_cascade_defaults() {
        let options: RenderOptions = serde_json::from_str(
            r#"{"defaultFont": "Times", "defaultFontSize": 12, "lineHeight": 1.2, "margins": "1in"}"#,
        )
        .unwrap();
        let config = options.to_layout_config();
        assert_eq!(config.defaults.font_family, "Times");
        assert_eq!(config.defaults.font_size, 12.0);
        assert_eq!(config.defaults.line_height, 1.2);
        assert_eq!(config.fallback_font_family, "Times");
        assert_eq!(config.margins, Margins::all(72.0));
    }

    #[test]
    fn front_matter_options_reach_the_layout() {
        let options: RenderOptions = serde_json::from_str(
            r#"{"coverPage": true, "runningHeader": true, "pageNumbers": "Strona {page}/{pages}"}"#,
        )
        .unwrap();
        let config = options.to_layout_config();
        assert!(config.cover_page);
        assert!(config.running_header);
        assert_eq!(config.page_numbers.as_deref(), Some("Strona {page}/{pages}"));

        let config = RenderOptions::default().to_layout_config();
        assert!(!config.cover_page && !config.running_header);
        assert_eq!(config.page_numbers, None);
    }
}
