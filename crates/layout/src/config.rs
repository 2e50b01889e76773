use crate::LayoutError;
use folio_style::{Margins, PageSize, Style, StyleMap, StyleProperty, StyleValue};
use folio_style::{Border, FontWeight, dimension::MM};
use folio_types::{Color, Rect, Size};

/// Everything the layout engine needs besides the tree and a measurement provider.
///
/// Passed explicitly through resolution and layout; there is no process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    /// Page margins around the content area.
    pub margins: Margins,
    /// Table columns are not shrunk below this width unless every column already is.
    pub min_column_width: f32,
    /// Horizontal indent of each list nesting level.
    pub list_indent: f32,
    /// Family used when the provider cannot measure a requested one.
    pub fallback_font_family: String,
    /// Document-wide defaults at the root of the cascade.
    pub defaults: Style,
    /// The synthetic layer injected above every Table's own overrides.
    pub table_defaults: StyleMap,
    /// Heading font sizes by section depth; deeper sections reuse the last entry.
    pub heading_sizes: Vec<f32>,
    /// Space above a heading.
    pub heading_spacing: f32,
    /// Start with a cover page set from the document info.
    pub cover_page: bool,
    /// Repeat title and subject above, and author with place and date below, each body page.
    pub running_header: bool,
    /// Page number line for the foot of each body page, e.g. `Page {page}/{pages}`.
    pub page_numbers: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: Margins::all(20.0 * MM),
            min_column_width: 36.0,
            list_indent: 18.0,
            fallback_font_family: "Helvetica".to_string(),
            defaults: Style::default(),
            table_defaults: default_table_layer(),
            heading_sizes: vec![18.0, 14.0, 12.0],
            heading_spacing: 6.0,
            cover_page: false,
            running_header: false,
            page_numbers: None,
        }
    }
}

fn default_table_layer() -> StyleMap {
    let mut layer = StyleMap::new();
    layer.insert(StyleProperty::Border, StyleValue::Border(Border::solid(0.5, Color::BLACK)));
    layer.insert(
        StyleProperty::Padding,
        StyleValue::Margins(Margins {
            top: 2.0,
            right: 4.0,
            bottom: 2.0,
            left: 4.0,
        }),
    );
    layer
}

/// The layer a header row puts beneath its own overrides.
pub(crate) fn header_row_layer() -> StyleMap {
    let mut layer = StyleMap::new();
    layer.insert(StyleProperty::FontWeight, StyleValue::Weight(FontWeight::Bold));
    layer
}

impl LayoutConfig {
    pub fn page_dimensions(&self) -> Size {
        let (width, height) = self.page_size.dimensions_pt();
        Size::new(width, height)
    }

    /// The area inside the page margins.
    pub fn content_area(&self) -> Rect {
        let page = self.page_dimensions();
        Rect::new(
            self.margins.left,
            self.margins.top,
            page.width - self.margins.horizontal(),
            page.height - self.margins.vertical(),
        )
    }

    pub fn heading_size(&self, depth: usize) -> f32 {
        let index = depth.saturating_sub(1).min(self.heading_sizes.len().saturating_sub(1));
        self.heading_sizes
            .get(index)
            .copied()
            .unwrap_or(self.defaults.font_size)
    }

    /// Rejects configurations that leave no room to lay anything out.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let page = self.page_dimensions();
        if !(page.width > 0.0 && page.height > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "page size {}x{} must be positive",
                page.width, page.height
            )));
        }
        let m = &self.margins;
        if m.top < 0.0 || m.right < 0.0 || m.bottom < 0.0 || m.left < 0.0 {
            return Err(LayoutError::InvalidConfig(format!("negative page margins ({})", m)));
        }
        let area = self.content_area();
        if area.width <= 0.0 || area.height <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "margins ({}) leave no content area on a {}x{} page",
                m, page.width, page.height
            )));
        }
        if self.min_column_width < 0.0 || self.list_indent < 0.0 {
            return Err(LayoutError::InvalidConfig(
                "minimum column width and list indent must not be negative".to_string(),
            ));
        }
        let d = &self.defaults;
        if !(d.font_size.is_finite() && d.font_size > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "default font size {} must be positive",
                d.font_size
            )));
        }
        if !(d.line_height.is_finite() && d.line_height > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "default line height {} must be positive",
                d.line_height
            )));
        }
        if self.fallback_font_family.trim().is_empty() {
            return Err(LayoutError::InvalidConfig("fallback font family is empty".to_string()));
        }
        Ok(())
    }
}
