/// Get a font name with the conventional style suffix, e.g. `Georgia,BoldItalic`.
pub fn styled_font_name(base_name: &str, bold: bool, italic: bool) -> String {
    let mut name: String = base_name.chars().filter(|c| !c.is_whitespace()).collect();
    if bold || italic {
        name.push(',');
        if bold && italic {
            name.push_str("BoldItalic");
        } else if bold {
            name.push_str("Bold");
        } else {
            name.push_str("Italic");
        }
    }
    name
}

/// Convert a layout y coordinate (origin top-left) to a bottom-left origin.
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}
