//! Paragraph pieces as inline markup: bold and italic runs, line breaks and attachment links.

use crate::markup::Markup;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use folio_layout::SpanStyle;
use folio_render_core::RenderError;
use folio_render_core::flow::Piece;

/// Writes the pieces, wrapping text in `strong`/`em` against the paragraph's `base` style
/// and attachment text in a download link.
pub fn write_pieces(html: &mut Markup, pieces: &[Piece<'_>], base: &SpanStyle) -> Result<(), RenderError> {
    for piece in pieces {
        let (style, text) = match piece {
            Piece::Break => {
                html.void("br", &[])?;
                continue;
            }
            Piece::Text(style, text) => (style, text),
        };
        let link = style.attachment.as_ref().map(|link| {
            let href = format!(
                "data:application/octet-stream;base64,{}",
                STANDARD.encode(link.data.as_bytes())
            );
            (basename(&link.file_name).to_string(), href)
        });
        let wrappers: Vec<&str> = [
            (style.font.bold && !base.font.bold, "strong"),
            (style.font.italic && !base.font.italic, "em"),
        ]
        .into_iter()
        .filter_map(|(on, tag)| on.then_some(tag))
        .collect();

        if let Some((download, href)) = &link {
            html.start(
                "a",
                &[
                    ("download", download.as_str()),
                    ("target", "_blank"),
                    ("rel", "noopener noreferrer"),
                    ("type", "application/octet-stream"),
                    ("href", href.as_str()),
                ],
            )?;
        }
        for tag in &wrappers {
            html.start(tag, &[])?;
        }
        html.text(text)?;
        for tag in wrappers.iter().rev() {
            html.end(tag)?;
        }
        if link.is_some() {
            html.end("a")?;
        }
    }
    Ok(())
}

/// The last path segment of a file name.
fn basename(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}
