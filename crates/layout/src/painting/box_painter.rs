use crate::elements::{BoxContent, Decoration, PositionedBox, RectPaint, Stroke};
use folio_style::Style;
use folio_types::{NodeId, Rect};

/// The decoration a table cell paints, taken from its resolved style.
pub fn decoration_of(style: &Style) -> Decoration {
    Decoration {
        background: style.background_color,
        border: style.border,
        padding: style.padding,
    }
}

/// A rectangle box painting the background and border of `bounds`, if there is anything to paint.
pub fn create_background_and_borders(bounds: Rect, decoration: &Decoration, source: &NodeId) -> Option<PositionedBox> {
    let stroke = decoration.border.is_visible().then(|| Stroke {
        width: decoration.border.effective_width(),
        color: decoration.border.color,
        style: decoration.border.style,
    });
    if stroke.is_none() && decoration.background.is_none() {
        return None;
    }
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return None;
    }
    Some(PositionedBox::new(
        bounds,
        source.clone(),
        BoxContent::Rect(RectPaint {
            fill: decoration.background,
            stroke,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::Border;
    use folio_types::Color;

    #[test]
    fn nothing_to_paint_yields_no_box() {
        let style = Style::default();
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(create_background_and_borders(bounds, &decoration_of(&style), &NodeId::from("c")).is_none());
    }

    #[test]
    fn fill_and_stroke_share_one_box() {
        let style = Style {
            background_color: Some(Color::WHITE),
            border: Border::solid(1.0, Color::BLACK),
            ..Style::default()
        };
        let bounds = Rect::new(5.0, 5.0, 10.0, 10.0);
        let painted = create_background_and_borders(bounds, &decoration_of(&style), &NodeId::from("c")).unwrap();
        assert_eq!(painted.rect, bounds);
        match painted.content {
            BoxContent::Rect(paint) => {
                assert_eq!(paint.fill, Some(Color::WHITE));
                assert_eq!(paint.stroke.map(|s| s.width), Some(1.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
