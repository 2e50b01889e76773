use crate::diagnostics::{Diagnostics, Warning};
use crate::elements::SpanStyle;
use folio_style::Style;
use folio_traits::{FontSpec, MeasurementProvider, TextMetrics};
use folio_types::NodeId;
use std::collections::HashSet;

/// Width of one character, in em, when no font can be measured.
const ESTIMATED_CHAR_EM: f32 = 0.5;
const ESTIMATED_LINE_EM: f32 = 1.2;
const ESTIMATED_ASCENT_EM: f32 = 0.8;

/// Text measured in the font that was actually used.
#[derive(Debug, Clone)]
pub struct Measured {
    pub metrics: TextMetrics,
    pub font: FontSpec,
}

/// Wraps a [`MeasurementProvider`] with the fallback policy for unavailable fonts.
///
/// An unmeasurable family is reported once per node, measured in the fallback family
/// instead and, if that fails too, estimated.
#[derive(Debug)]
pub struct Measurer<'p> {
    provider: &'p dyn MeasurementProvider,
    fallback_family: String,
    unavailable: HashSet<FontSpec>,
    reported: HashSet<(NodeId, String)>,
}

impl<'p> Measurer<'p> {
    pub fn new(provider: &'p dyn MeasurementProvider, fallback_family: impl Into<String>) -> Self {
        Self {
            provider,
            fallback_family: fallback_family.into(),
            unavailable: HashSet::new(),
            reported: HashSet::new(),
        }
    }

    pub fn font_for(style: &Style) -> FontSpec {
        FontSpec::new(
            style.font_family.clone(),
            style.font_weight.is_bold(),
            style.font_style.is_italic(),
        )
    }

    pub fn measure(
        &mut self,
        text: &str,
        font: &FontSpec,
        size: f32,
        node: &NodeId,
        diagnostics: &mut Diagnostics,
    ) -> Measured {
        if !self.unavailable.contains(font) {
            match self.provider.measure(text, font, size) {
                Ok(metrics) => {
                    return Measured {
                        metrics,
                        font: font.clone(),
                    };
                }
                Err(e) => {
                    log::debug!("Measuring '{}' failed: {}", font.family, e);
                    self.unavailable.insert(font.clone());
                }
            }
        }

        let fallback = font.with_family(self.fallback_family.clone());
        if fallback != *font && !self.unavailable.contains(&fallback) {
            match self.provider.measure(text, &fallback, size) {
                Ok(metrics) => {
                    self.report(node, &font.family, &fallback.family, diagnostics);
                    return Measured {
                        metrics,
                        font: fallback,
                    };
                }
                Err(e) => {
                    log::debug!("Measuring fallback '{}' failed: {}", fallback.family, e);
                    self.unavailable.insert(fallback.clone());
                }
            }
        }

        self.report(node, &font.family, "estimated metrics", diagnostics);
        Measured {
            metrics: estimate(text, size),
            font: fallback,
        }
    }

    /// The style a span in `style` is drawn with, resolving the font through the fallback policy.
    pub fn span_style(&mut self, style: &Style, node: &NodeId, diagnostics: &mut Diagnostics) -> (SpanStyle, TextMetrics) {
        let measured = self.measure("", &Self::font_for(style), style.font_size, node, diagnostics);
        (
            SpanStyle {
                font: measured.font,
                size: style.font_size,
                color: style.color,
                attachment: None,
            },
            measured.metrics,
        )
    }

    fn report(&mut self, node: &NodeId, family: &str, fallback: &str, diagnostics: &mut Diagnostics) {
        if self.reported.insert((node.clone(), family.to_string())) {
            diagnostics.push(Warning::MeasurementUnavailable {
                node_id: node.clone(),
                family: family.to_string(),
                fallback: fallback.to_string(),
            });
        }
    }
}

fn estimate(text: &str, size: f32) -> TextMetrics {
    TextMetrics {
        advance_widths: text.chars().map(|_| size * ESTIMATED_CHAR_EM).collect(),
        line_height: size * ESTIMATED_LINE_EM,
        ascent: size * ESTIMATED_ASCENT_EM,
    }
}
