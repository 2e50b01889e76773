//! Greedy line breaking over styled runs.
//!
//! Lines are produced in coordinates relative to the paragraph: span `x` is measured from
//! the left edge of the available width and `baseline` from the top of the line.

use super::measure::Measurer;
use crate::diagnostics::Diagnostics;
use crate::elements::{AttachmentLink, LineEnd, SpanStyle, TextSpan};
use folio_ast::BinaryData;
use folio_style::{Style, TextAlign};
use folio_traits::FontSpec;
use folio_types::{EPSILON, NodeId};

/// A run of text as seen by the line breaker.
#[derive(Debug, Clone, Copy)]
pub struct InlineRun<'a> {
    pub text: &'a str,
    pub style: &'a Style,
    pub source: &'a NodeId,
    /// File name and content when the run links an embedded file.
    pub attachment: Option<(&'a str, &'a BinaryData)>,
}

impl<'a> InlineRun<'a> {
    pub fn new(text: &'a str, style: &'a Style, source: &'a NodeId) -> Self {
        Self {
            text,
            style,
            source,
            attachment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub spans: Vec<TextSpan>,
    /// Natural width of the content, before alignment.
    pub width: f32,
    pub height: f32,
    /// Baseline offset from the top of the line.
    pub baseline: f32,
    pub end: LineEnd,
}

/// Vertical metrics a piece of text contributes to its line.
#[derive(Debug, Clone, Copy)]
struct LineMetrics {
    height: f32,
    baseline: f32,
}

impl LineMetrics {
    fn of(style: &Style, natural: f32, ascent: f32) -> Self {
        let height = style.line_advance();
        Self {
            height,
            baseline: (height - natural) / 2.0 + ascent,
        }
    }

    fn max(self, other: LineMetrics) -> Self {
        Self {
            height: self.height.max(other.height),
            baseline: self.baseline.max(other.baseline),
        }
    }
}

/// Part of a word set in one style.
#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    advances: Vec<f32>,
    style: SpanStyle,
    metrics: LineMetrics,
}

impl Fragment {
    fn width(&self) -> f32 {
        self.advances.iter().sum()
    }

    /// Splits off the first `n` characters.
    fn split_at_char(&self, n: usize) -> (Fragment, Fragment) {
        let byte = self.text.char_indices().nth(n).map(|(i, _)| i).unwrap_or(self.text.len());
        let head = Fragment {
            text: self.text[..byte].to_string(),
            advances: self.advances[..n].to_vec(),
            ..self.clone()
        };
        let tail = Fragment {
            text: self.text[byte..].to_string(),
            advances: self.advances[n..].to_vec(),
            ..self.clone()
        };
        (head, tail)
    }
}

#[derive(Debug, Clone)]
struct Gap {
    width: f32,
    metrics: LineMetrics,
}

#[derive(Debug, Clone)]
enum Token {
    /// Fragments with no break opportunity between them.
    Word(Vec<Fragment>),
    Gap(Gap),
    Break(LineMetrics),
}

fn word_width(word: &[Fragment]) -> f32 {
    word.iter().map(Fragment::width).sum()
}

/// Breaks `runs` into lines no wider than `max_width`.
///
/// Always returns at least one line; an empty paragraph gets one empty line in `base`.
pub fn break_lines(
    runs: &[InlineRun<'_>],
    max_width: f32,
    base: &Style,
    base_source: &NodeId,
    align: TextAlign,
    measurer: &mut Measurer<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<LineLayout> {
    let tokens = tokenize(runs, measurer, diagnostics);
    let (_, base_metrics) = measurer.span_style(base, base_source, diagnostics);
    let empty_metrics = LineMetrics::of(base, base_metrics.line_height, base_metrics.ascent);

    let mut builder = LineBuilder {
        max_width,
        align,
        lines: Vec::new(),
        items: Vec::new(),
        pending_gap: None,
        width: 0.0,
        metrics: None,
        empty_metrics,
    };

    for token in tokens {
        match token {
            Token::Gap(gap) => {
                if !builder.items.is_empty() {
                    builder.pending_gap = Some(gap);
                }
            }
            Token::Break(metrics) => {
                builder.absorb(metrics);
                builder.finalize_line(LineEnd::Hard);
            }
            Token::Word(word) => builder.push_word(word),
        }
    }
    builder.finalize_line(LineEnd::Last);
    builder.lines
}

fn tokenize(runs: &[InlineRun<'_>], measurer: &mut Measurer<'_>, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokenizer = Tokenizer::default();

    for run in runs {
        let font = Measurer::font_for(run.style);
        let space = measurer.measure(" ", &font, run.style.font_size, run.source, diagnostics);
        let context = RunContext {
            run,
            style: SpanStyle {
                font: space.font.clone(),
                size: run.style.font_size,
                color: run.style.color,
                attachment: run.attachment.map(|(file_name, data)| AttachmentLink {
                    file_name: file_name.to_string(),
                    data: data.clone(),
                }),
            },
            font,
            metrics: LineMetrics::of(run.style, space.metrics.line_height, space.metrics.ascent),
        };
        let space_width = space.metrics.width();

        for c in run.text.chars() {
            if c == '\n' {
                tokenizer.flush(&context, measurer, diagnostics);
                tokenizer.tokens.push(Token::Break(context.metrics));
                tokenizer.open_word = false;
            } else if c.is_whitespace() {
                tokenizer.flush(&context, measurer, diagnostics);
                if matches!(tokenizer.tokens.last(), Some(Token::Word(_))) {
                    tokenizer.tokens.push(Token::Gap(Gap {
                        width: space_width,
                        metrics: context.metrics,
                    }));
                }
                tokenizer.open_word = false;
            } else {
                tokenizer.word.push(c);
            }
        }
        tokenizer.flush(&context, measurer, diagnostics);
    }
    tokenizer.tokens
}

struct RunContext<'r, 'a> {
    run: &'r InlineRun<'a>,
    font: FontSpec,
    style: SpanStyle,
    metrics: LineMetrics,
}

#[derive(Default)]
struct Tokenizer {
    tokens: Vec<Token>,
    word: String,
    /// Set while the last token is a word the next run may continue.
    open_word: bool,
}

impl Tokenizer {
    fn flush(&mut self, context: &RunContext<'_, '_>, measurer: &mut Measurer<'_>, diagnostics: &mut Diagnostics) {
        if self.word.is_empty() {
            return;
        }
        let run = context.run;
        let measured = measurer.measure(&self.word, &context.font, run.style.font_size, run.source, diagnostics);
        let fragment = Fragment {
            text: std::mem::take(&mut self.word),
            advances: measured.metrics.advance_widths,
            style: context.style.clone(),
            metrics: context.metrics,
        };
        match self.tokens.last_mut() {
            Some(Token::Word(fragments)) if self.open_word => fragments.push(fragment),
            _ => self.tokens.push(Token::Word(vec![fragment])),
        }
        self.open_word = true;
    }
}

/// A word placed on the current line, with the gap before it.
#[derive(Debug, Clone)]
struct LineItem {
    gap: Option<Gap>,
    word: Vec<Fragment>,
}

struct LineBuilder {
    max_width: f32,
    align: TextAlign,
    lines: Vec<LineLayout>,
    items: Vec<LineItem>,
    pending_gap: Option<Gap>,
    width: f32,
    metrics: Option<LineMetrics>,
    empty_metrics: LineMetrics,
}

impl LineBuilder {
    fn push_word(&mut self, word: Vec<Fragment>) {
        let gap_width = match (&self.pending_gap, self.items.is_empty()) {
            (Some(gap), false) => gap.width,
            _ => 0.0,
        };
        let width = word_width(&word);

        if self.width + gap_width + width <= self.max_width + EPSILON {
            self.place(word);
            return;
        }
        if !self.items.is_empty() {
            self.finalize_line(LineEnd::Soft);
        }
        if width <= self.max_width + EPSILON {
            self.place(word);
        } else {
            self.split_word(word);
        }
    }

    /// Places a word too wide for an empty line, cutting it at character boundaries.
    fn split_word(&mut self, word: Vec<Fragment>) {
        let mut rest: Vec<Fragment> = word;
        loop {
            if word_width(&rest) <= self.max_width + EPSILON {
                if !rest.is_empty() {
                    self.place(rest);
                }
                return;
            }

            let mut head = Vec::new();
            let mut used = 0.0;
            let mut remaining = Vec::new();
            let mut fragments = rest.into_iter();
            for fragment in fragments.by_ref() {
                let fits = fragment
                    .advances
                    .iter()
                    .scan(used, |acc, w| {
                        *acc += w;
                        Some(*acc)
                    })
                    .take_while(|acc| *acc <= self.max_width + EPSILON)
                    .count();
                if fits == fragment.advances.len() {
                    used += fragment.width();
                    head.push(fragment);
                    continue;
                }
                // At least one character per line, so the split always makes progress.
                let n = if head.is_empty() { fits.max(1) } else { fits };
                let (first, second) = fragment.split_at_char(n);
                if !first.text.is_empty() {
                    head.push(first);
                }
                if !second.text.is_empty() {
                    remaining.push(second);
                }
                break;
            }
            remaining.extend(fragments);

            self.place(head);
            self.finalize_line(LineEnd::Split);
            rest = remaining;
        }
    }

    fn place(&mut self, word: Vec<Fragment>) {
        let gap = if self.items.is_empty() { None } else { self.pending_gap.take() };
        self.pending_gap = None;
        if let Some(gap) = &gap {
            self.width += gap.width;
            self.absorb(gap.metrics);
        }
        for fragment in &word {
            self.width += fragment.width();
            self.absorb(fragment.metrics);
        }
        self.items.push(LineItem { gap, word });
    }

    fn absorb(&mut self, metrics: LineMetrics) {
        self.metrics = Some(match self.metrics {
            Some(current) => current.max(metrics),
            None => metrics,
        });
    }

    fn finalize_line(&mut self, end: LineEnd) {
        let items = std::mem::take(&mut self.items);
        let metrics = self.metrics.take().unwrap_or(self.empty_metrics);
        let spans = position_spans(&items, self.width, self.max_width, self.align, end);
        self.lines.push(LineLayout {
            spans,
            width: self.width,
            height: metrics.height,
            baseline: metrics.baseline,
            end,
        });
        self.width = 0.0;
        self.pending_gap = None;
    }
}

/// Turns a line's items into spans, applying alignment.
fn position_spans(items: &[LineItem], width: f32, max_width: f32, align: TextAlign, end: LineEnd) -> Vec<TextSpan> {
    let slack = (max_width - width).max(0.0);
    let gaps = items.iter().filter(|item| item.gap.is_some()).count();
    let justify = align == TextAlign::Justify && end == LineEnd::Soft && gaps > 0;

    let (mut x, extra_per_gap) = match align {
        TextAlign::Left => (0.0, 0.0),
        TextAlign::Right => (slack, 0.0),
        TextAlign::Center => (slack / 2.0, 0.0),
        TextAlign::Justify if justify => (0.0, slack / gaps as f32),
        TextAlign::Justify => (0.0, 0.0),
    };

    let mut spans: Vec<TextSpan> = Vec::new();
    for item in items {
        let mut leading_space = None;
        if let Some(gap) = &item.gap {
            leading_space = Some(gap.width);
            x += gap.width + extra_per_gap;
        }

        for (i, fragment) in item.word.iter().enumerate() {
            let fw = fragment.width();
            let space = if i == 0 { leading_space } else { None };
            let mergeable = !justify
                && spans
                    .last()
                    .is_some_and(|last| last.style == fragment.style);

            match (mergeable, space) {
                (true, Some(sw)) => {
                    if let Some(last) = spans.last_mut() {
                        last.text.push(' ');
                        last.text.push_str(&fragment.text);
                        last.width += sw + extra_per_gap + fw;
                    }
                }
                (true, None) => {
                    if let Some(last) = spans.last_mut() {
                        last.text.push_str(&fragment.text);
                        last.width += fw;
                    }
                }
                (false, Some(sw)) => spans.push(TextSpan {
                    text: format!(" {}", fragment.text),
                    x: x - sw,
                    width: sw + fw,
                    style: fragment.style.clone(),
                }),
                (false, None) => spans.push(TextSpan {
                    text: fragment.text.clone(),
                    x,
                    width: fw,
                    style: fragment.style.clone(),
                }),
            }
            x += fw;
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::FontWeight;
    use folio_traits::StandardFontMetrics;

    fn lay_out(runs: &[(&str, Style)], width: f32, align: TextAlign) -> Vec<LineLayout> {
        let provider = StandardFontMetrics;
        let mut measurer = Measurer::new(&provider, "Helvetica");
        let mut diagnostics = Diagnostics::new();
        let id = NodeId::from("p");
        let inline: Vec<InlineRun> = runs
            .iter()
            .map(|(text, style)| InlineRun::new(text, style, &id))
            .collect();
        break_lines(
            &inline,
            width,
            &Style::default(),
            &id,
            align,
            &mut measurer,
            &mut diagnostics,
        )
    }

    fn line_text(line: &LineLayout) -> String {
        line.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn wraps_greedily_at_spaces() {
        let lines = lay_out(&[("aaa bbb ccc ddd", Style::default())], 45.0, TextAlign::Left);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["aaa bbb", "ccc ddd"]);
        assert_eq!(lines[0].end, LineEnd::Soft);
        assert_eq!(lines[1].end, LineEnd::Last);
        for line in &lines {
            assert!(line.width <= 45.0 + EPSILON);
            assert!((line.height - 15.0).abs() < 1e-4);
        }
    }

    #[test]
    fn newline_forces_a_break() {
        let lines = lay_out(&[("one\ntwo", Style::default())], 500.0, TextAlign::Left);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].end, LineEnd::Hard);
        assert_eq!(line_text(&lines[1]), "two");
    }

    #[test]
    fn overlong_word_is_split_by_characters() {
        let lines = lay_out(&[("abcdefghijklmnop", Style::default())], 30.0, TextAlign::Left);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 30.0 + EPSILON));
        let joined: String = lines.iter().map(line_text).collect();
        assert_eq!(joined, "abcdefghijklmnop");
        assert_eq!(lines[0].end, LineEnd::Split);
    }

    #[test]
    fn glued_runs_do_not_break_between_styles() {
        let bold = Style {
            font_weight: FontWeight::Bold,
            ..Style::default()
        };
        let lines = lay_out(
            &[("xx aa", Style::default()), ("bb", bold), (" cc", Style::default())],
            25.0,
            TextAlign::Left,
        );
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts[1], "aabb");
        assert_eq!(lines[1].spans.len(), 2);
    }

    #[test]
    fn alignment_offsets_spans() {
        let right = lay_out(&[("hi", Style::default())], 100.0, TextAlign::Right);
        let span = &right[0].spans[0];
        assert!((span.x + span.width - 100.0).abs() < 1e-3);

        let center = lay_out(&[("hi", Style::default())], 100.0, TextAlign::Center);
        let span = &center[0].spans[0];
        assert!((span.x - (100.0 - span.width) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn justify_fills_all_but_the_last_line() {
        let lines = lay_out(&[("aaa bb c dddd eee ff", Style::default())], 60.0, TextAlign::Justify);
        assert!(lines.len() >= 2);
        let first = &lines[0];
        let last_span = first.spans.last().unwrap();
        assert!((last_span.x + last_span.width - 60.0).abs() < 1e-3);
        assert!(first.spans.iter().skip(1).all(|s| s.text.starts_with(' ')));

        let last = lines.last().unwrap();
        let end = last.spans.last().unwrap();
        assert!((end.x + end.width - last.width).abs() < 1e-3);
    }

    #[test]
    fn empty_paragraph_has_one_line() {
        let lines = lay_out(&[], 100.0, TextAlign::Left);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.is_empty());
        assert!((lines[0].height - 15.0).abs() < 1e-4);
    }
}
