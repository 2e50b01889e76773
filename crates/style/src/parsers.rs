//! Low-level nom parser functions for CSS-like style values.
//!
//! Style overrides may be given as raw text (`"12pt"`, `"1pt solid #333"`). These parsers
//! turn that text into typed values when a node's style is resolved.

use crate::border::{Border, BorderStyle};
use crate::dimension::{Dimension, MM, Margins, PageSize};
use crate::font::{FontStyle, FontWeight};
use crate::text::TextAlign;
use folio_types::Color;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while_m_n};
use nom::character::complete::{char, digit1, space0, space1};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },
}

// --- Helper Parsers ---

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(space0, inner, space0)
}

fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

// --- Unit & Dimension Parsers ---

fn parse_unit(input: &str) -> IResult<&str, f32> {
    alt((
        value(1.0, tag_no_case("pt")),
        value(1.0, tag_no_case("px")),
        value(72.0, tag_no_case("in")),
        value(MM * 10.0, tag_no_case("cm")),
        value(MM, tag_no_case("mm")),
    ))
    .parse(input)
}

/// Parses a length value with optional unit (e.g., "12pt", "1in", "10mm").
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    map(pair(parse_f32, opt(parse_unit)), |(v, unit)| {
        v * unit.unwrap_or(1.0)
    })
    .parse(input)
}

/// Parses a dimension value (length, percentage, or "auto").
pub fn parse_dimension(input: &str) -> IResult<&str, Dimension> {
    alt((
        value(Dimension::Auto, tag_no_case("auto")),
        map((parse_f32, char('%')), |(v, _)| Dimension::Percent(v)),
        map(parse_length, Dimension::Pt),
    ))
    .parse(input)
}

/// Parses a whitespace-separated list of column widths (e.g., "120pt auto 25%").
pub fn parse_column_widths(input: &str) -> IResult<&str, Vec<Dimension>> {
    separated_list1(space1, parse_dimension).parse(input)
}

/// Parses CSS shorthand margins (1, 2, or 4 values).
pub fn parse_shorthand_margins(input: &str) -> Result<Margins, StyleParseError> {
    let parts = run_parser(separated_list1(space1, parse_length), input)?;
    match parts.as_slice() {
        [all] => Ok(Margins::all(*all)),
        [y, x] => Ok(Margins {
            top: *y,
            right: *x,
            bottom: *y,
            left: *x,
        }),
        [top, right, bottom, left] => Ok(Margins {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => Err(StyleParseError::Parse(format!(
            "Invalid number of values for margin/padding shorthand: got {}, expected 1, 2, or 4.",
            parts.len()
        ))),
    }
}

// --- Color & Border Parsers ---

fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

fn hex_primary(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, is_hex_digit), |s| u8::from_str_radix(s, 16)).parse(input)
}

fn hex_short(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(1, 1, is_hex_digit), |s: &str| {
        u8::from_str_radix(s, 16).map(|v| v * 17)
    })
    .parse(input)
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    preceded(
        char('#'),
        alt((
            map((hex_primary, hex_primary, hex_primary), |(r, g, b)| Color::rgb(r, g, b)),
            map((hex_short, hex_short, hex_short), |(r, g, b)| Color::rgb(r, g, b)),
        )),
    )
    .parse(input)
}

fn named_color(input: &str) -> IResult<&str, Color> {
    alt((
        value(Color::BLACK, tag_no_case("black")),
        value(Color::WHITE, tag_no_case("white")),
        value(Color::rgb(255, 0, 0), tag_no_case("red")),
        value(Color::rgb(0, 128, 0), tag_no_case("green")),
        value(Color::rgb(0, 0, 255), tag_no_case("blue")),
        value(Color::gray(128), alt((tag_no_case("gray"), tag_no_case("grey")))),
    ))
    .parse(input)
}

/// Parses a hex color (e.g., "#FF0000" or "#F00") or a basic color name.
pub fn parse_color(input: &str) -> IResult<&str, Color> {
    alt((hex_color, named_color)).parse(input)
}

/// Parses a border style keyword.
pub fn parse_border_style(input: &str) -> IResult<&str, BorderStyle> {
    alt((
        value(BorderStyle::Solid, tag_no_case("solid")),
        value(BorderStyle::Dashed, tag_no_case("dashed")),
        value(BorderStyle::Dotted, tag_no_case("dotted")),
        value(BorderStyle::Double, tag_no_case("double")),
        value(BorderStyle::None, tag_no_case("none")),
    ))
    .parse(input)
}

/// Parses a CSS border shorthand (e.g., "2pt solid #00ff00") or "none".
pub fn parse_border(input: &str) -> IResult<&str, Border> {
    alt((
        map(
            (ws(parse_length), ws(parse_border_style), opt(ws(parse_color))),
            |(width, style, color)| Border {
                width,
                style,
                color: color.unwrap_or(Color::BLACK),
            },
        ),
        value(Border::none(), tag_no_case("none")),
    ))
    .parse(input)
}

fn page_size_preset(input: &str) -> IResult<&str, PageSize> {
    alt((
        value(PageSize::A3, tag_no_case("a3")),
        value(PageSize::A4, tag_no_case("a4")),
        value(PageSize::A5, tag_no_case("a5")),
        value(PageSize::Letter, tag_no_case("letter")),
        value(PageSize::Legal, tag_no_case("legal")),
    ))
    .parse(input)
}

fn page_size_explicit(input: &str) -> IResult<&str, PageSize> {
    map(
        (
            parse_length,
            alt((ws(tag("x")), ws(tag("X")), recognize(space1))),
            parse_length,
        ),
        |(width, _, height)| PageSize::Custom { width, height },
    )
    .parse(input)
}

/// Helper to run a nom parser and convert its result to a `Result<T, StyleParseError>`.
pub fn run_parser<'a, T, P>(mut parser: P, input: &'a str) -> Result<T, StyleParseError>
where
    P: Parser<&'a str, Output = T, Error = nom::error::Error<&'a str>>,
{
    match parser.parse(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

// --- High-level Parse Functions ---

/// Parses a page size: a preset name ("A4", "letter") or "WIDTH x HEIGHT".
pub fn parse_page_size(s: &str) -> Result<PageSize, StyleParseError> {
    run_parser(alt((page_size_preset, page_size_explicit)), s).map_err(|_| {
        StyleParseError::InvalidValue {
            property: "page-size".to_string(),
            value: s.to_string(),
        }
    })
}

/// Parses a font weight string (e.g., "bold", "400").
pub fn parse_font_weight(s: &str) -> Result<FontWeight, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "thin" => Ok(FontWeight::Thin),
        "light" => Ok(FontWeight::Light),
        "regular" | "normal" => Ok(FontWeight::Regular),
        "medium" => Ok(FontWeight::Medium),
        "bold" => Ok(FontWeight::Bold),
        "black" => Ok(FontWeight::Black),
        other => other
            .parse::<u16>()
            .ok()
            .filter(|n| (1..=1000).contains(n))
            .map(FontWeight::Numeric)
            .ok_or_else(|| StyleParseError::InvalidValue {
                property: "font-weight".to_string(),
                value: s.to_string(),
            }),
    }
}

/// Parses a font style string (e.g., "normal", "italic").
pub fn parse_font_style(s: &str) -> Result<FontStyle, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "normal" => Ok(FontStyle::Normal),
        "italic" => Ok(FontStyle::Italic),
        "oblique" => Ok(FontStyle::Oblique),
        _ => Err(StyleParseError::InvalidValue {
            property: "font-style".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parses a text-align value.
pub fn parse_text_align(s: &str) -> Result<TextAlign, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "left" | "start" => Ok(TextAlign::Left),
        "right" | "end" => Ok(TextAlign::Right),
        "center" => Ok(TextAlign::Center),
        "justify" => Ok(TextAlign::Justify),
        _ => Err(StyleParseError::InvalidValue {
            property: "text-align".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parses a font family, stripping optional quotes.
pub fn parse_font_family(s: &str) -> Result<String, StyleParseError> {
    let trimmed = s.trim();
    let family = trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
        .unwrap_or(trimmed)
        .trim();

    if family.is_empty() {
        return Err(StyleParseError::InvalidValue {
            property: "font-family".to_string(),
            value: s.to_string(),
        });
    }
    Ok(family.to_string())
}
