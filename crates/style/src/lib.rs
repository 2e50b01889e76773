pub mod border;
pub mod dimension;
pub mod font;
pub mod parsers;
pub mod property;
pub mod style;
pub mod text;

pub use border::{Border, BorderStyle};
pub use dimension::{Dimension, Margins, PageSize};
pub use font::{FontStyle, FontWeight};
pub use parsers::StyleParseError;
pub use property::{StyleMap, StyleProperty, StyleValue};
pub use style::Style;
pub use text::TextAlign;
