//! DOCX renderer: an OPC package of WordprocessingML parts written with `quick-xml` and
//! zipped with `zip`.

mod document;
mod media;
mod package;
mod properties;
mod renderer;
mod running;
mod styles;
mod units;
mod xml;

pub use renderer::DocxRenderer;
