//! HTML renderer: one self-contained page with images and attachments inlined as data URIs.

mod inline;
mod markup;
mod renderer;

pub use renderer::HtmlRenderer;
