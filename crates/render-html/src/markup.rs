//! An element writer over `quick_xml::Writer` producing HTML5 in XML syntax.

use folio_render_core::RenderError;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

pub struct Markup {
    writer: Writer<Vec<u8>>,
}

impl Markup {
    /// Starts a document with the HTML5 doctype.
    pub fn new() -> Result<Self, RenderError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;
        Ok(Self { writer })
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> Result<(), RenderError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// A void element such as `br`, `img` or `meta`.
    pub fn void(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    pub fn text(&mut self, text: &str) -> Result<(), RenderError> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// `<name>text</name>`, never self-closed.
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), RenderError> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
