//! A thin element writer over `quick_xml::Writer`.

use folio_render_core::RenderError;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// Starts a standalone UTF-8 document.
    pub fn new() -> Result<Self, RenderError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
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

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    pub fn text(&mut self, text: &str) -> Result<(), RenderError> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// `<name>text</name>`
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), RenderError> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    /// `<name w:val="value"/>`
    pub fn val(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
        self.empty(name, &[("w:val", value)])
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let mut xml = XmlBuilder::new().unwrap();
        xml.start("w:p", &[("w:rsid", "a<b")]).unwrap();
        xml.text_element("w:t", &[], "x & y").unwrap();
        xml.end("w:p").unwrap();
        let out = String::from_utf8(xml.finish()).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(out.contains("<w:p w:rsid=\"a&lt;b\"><w:t>x &amp; y</w:t></w:p>"));
    }
}
