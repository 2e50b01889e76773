use folio_render_core::RenderError;
use lopdf::{Dictionary, Object, ObjectId, dictionary};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Seek, Write};

/// Buffers PDF objects by id and writes them once, in id order, recording the exact byte
/// offset of each for the cross-reference table.
pub struct PdfWriter<W: Write + Seek> {
    writer: W,
    max_id: u32,
    pub catalog_id: ObjectId,
    pub pages_id: ObjectId,
    pub resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    outline_root_id: Option<ObjectId>,
    info: Option<Dictionary>,
    language: Option<String>,
    buffered_objects: BTreeMap<ObjectId, Object>,
}

impl<W: Write + Seek> PdfWriter<W> {
    pub fn new(mut writer: W, version: &str) -> Result<Self, RenderError> {
        writer.write_all(format!("%PDF-{}\n%âãÏÓ\n", version).as_bytes())?;

        Ok(Self {
            writer,
            max_id: 3,
            resources_id: (1, 0),
            pages_id: (2, 0),
            catalog_id: (3, 0),
            page_ids: Vec::new(),
            outline_root_id: None,
            info: None,
            language: None,
            buffered_objects: BTreeMap::new(),
        })
    }

    pub fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    pub fn buffer_object(&mut self, object: Object) -> ObjectId {
        let id = self.new_object_id();
        self.buffered_objects.insert(id, object);
        id
    }

    pub fn buffer_object_at_id(&mut self, id: ObjectId, object: Object) {
        if id.0 > self.max_id {
            self.max_id = id.0;
        }
        self.buffered_objects.insert(id, object);
    }

    pub fn set_page_ids(&mut self, page_ids: Vec<ObjectId>) {
        self.page_ids = page_ids;
    }

    pub fn set_outline_root_id(&mut self, outline_root_id: Option<ObjectId>) {
        self.outline_root_id = outline_root_id;
    }

    pub fn set_info(&mut self, info: Dictionary) {
        self.info = Some(info);
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    pub fn finish(mut self) -> Result<W, RenderError> {
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.buffer_object_at_id(self.pages_id, pages_dict.into());

        let mut catalog_dict = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        if let Some(outline_id) = self.outline_root_id {
            catalog_dict.set("Outlines", outline_id);
            catalog_dict.set("PageMode", "UseOutlines");
        }
        if let Some(language) = &self.language {
            catalog_dict.set("Lang", Object::string_literal(language.as_bytes().to_vec()));
        }
        self.buffer_object_at_id(self.catalog_id, catalog_dict.into());

        let info_id = match self.info.take() {
            Some(info) => Some(self.buffer_object(info.into())),
            None => None,
        };

        self.check_references()?;

        let mut offsets = BTreeMap::new();
        for (id, object) in &self.buffered_objects {
            let offset = self.writer.stream_position()?;
            offsets.insert(id.0, offset);
            internal_writer::write_indirect_object(&mut self.writer, *id, object)?;
        }

        let xref_start = self.writer.stream_position()?;
        let size = self.max_id + 1;
        internal_writer::write_xref(&mut self.writer, size, &offsets)?;

        let mut trailer = dictionary! { "Size" => size as i64, "Root" => self.catalog_id };
        if let Some(info_id) = info_id {
            trailer.set("Info", info_id);
        }
        writeln!(self.writer, "trailer")?;
        internal_writer::write_dictionary(&mut self.writer, &trailer)?;
        writeln!(self.writer, "\nstartxref")?;
        writeln!(self.writer, "{}", xref_start)?;
        write!(self.writer, "%%EOF")?;

        self.writer.flush()?;
        log::debug!("Wrote {} PDF objects", self.buffered_objects.len());
        Ok(self.writer)
    }

    /// Every reference must point at a buffered object.
    fn check_references(&self) -> Result<(), RenderError> {
        let written: BTreeSet<ObjectId> = self.buffered_objects.keys().copied().collect();
        for (id, object) in &self.buffered_objects {
            let mut targets = Vec::new();
            collect_references(object, &mut targets);
            if let Some(missing) = targets.into_iter().find(|t| !written.contains(t)) {
                return Err(RenderError::DanglingReference {
                    from: id.0,
                    target: missing.0,
                });
            }
        }
        Ok(())
    }
}

fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, value)| collect_references(value, out)),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .for_each(|(_, value)| collect_references(value, out)),
        _ => {}
    }
}

mod internal_writer {
    use super::*;
    use lopdf::StringFormat;
    use std::io;

    pub fn write_indirect_object<W: Write>(writer: &mut W, id: ObjectId, object: &Object) -> io::Result<()> {
        writeln!(writer, "{} {} obj", id.0, id.1)?;
        write_object(writer, object)?;
        writeln!(writer, "\nendobj")?;
        Ok(())
    }

    pub fn write_object(writer: &mut dyn Write, object: &Object) -> io::Result<()> {
        match object {
            Object::Null => writer.write_all(b"null"),
            Object::Boolean(b) => writer.write_all(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => write!(writer, "{}", i),
            Object::Real(r) => write!(writer, "{:.3}", r),
            Object::Name(n) => {
                writer.write_all(b"/")?;
                writer.write_all(n)
            }
            Object::String(s, format) => match format {
                StringFormat::Literal => {
                    writer.write_all(b"(")?;
                    for &byte in s {
                        match byte {
                            b'(' | b')' | b'\\' => writer.write_all(&[b'\\', byte])?,
                            b'\r' => writer.write_all(b"\\r")?,
                            _ => writer.write_all(&[byte])?,
                        }
                    }
                    writer.write_all(b")")
                }
                StringFormat::Hexadecimal => {
                    write!(writer, "<{}>", s.iter().map(|b| format!("{:02X}", b)).collect::<String>())
                }
            },
            Object::Array(arr) => {
                writer.write_all(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        writer.write_all(b" ")?;
                    }
                    write_object(writer, obj)?;
                }
                writer.write_all(b"]")
            }
            Object::Dictionary(dict) => write_dictionary(writer, dict),
            Object::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.set("Length", stream.content.len() as i64);
                write_dictionary(writer, &dict)?;
                writer.write_all(b"\nstream\n")?;
                writer.write_all(&stream.content)?;
                writer.write_all(b"\nendstream")
            }
            Object::Reference(id) => write!(writer, "{} {} R", id.0, id.1),
        }
    }

    pub fn write_dictionary(writer: &mut dyn Write, dict: &Dictionary) -> io::Result<()> {
        writer.write_all(b"<<")?;
        let sorted_keys: BTreeMap<_, _> = dict.iter().collect();
        for (key, value) in sorted_keys {
            writer.write_all(b"/")?;
            writer.write_all(key)?;
            writer.write_all(b" ")?;
            write_object(writer, value)?;
            writer.write_all(b" ")?;
        }
        writer.write_all(b">>")
    }

    /// One subsection covering ids `0..size`; ids never written are free entries.
    pub fn write_xref<W: Write>(writer: &mut W, size: u32, offsets: &BTreeMap<u32, u64>) -> io::Result<()> {
        writeln!(writer, "xref")?;
        writeln!(writer, "0 {}", size)?;
        writeln!(writer, "0000000000 65535 f ")?;
        for id in 1..size {
            match offsets.get(&id) {
                Some(offset) => writeln!(writer, "{:010} {:05} n ", offset, 0)?,
                None => writeln!(writer, "0000000000 00000 f ")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn refuses_to_close_with_dangling_reference() {
        let mut writer = PdfWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        writer.buffer_object_at_id(writer.resources_id, Dictionary::new().into());
        writer.buffer_object(dictionary! { "Next" => (99u32, 0u16) }.into());
        let err = writer.finish().err().unwrap();
        assert!(matches!(err, RenderError::DanglingReference { target: 99, .. }));
    }

    #[test]
    fn literal_strings_are_escaped() {
        let mut out = Vec::new();
        let object = Object::string_literal(b"a(b)\\c".to_vec());
        internal_writer::write_object(&mut out, &object).unwrap();
        assert_eq!(out, b"(a\\(b\\)\\\\c)");
    }

    #[test]
    fn dictionary_keys_are_sorted() {
        let mut out = Vec::new();
        let dict = dictionary! { "Type" => "Page", "Count" => 2i64, "Annots" => Object::Null };
        internal_writer::write_dictionary(&mut out, &dict).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<</Annots null /Count 2 /Type /Page >>"
        );
    }
}
