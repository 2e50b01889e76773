//! Font resources: base-14 faces where possible, non-embedded TrueType references otherwise.

use crate::writer::PdfWriter;
use folio_render_core::utils::styled_font_name;
use folio_traits::{FontSpec, StandardFont};
use lopdf::{Dictionary, Object, ObjectId, dictionary};
use std::collections::{BTreeMap, HashMap};
use std::io::{Seek, Write};

/// A font face as the PDF sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PdfFace {
    Standard(StandardFont),
    TrueType(String),
}

impl PdfFace {
    pub fn for_spec(font: &FontSpec) -> PdfFace {
        match StandardFont::resolve(font) {
            Some(standard) => PdfFace::Standard(standard),
            None => PdfFace::TrueType(styled_font_name(&font.family, font.bold, font.italic)),
        }
    }

    pub fn base_font(&self) -> &str {
        match self {
            PdfFace::Standard(standard) => standard.base_font_name(),
            PdfFace::TrueType(name) => name,
        }
    }

    fn dictionary(&self) -> Dictionary {
        let subtype = match self {
            PdfFace::Standard(_) => "Type1",
            PdfFace::TrueType(_) => "TrueType",
        };
        dictionary! {
            "Type" => "Font",
            "Subtype" => subtype,
            "BaseFont" => Object::Name(self.base_font().as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// One font object per face; one resource name per face and size.
#[derive(Default)]
pub struct FontRegistry {
    faces: HashMap<PdfFace, ObjectId>,
    names: HashMap<(PdfFace, u32), String>,
    resources: BTreeMap<String, ObjectId>,
}

impl FontRegistry {
    pub fn resource_name<W: Write + Seek>(
        &mut self,
        writer: &mut PdfWriter<W>,
        font: &FontSpec,
        size: f32,
    ) -> String {
        let face = PdfFace::for_spec(font);
        let key = (face.clone(), size.to_bits());
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }
        let font_id = match self.faces.get(&face) {
            Some(id) => *id,
            None => {
                let id = writer.buffer_object(face.dictionary().into());
                self.faces.insert(face.clone(), id);
                id
            }
        };
        let name = format!("F{}", self.names.len() + 1);
        self.names.insert(key, name.clone());
        self.resources.insert(name.clone(), font_id);
        name
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn resource_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for (name, id) in &self.resources {
            dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        dict
    }
}

/// Encodes text for a simple font with `WinAnsiEncoding`. Characters outside the encoding
/// become `?`.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‰' => 0x89,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// A PDF text string for metadata and bookmarks: a literal for plain ASCII, otherwise
/// UTF-16BE with a byte-order mark.
pub fn text_string(s: &str) -> Object {
    if s.chars().all(|c| (' '..='~').contains(&c)) {
        return Object::string_literal(s.as_bytes().to_vec());
    }
    let mut bytes = vec![0xfe, 0xff];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, lopdf::StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn win_ansi_maps_typographic_characters() {
        assert_eq!(to_win_ansi("a•b"), vec![b'a', 0x95, b'b']);
        assert_eq!(to_win_ansi("“x”–y"), vec![0x93, b'x', 0x94, 0x96, b'y']);
        assert_eq!(to_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(to_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn text_strings_fall_back_to_utf16() {
        assert_eq!(text_string("Intro"), Object::string_literal(b"Intro".to_vec()));
        match text_string("Ü") {
            Object::String(bytes, lopdf::StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xfe, 0xff, 0x00, 0xdc]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn faces_resolve_to_base_fonts() {
        let bold = FontSpec::new("Arial", true, false);
        assert_eq!(PdfFace::for_spec(&bold).base_font(), "Helvetica-Bold");
        let custom = FontSpec::new("Gill Sans", false, true);
        assert_eq!(PdfFace::for_spec(&custom).base_font(), "GillSans,Italic");
    }

    #[test]
    fn names_are_shared_per_face_and_size() {
        let mut writer = PdfWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        let mut fonts = FontRegistry::default();
        let regular = FontSpec::regular("Helvetica");
        let a = fonts.resource_name(&mut writer, &regular, 10.0);
        let b = fonts.resource_name(&mut writer, &regular, 10.0);
        let c = fonts.resource_name(&mut writer, &regular, 12.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(fonts.face_count(), 1);
        assert_eq!(fonts.resource_dictionary().len(), 2);
    }
}
