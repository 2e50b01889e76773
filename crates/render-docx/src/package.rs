//! OPC packaging: parts, relationships, content types and the zip container.

use crate::xml::XmlBuilder;
use folio_render_core::RenderError;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_HEADER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
pub const REL_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    /// Relative to the directory of the source part.
    pub target: String,
}

/// The relationships of one source part, e.g. `word/document.xml`.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Adds a relationship and returns its id (`rId1`, `rId2`, ...).
    pub fn add(&mut self, rel_type: &'static str, target: impl Into<String>) -> String {
        let id = format!("rId{}", self.items.len() + 1);
        self.items.push(Relationship {
            id: id.clone(),
            rel_type,
            target: target.into(),
        });
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    fn to_xml(&self) -> Result<Vec<u8>, RenderError> {
        let mut xml = XmlBuilder::new()?;
        xml.start("Relationships", &[("xmlns", RELS_NS)])?;
        for rel in &self.items {
            xml.empty(
                "Relationship",
                &[("Id", rel.id.as_str()), ("Type", rel.rel_type), ("Target", rel.target.as_str())],
            )?;
        }
        xml.end("Relationships")?;
        Ok(xml.finish())
    }
}

/// An in-memory OPC package. Parts are zipped in insertion order.
#[derive(Debug, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
    relationships: BTreeMap<String, Relationships>,
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl Package {
    pub fn new() -> Self {
        let mut package = Self::default();
        package.add_default("rels", "application/vnd.openxmlformats-package.relationships+xml");
        package.add_default("xml", "application/xml");
        package
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn add_part(&mut self, name: impl Into<String>, content_type: Option<&str>, data: Vec<u8>) {
        let name = name.into();
        if let Some(content_type) = content_type {
            self.overrides.insert(name.clone(), content_type.to_string());
        }
        self.parts.push((name, data));
    }

    /// Attaches the relationships of `source` (the empty string for the package itself).
    pub fn set_relationships(&mut self, source: &str, relationships: Relationships) {
        self.relationships.insert(source.to_string(), relationships);
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Every relationship target and override must name a part, and every part needs a
    /// content type.
    pub fn check_integrity(&self) -> Result<(), RenderError> {
        let names: BTreeSet<&str> = self.part_names().collect();
        for (source, relationships) in &self.relationships {
            for rel in relationships.iter() {
                let target = resolve_target(source, &rel.target);
                if !names.contains(target.as_str()) {
                    return Err(RenderError::PackagingIntegrity(format!(
                        "relationship {} of '{}' targets missing part '{}'",
                        rel.id,
                        display_source(source),
                        target
                    )));
                }
            }
        }
        for name in self.overrides.keys() {
            if !names.contains(name.as_str()) {
                return Err(RenderError::PackagingIntegrity(format!(
                    "content type override for missing part '{}'",
                    name
                )));
            }
        }
        for name in &names {
            if self.overrides.contains_key(*name) {
                continue;
            }
            let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
            if !extension.is_some_and(|ext| self.defaults.contains_key(&ext)) {
                return Err(RenderError::PackagingIntegrity(format!(
                    "part '{}' has no content type",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Checks integrity, then writes the zip container.
    pub fn into_zip(self) -> Result<Vec<u8>, RenderError> {
        self.check_integrity()?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(&self.content_types_xml()?)?;
        for (source, relationships) in &self.relationships {
            zip.start_file(rels_part_name(source), options)?;
            zip.write_all(&relationships.to_xml()?)?;
        }
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        log::debug!(
            "Packaged {} parts and {} relationship parts",
            self.parts.len(),
            self.relationships.len()
        );
        Ok(zip.finish()?.into_inner())
    }

    fn content_types_xml(&self) -> Result<Vec<u8>, RenderError> {
        let mut xml = XmlBuilder::new()?;
        xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
        for (extension, content_type) in &self.defaults {
            xml.empty("Default", &[("Extension", extension.as_str()), ("ContentType", content_type.as_str())])?;
        }
        for (name, content_type) in &self.overrides {
            let part_name = format!("/{}", name);
            xml.empty("Override", &[("PartName", part_name.as_str()), ("ContentType", content_type.as_str())])?;
        }
        xml.end("Types")?;
        Ok(xml.finish())
    }
}

/// `word/document.xml` → `word/_rels/document.xml.rels`; the package itself → `_rels/.rels`.
pub fn rels_part_name(source: &str) -> String {
    match source.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", source),
    }
}

/// Resolves a relative target against the directory of its source part.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn display_source(source: &str) -> &str {
    if source.is_empty() { "package" } else { source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rels_part_names() {
        assert_eq!(rels_part_name(""), "_rels/.rels");
        assert_eq!(rels_part_name("word/document.xml"), "word/_rels/document.xml.rels");
    }

    #[test]
    fn targets_resolve_relative_to_source() {
        assert_eq!(resolve_target("word/document.xml", "media/image1.png"), "word/media/image1.png");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
        assert_eq!(resolve_target("word/document.xml", "../docProps/app.xml"), "docProps/app.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/styles.xml"), "word/styles.xml");
    }

    #[test]
    fn missing_relationship_target_is_fatal() {
        let mut package = Package::new();
        package.add_part("word/document.xml", Some("application/xml"), b"<w/>".to_vec());
        let mut rels = Relationships::default();
        rels.add(REL_IMAGE, "media/image1.png");
        package.set_relationships("word/document.xml", rels);
        let err = package.check_integrity().unwrap_err();
        assert!(matches!(err, RenderError::PackagingIntegrity(msg) if msg.contains("word/media/image1.png")));
    }

    #[test]
    fn parts_need_a_content_type() {
        let mut package = Package::new();
        package.add_part("word/media/image1.png", None, vec![1, 2, 3]);
        assert!(package.check_integrity().is_err());
        package.add_default("png", "image/png");
        assert!(package.check_integrity().is_ok());
    }

    #[test]
    fn zips_with_fixed_timestamps() {
        let mut package = Package::new();
        package.add_part("word/document.xml", None, b"<w/>".to_vec());
        let first = Package {
            parts: package.parts.clone(),
            ..Package::new()
        }
        .into_zip()
        .unwrap();
        let second = package.into_zip().unwrap();
        assert_eq!(first, second);
    }
}
