//! Package writer for OPC packages.
//!
//! This module serializes a set of parts into a ZIP container, writing the
//! [Content_Types].xml, the package relationships, and every part together
//! with its own relationships.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::BTreeMap;

/// A part ready to be written: name, content type, payload and outgoing relationships.
#[derive(Debug)]
pub struct PartBlob {
    /// The partname (URI) of this part
    pub partname: PackURI,

    /// The content type of this part
    pub content_type: String,

    /// The binary content of this part
    pub blob: Vec<u8>,

    /// Relationships from this part; written only when non-empty
    pub rels: Relationships,
}

impl PartBlob {
    /// Create a part with no outgoing relationships.
    pub fn new(partname: PackURI, content_type: &str, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri());
        Self {
            partname,
            content_type: content_type.to_string(),
            blob,
            rels,
        }
    }
}

/// Package writer that serializes parts to an in-memory ZIP archive.
///
/// This is the main entry point for saving packages. It handles writing:
/// - [Content_Types].xml
/// - _rels/.rels (package relationships)
/// - All parts and their relationships
pub struct PackageWriter {
    /// Package-level relationships (`/_rels/.rels`)
    pkg_rels: Relationships,

    /// Parts in write order
    parts: Vec<PartBlob>,
}

impl PackageWriter {
    /// Create an empty package writer.
    pub fn new() -> Self {
        Self {
            pkg_rels: Relationships::new(PACKAGE_URI),
            parts: Vec::new(),
        }
    }

    /// Add a relationship from the package itself to one of its parts.
    ///
    /// # Returns
    /// The rId of the relationship
    pub fn relate_from_package(&mut self, reltype: &str, target: &PackURI) -> String {
        self.pkg_rels.get_or_add(reltype, target)
    }

    /// Add a part to the package.
    pub fn add_part(&mut self, part: PartBlob) {
        self.parts.push(part);
    }

    /// Number of parts added so far.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Serialize the package to bytes.
    ///
    /// # Returns
    /// The serialized package as a byte vector
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        let mut phys_writer = PhysPkgWriter::new();

        // Write [Content_Types].xml
        let cti = ContentTypesItem::from_parts(&self.parts);
        let content_types_uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        phys_writer.write(&content_types_uri, cti.to_xml().as_bytes())?;

        // Write package-level relationships (_rels/.rels)
        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        phys_writer.write(&package_uri.rels_uri(), self.pkg_rels.to_xml().as_bytes())?;

        // Write all parts and their relationships
        for part in &self.parts {
            if is_precompressed(&part.content_type) {
                phys_writer.write_stored(&part.partname, &part.blob)?;
            } else {
                phys_writer.write(&part.partname, &part.blob)?;
            }

            if !part.rels.is_empty() {
                phys_writer.write(&part.partname.rels_uri(), part.rels.to_xml().as_bytes())?;
            }
        }

        phys_writer.finish()
    }
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Raster formats that deflate cannot shrink any further.
fn is_precompressed(content_type: &str) -> bool {
    matches!(content_type, ct::PNG | ct::JPEG | ct::GIF)
}

/// Helper for building [Content_Types].xml content.
///
/// Manages Default and Override elements for content type mapping.
struct ContentTypesItem {
    /// Default content types by extension
    defaults: BTreeMap<String, String>,

    /// Override content types by partname
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    /// Create a new ContentTypesItem with the standard defaults.
    fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    /// Build ContentTypesItem from the parts of a package.
    fn from_parts(parts: &[PartBlob]) -> Self {
        let mut cti = Self::new();

        for part in parts {
            cti.add_content_type(&part.partname, &part.content_type);
        }

        cti
    }

    /// Add a content type for a part.
    ///
    /// Uses a default mapping if the extension matches a well-known type,
    /// otherwise uses an override for the specific partname.
    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_ascii_lowercase();

        if Self::is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    /// Check if an extension/content-type pair is a standard default.
    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
        )
    }

    /// Generate the XML for [Content_Types].xml.
    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES));

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");

        xml
    }
}
