//! Low-level, read-only access to the relationship parts of an OPC package.
//!
//! This module parses `.rels` parts into serialized relationships kept in
//! document order, which is what the slide importer needs to pick the first
//! image relationship of a slide.

use crate::ooxml::opc::constants::{relationship_type, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

/// Relationships of one source part, in document order.
///
/// Slides rarely carry more than a layout, a notes part and a few pictures, so
/// the common case stays on the stack.
pub type SerializedRelationships = SmallVec<[SerializedRelationship; 8]>;

/// Serialized relationship as read from a .rels file.
///
/// Contains all relationship information in string form, before the target
/// reference is resolved to a part name.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    /// Base URI for resolving relative references
    pub base_uri: String,

    /// Relationship ID (e.g., "rId1")
    pub r_id: String,

    /// Relationship type URI
    pub reltype: String,

    /// Target reference (relative URI or external URL)
    pub target_ref: String,

    /// Target mode (Internal or External)
    pub target_mode: String,
}

impl SerializedRelationship {
    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }

    /// Check if the relationship type denotes an image.
    ///
    /// Matches both the transitional and the strict OOXML namespaces.
    #[inline]
    pub fn is_image(&self) -> bool {
        self.reltype.ends_with(relationship_type::IMAGE_SUFFIX)
    }

    /// Get the target partname for internal relationships.
    ///
    /// Resolves the relative target reference against the base URI
    /// to produce an absolute PackURI.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(format!(
                "{} targets external resource '{}'",
                self.r_id, self.target_ref
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Parse relationships XML into SerializedRelationship structs.
///
/// # Arguments
/// * `rels_xml` - Content of the `.rels` part
/// * `base_uri` - Directory of the source part, used to resolve targets later
pub fn parse_rels_xml(rels_xml: &[u8], base_uri: &str) -> Result<SerializedRelationships> {
    let mut srels = SmallVec::new();
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut target_mode = target_mode::INTERNAL.to_string();

                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                            b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                            b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                            b"TargetMode" => target_mode = attr.unescape_value()?.to_string(),
                            _ => {},
                        }
                    }

                    if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                        srels.push(SerializedRelationship {
                            base_uri: base_uri.to_string(),
                            r_id: id,
                            reltype: rt,
                            target_ref: tr,
                            target_mode,
                        });
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(srels)
}
