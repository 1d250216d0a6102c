//! Outgoing relationships of a part being written.
use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::packuri::PackURI;

/// One internal relationship, with its target already made relative to the
/// source part's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
}

impl Relationship {
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }
}

/// Relationships from a single source part, numbered `rId1..` in insertion order.
#[derive(Debug)]
pub struct Relationships {
    /// Directory of the source part, e.g. "/ppt/slides"
    base_uri: String,
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            rels: Vec::new(),
        }
    }

    /// Return the rId linking to `target` with `reltype`, adding it if needed.
    pub fn get_or_add(&mut self, reltype: &str, target: &PackURI) -> String {
        let target_ref = target.relative_ref(&self.base_uri);

        if let Some(rel) = self
            .rels
            .iter()
            .find(|rel| rel.reltype == reltype && rel.target_ref == target_ref)
        {
            return rel.r_id.clone();
        }

        let r_id = format!("rId{}", self.rels.len() + 1);
        self.rels.push(Relationship {
            r_id: r_id.clone(),
            reltype: reltype.to_string(),
            target_ref,
        });
        r_id
    }

    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize to the content of a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS));
        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                rel.r_id,
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref)
            ));
        }
        xml.push_str("</Relationships>");

        xml
    }
}
