/// Provides the PackURI value type and utilities for working with package URIs.
///
/// A PackURI represents a part name within an OPC package, following the URI format
/// defined by the Open Packaging Conventions specification.
/// Represents a package URI, which is a partname within an OPC package.
///
/// PackURIs always begin with a forward slash and use forward slashes as path separators.
/// They give access to the directory (base URI), filename, extension and the
/// numeric index of tuple partnames such as `/ppt/slides/slide12.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/ppt/slides/slide1.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Arguments
    /// * `uri` - The URI string, which must begin with a forward slash
    ///
    /// # Returns
    /// * `Ok(PackURI)` if the URI is valid
    /// * `Err` if the URI doesn't start with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a ZIP member name (no leading slash).
    pub fn from_membername(membername: &str) -> Self {
        PackURI {
            uri: format!("/{}", membername.trim_start_matches('/')),
        }
    }

    /// Create a PackURI from a relative reference and a base URI.
    ///
    /// A reference starting with `/` is package-absolute and ignores the base.
    /// Otherwise `..` and `.` segments are resolved against `base_uri`; `..`
    /// never climbs above the package root.
    ///
    /// # Arguments
    /// * `base_uri` - The base URI to resolve from (e.g. "/ppt/slides")
    /// * `relative_ref` - The relative reference to resolve (e.g. "../media/image1.png")
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if relative_ref.is_empty() {
            return Err("empty relationship target".to_string());
        }
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/ppt/slides" for "/ppt/slides/slide1.xml".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For example, "slide1.xml" for "/ppt/slides/slide1.xml".
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the extension portion of this PackURI, without the leading period.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Get the partname index for tuple partnames, or None for singleton partnames.
    ///
    /// The index is the trailing run of ASCII digits before the extension:
    /// 21 for "/ppt/slides/slide21.xml", None for "/ppt/presentation.xml".
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        };

        let digits = stem.bytes().rev().take_while(u8::is_ascii_digit).count();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        atoi_simd::parse::<u32, false, false>(&stem.as_bytes()[stem.len() - digits..]).ok()
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the Zip file membername for the package item.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the relative reference from a base URI to this PackURI.
    ///
    /// For example, PackURI("/ppt/media/image1.png") gives
    /// "../media/image1.png" for base_uri "/ppt/slides".
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from_parts: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to_parts: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();

        let common = from_parts
            .iter()
            .zip(to_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = vec![".."; from_parts.len() - common];
        segments.extend(&to_parts[common..]);
        segments.join("/")
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/ppt/slides/_rels/slide1.xml.rels" for "/ppt/slides/slide1.xml".
    pub fn rels_uri(&self) -> PackURI {
        let base_uri = self.base_uri();
        let uri = if base_uri == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base_uri, self.filename())
        };
        PackURI { uri }
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Resolve `.` and `..` segments of an absolute path.
    fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();

        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop();
                },
                _ => parts.push(part),
            }
        }

        format!("/{}", parts.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";
