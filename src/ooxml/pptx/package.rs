//! Slide image import from an existing presentation package.
//!
//! Walks `ppt/slides/slide<N>.xml` in numeric order, follows the first image
//! relationship of each slide, and returns the referenced media bytes.
//! Slides that cannot yield an image are skipped; only an input that is not a
//! ZIP archive is an error.
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::part_name;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::parse_rels_xml;
use crate::ooxml::pptx::format::ImageFormat;
use bytes::Bytes;
use tracing::{debug, warn};

/// One recovered slide image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Ordinal `N` of the `slide<N>.xml` part the image came from
    pub position: u32,

    /// Raw media bytes
    pub data: Bytes,

    /// Format judged from the media part's extension
    pub format: ImageFormat,
}

impl PackageEntry {
    /// MIME type of the image.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Read every slide image from a `.pptx` byte buffer.
///
/// Entries are ordered by slide ordinal compared numerically, so `slide10.xml`
/// follows `slide9.xml`. Zero recoverable slides is an empty vector.
///
/// # Errors
///
/// Returns an error only when `bytes` is not a ZIP archive.
///
/// # Examples
///
/// ```rust,no_run
/// use deckcraft::ooxml::pptx::read_package;
///
/// let data = std::fs::read("deck.pptx")?;
/// for entry in read_package(&data)? {
///     println!("slide {}: {} bytes of {}", entry.position, entry.data.len(), entry.mime_type());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn read_package(bytes: &[u8]) -> Result<Vec<PackageEntry>> {
    let mut phys = PhysPkgReader::new(bytes)?;

    let mut slides: Vec<(u32, PackURI)> = phys
        .member_names()
        .iter()
        .map(|name| PackURI::from_membername(name))
        .filter_map(|uri| slide_ordinal(&uri).map(|idx| (idx, uri)))
        .collect();
    slides.sort_by_key(|(idx, _)| *idx);

    let mut entries = Vec::with_capacity(slides.len());
    for (position, slide_uri) in slides {
        match first_slide_image(&mut phys, &slide_uri) {
            Ok(Some((data, format))) => entries.push(PackageEntry {
                position,
                data: Bytes::from(data),
                format,
            }),
            Ok(None) => debug!(slide = %slide_uri, "no image relationship, skipping slide"),
            Err(e) => warn!(slide = %slide_uri, error = %e, "unreadable slide image, skipping slide"),
        }
    }

    debug!(count = entries.len(), "read slide images from package");
    Ok(entries)
}

/// Ordinal of a `/ppt/slides/slide<N>.xml` part, or None for any other member.
fn slide_ordinal(uri: &PackURI) -> Option<u32> {
    if uri.base_uri() != part_name::SLIDES_DIR || !uri.ext().eq_ignore_ascii_case("xml") {
        return None;
    }

    let filename = uri.filename();
    let stem = &filename[..filename.len() - uri.ext().len() - 1];
    let digits = stem.strip_prefix(part_name::SLIDE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    uri.idx()
}

/// Media bytes behind the first image relationship of a slide.
///
/// `Ok(None)` means the slide has no relationships part or no image
/// relationship. Unparseable rels, external targets and missing media are
/// errors that the caller logs and skips.
fn first_slide_image(
    phys: &mut PhysPkgReader<'_>,
    slide_uri: &PackURI,
) -> std::result::Result<Option<(Vec<u8>, ImageFormat)>, OpcError> {
    let Some(rels_xml) = phys.rels_xml_for(slide_uri)? else {
        return Ok(None);
    };

    let srels = parse_rels_xml(&rels_xml, slide_uri.base_uri())?;
    let Some(image_rel) = srels.iter().find(|rel| rel.is_image()) else {
        return Ok(None);
    };

    let media_uri = image_rel.target_partname()?;
    let blob = phys.blob_for(&media_uri)?;
    Ok(Some((blob, ImageFormat::from_media_extension(media_uri.ext()))))
}
