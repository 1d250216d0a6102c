//! Raster image payloads held by slides.
use crate::common::error::{Error, Result};
use crate::ooxml::pptx::{ImageFormat, PackageEntry, SlideImage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

/// Encoded image bytes plus their format.
///
/// Cloning is cheap: the bytes are reference counted, so snapshots of a deck
/// share image buffers instead of copying them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    data: Bytes,
    format: ImageFormat,
}

impl ImageData {
    /// Wrap bytes whose format is already known.
    pub fn new(data: impl Into<Bytes>, format: ImageFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    /// Wrap bytes, detecting the format from their magic number.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if the bytes are not a recognised raster format.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let format = ImageFormat::detect_from_bytes(&data).ok_or_else(|| {
            Error::InvalidRequest("image bytes are not a recognised raster format".to_string())
        })?;
        Ok(Self { data, format })
    }

    /// Decode a `data:<mime>;base64,<payload>` URL.
    ///
    /// The declared MIME type wins; when it is missing or not an image type the
    /// format is detected from the decoded bytes.
    ///
    /// ```rust
    /// use deckcraft::deck::ImageData;
    /// use deckcraft::ooxml::pptx::ImageFormat;
    ///
    /// let image = ImageData::from_data_url("data:image/jpeg;base64,/9j/4AAQ")?;
    /// assert_eq!(image.format(), ImageFormat::Jpeg);
    /// # Ok::<(), deckcraft::Error>(())
    /// ```
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidRequest("not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidRequest("data URL has no payload".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidRequest("data URL is not base64 encoded".to_string()))?;

        let decoded = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidRequest(format!("invalid base64 in data URL: {}", e)))?;

        match ImageFormat::from_mime_type(mime) {
            Some(format) => Ok(Self::new(decoded, format)),
            None => Self::from_bytes(decoded),
        }
    }

    /// Encoded bytes.
    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[inline]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow as a package writer input.
    pub fn as_slide_image(&self) -> SlideImage<'_> {
        SlideImage::new(&self.data, self.format)
    }
}

impl From<PackageEntry> for ImageData {
    fn from(entry: PackageEntry) -> Self {
        Self::new(entry.data, entry.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_sniffs_format() {
        let png = ImageData::from_bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A]).unwrap();
        assert_eq!(png.format(), ImageFormat::Png);
        assert_eq!(png.mime_type(), "image/png");

        assert!(matches!(
            ImageData::from_bytes(&b"hello world"[..]),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_data_url_with_mime() {
        // "abc" in base64; the declared type is trusted
        let image = ImageData::from_data_url("data:image/png;base64,YWJj").unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.as_slice(), b"abc");
    }

    #[test]
    fn test_data_url_without_image_mime_falls_back_to_sniffing() {
        let encoded = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
        let url = format!("data:application/octet-stream;base64,{}", encoded);
        let image = ImageData::from_data_url(&url).unwrap();
        assert_eq!(image.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_malformed_data_urls() {
        for url in [
            "https://example.com/a.png",
            "data:image/png;base64",
            "data:image/png,plain",
            "data:image/png;base64,@@@",
        ] {
            assert!(
                matches!(ImageData::from_data_url(url), Err(Error::InvalidRequest(_))),
                "accepted {}",
                url
            );
        }
    }

    #[test]
    fn test_clone_shares_buffer() {
        let image = ImageData::new(vec![1u8, 2, 3], ImageFormat::Png);
        let copy = image.clone();
        assert_eq!(image.bytes().as_ptr(), copy.bytes().as_ptr());
    }
}
