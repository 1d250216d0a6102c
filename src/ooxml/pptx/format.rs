//! Raster formats carried by slide images.

use crate::ooxml::opc::constants::content_type as ct;
use std::fmt;

/// Image format types a slide picture can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Format of an imported media part, judged by its extension alone.
    ///
    /// `jpg` and `jpeg` (any case) map to JPEG; every other extension is
    /// treated as PNG.
    pub fn from_media_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Self::Jpeg
        } else {
            Self::Png
        }
    }

    /// Parse a MIME type such as `image/png`. Parameters after `;` are ignored.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF: 47 49 46 38 (GIF8)
        if bytes.starts_with(&[0x47, 0x49, 0x46, 0x38]) {
            return Some(Self::Gif);
        }

        // BMP: 42 4D (BM)
        if bytes.starts_with(&[0x42, 0x4D]) {
            return Some(Self::Bmp);
        }

        // TIFF: 49 49 2A 00 (little-endian) or 4D 4D 00 2A (big-endian)
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_extension_rule() {
        assert_eq!(ImageFormat::from_media_extension("jpg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_media_extension("JPEG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_media_extension("png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_media_extension("gif"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_media_extension(""), ImageFormat::Png);
    }

    #[test]
    fn test_mime_type_parsing() {
        assert_eq!(ImageFormat::from_mime_type("image/png"), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_mime_type("Image/JPEG; q=0.9"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_mime_type("application/pdf"), None);
    }

    #[test]
    fn test_detect_from_bytes() {
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0x89, b'P', b'N', b'G', 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect_from_bytes(b"BM"), None);
        assert_eq!(ImageFormat::detect_from_bytes(b"plain text"), None);
    }
}
