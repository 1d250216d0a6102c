use bytes::Bytes;

/// Caller-owned input handed to the planner or image generator.
///
/// Style images steer the look of every slide; content documents feed the
/// planner. Capabilities only read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAsset {
    /// Display name, usually the source file name
    pub name: String,
    /// MIME type such as `image/png` or `application/pdf`
    pub media_type: String,
    pub data: Bytes,
}

impl ReferenceAsset {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// True when the media type is an `image/*` type.
    pub fn is_image(&self) -> bool {
        self.media_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(ReferenceAsset::new("style.png", "image/png", vec![1u8]).is_image());
        assert!(ReferenceAsset::new("style.jpg", "IMAGE/JPEG", vec![1u8]).is_image());
        assert!(!ReferenceAsset::new("notes.pdf", "application/pdf", vec![1u8]).is_image());
        assert!(!ReferenceAsset::new("x", "img", vec![1u8]).is_image());
    }
}
