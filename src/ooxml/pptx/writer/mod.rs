//! Presentation writer components for picture-only PPTX output.

pub mod pres;
pub mod slide;

// Re-export main types
pub use pres::{PresentationWriter, SlideSize};
pub use slide::{PictureSlide, SlideImage};

use crate::ooxml::error::Result;
use tracing::info;

/// Write an ordered list of slide images to `.pptx` bytes.
///
/// Each `Some` image becomes one slide holding a single picture stretched over
/// the whole slide; `None` entries are skipped without leaving a placeholder.
///
/// # Examples
///
/// ```rust
/// use deckcraft::ooxml::pptx::{ImageFormat, SlideImage, SlideSize, write_package};
///
/// let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// let bytes = write_package(
///     [Some(SlideImage::new(&png, ImageFormat::Png)), None],
///     SlideSize::default(),
/// )?;
/// assert!(bytes.starts_with(b"PK"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_package<'a, I>(images: I, size: SlideSize) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Option<SlideImage<'a>>>,
{
    let mut pres = PresentationWriter::new(size);
    for image in images.into_iter().flatten() {
        pres.add_picture_slide(image);
    }

    let bytes = pres.to_bytes()?;
    info!(
        slides = pres.slide_count(),
        bytes = bytes.len(),
        "wrote presentation package"
    );
    Ok(bytes)
}
