//! PowerPoint (.pptx) codec for picture-only decks.
//!
//! Two directions are supported:
//!
//! - [`read_package`]: recover one raster image per slide from an existing
//!   presentation, in slide order
//! - [`write_package`]: build a fresh presentation with one full-bleed picture
//!   per slide
//!
//! # Example
//!
//! ```rust,no_run
//! use deckcraft::ooxml::pptx::{SlideImage, SlideSize, read_package, write_package};
//!
//! let source = std::fs::read("input.pptx")?;
//! let entries = read_package(&source)?;
//! let images = entries
//!     .iter()
//!     .map(|entry| Some(SlideImage::new(&entry.data, entry.format)));
//! let rebuilt = write_package(images, SlideSize::default())?;
//! std::fs::write("output.pptx", rebuilt)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod format;
pub mod package;
pub mod template;
pub mod writer;

pub use format::ImageFormat;
pub use package::{PackageEntry, read_package};
pub use writer::{SlideImage, SlideSize, write_package};
