use super::image::ImageData;
use std::fmt;

/// Lifecycle state of a slide.
///
/// `Pending -> Generating -> Done | Failed`, with `Done -> Generating` for an
/// edit and `Failed -> Generating` for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideState {
    Pending,
    Generating,
    Done,
    Failed,
}

impl SlideState {
    /// True for `Done` and `Failed`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SlideState::Done | SlideState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlideState::Pending => "pending",
            SlideState::Generating => "generating",
            SlideState::Done => "done",
            SlideState::Failed => "failed",
        }
    }
}

impl fmt::Display for SlideState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slide of a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// 1-based position, stable for the lifetime of the deck
    pub(crate) position: u32,
    pub(crate) title: String,
    /// Opaque prompt handed to the image generator
    pub(crate) visual_prompt: String,
    pub(crate) image: Option<ImageData>,
    pub(crate) state: SlideState,
    /// Diagnostic of the most recent failed attempt
    pub(crate) last_error: Option<String>,
}

impl Slide {
    /// A planned slide awaiting generation.
    pub fn pending(position: u32, title: impl Into<String>, visual_prompt: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            visual_prompt: visual_prompt.into(),
            image: None,
            state: SlideState::Pending,
            last_error: None,
        }
    }

    /// An imported slide: already `Done`, titled `Slide N`, with no prompt.
    pub fn imported(position: u32, image: ImageData) -> Self {
        Self {
            position,
            title: format!("Slide {}", position),
            visual_prompt: String::new(),
            image: Some(image),
            state: SlideState::Done,
            last_error: None,
        }
    }

    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn visual_prompt(&self) -> &str {
        &self.visual_prompt
    }

    #[inline]
    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    #[inline]
    pub fn state(&self) -> SlideState {
        self.state
    }

    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Holds an image and is `Done` or `Failed`, i.e. eligible for an edit.
    pub fn is_editable(&self) -> bool {
        matches!(self.state, SlideState::Done | SlideState::Failed) && self.image.is_some()
    }
}
