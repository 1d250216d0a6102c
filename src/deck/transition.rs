//! Slide state reducer.
//!
//! Every change to a slide goes through [`Deck::apply`], which checks the
//! transition against the slide state machine before mutating anything.
use super::image::ImageData;
use super::slide::SlideState;
use super::Deck;
use crate::common::error::{Error, Result};

/// A requested change to one slide.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Start a generation attempt: `Pending | Failed -> Generating`.
    BeginGenerate { position: u32 },
    /// Start an edit of the current image: `Done | Failed -> Generating`.
    /// A `Failed` slide qualifies only while it still holds an image.
    BeginEdit { position: u32 },
    /// Store a new image: `Generating -> Done`.
    Complete { position: u32, image: ImageData },
    /// Record a failed attempt: `Generating -> Failed`. The image, if any, is kept.
    Fail { position: u32, reason: String },
    /// Abandon an attempt that never produced a result: `Generating -> to`.
    Revert { position: u32, to: SlideState },
}

impl Transition {
    pub fn position(&self) -> u32 {
        match self {
            Transition::BeginGenerate { position }
            | Transition::BeginEdit { position }
            | Transition::Complete { position, .. }
            | Transition::Fail { position, .. }
            | Transition::Revert { position, .. } => *position,
        }
    }

    /// State the slide is in after the transition.
    pub fn target(&self) -> SlideState {
        match self {
            Transition::BeginGenerate { .. } | Transition::BeginEdit { .. } => {
                SlideState::Generating
            },
            Transition::Complete { .. } => SlideState::Done,
            Transition::Fail { .. } => SlideState::Failed,
            Transition::Revert { to, .. } => *to,
        }
    }
}

impl Deck {
    /// Apply a transition, or reject it without touching the deck.
    ///
    /// # Errors
    ///
    /// - [`Error::SlideNotFound`] if no slide has the position
    /// - [`Error::SlideNotEditable`] for an edit of a slide without an image
    /// - [`Error::IllegalTransition`] for anything the state machine forbids
    pub fn apply(&mut self, transition: Transition) -> Result<()> {
        let position = transition.position();
        let to = transition.target();
        let slide = self
            .slide_mut(position)
            .ok_or(Error::SlideNotFound(position))?;
        let from = slide.state;

        let illegal = || Error::IllegalTransition { position, from, to };

        match transition {
            Transition::BeginGenerate { .. } => {
                if !matches!(from, SlideState::Pending | SlideState::Failed) {
                    return Err(illegal());
                }
                slide.state = SlideState::Generating;
            },
            Transition::BeginEdit { .. } => {
                if !matches!(from, SlideState::Done | SlideState::Failed) {
                    return Err(illegal());
                }
                if slide.image.is_none() {
                    return Err(Error::SlideNotEditable {
                        position,
                        state: from,
                    });
                }
                slide.state = SlideState::Generating;
            },
            Transition::Complete { image, .. } => {
                if from != SlideState::Generating {
                    return Err(illegal());
                }
                slide.image = Some(image);
                slide.last_error = None;
                slide.state = SlideState::Done;
            },
            Transition::Fail { reason, .. } => {
                if from != SlideState::Generating {
                    return Err(illegal());
                }
                slide.last_error = Some(reason);
                slide.state = SlideState::Failed;
            },
            Transition::Revert { to, .. } => {
                if from != SlideState::Generating || to == SlideState::Generating {
                    return Err(illegal());
                }
                if to == SlideState::Done && slide.image.is_none() {
                    return Err(illegal());
                }
                slide.state = to;
            },
        }

        Ok(())
    }
}
