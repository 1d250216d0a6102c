use super::guard::InFlight;
use super::{DeckOrchestrator, bounded};
use crate::common::error::{Error, Result};
use crate::deck::{Deck, SlideState, Transition};
use crate::generation::{ImageGenerator, Planner, ReferenceAsset};
use tracing::{info, warn};

const SUPERSEDED: &str = "superseded by a newer deck";

impl<P, G> DeckOrchestrator<P, G>
where
    P: Planner,
    G: ImageGenerator,
{
    /// Apply a natural-language edit to the image of a slide.
    ///
    /// The slide must hold an image and be `Done`, or `Failed` after an
    /// earlier edit. It is `Generating` while the call runs; other slides stay
    /// available. On success the new image replaces the old one. On failure
    /// the slide becomes `Failed` but keeps its previous image, which is
    /// still exported. A cancelled call leaves the slide as it was.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] for an empty instruction
    /// - [`Error::SlideNotFound`] if no slide has the position
    /// - [`Error::SlideBusy`] if a call is already running for the slide
    /// - [`Error::SlideNotEditable`] if the slide has no image to edit
    /// - [`Error::SlideEditFailed`] if the edit fails, times out or lands on a
    ///   replaced deck
    pub async fn edit_slide(&self, position: u32, instruction: &str) -> Result<Deck> {
        if instruction.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "edit instruction must not be empty".to_string(),
            ));
        }

        let ((image, prior, epoch), _) = self.update(|deck| {
            let epoch = deck.epoch();
            let slide = deck.slide(position).ok_or(Error::SlideNotFound(position))?;
            let (image, prior) = match (slide.state(), slide.image()) {
                (SlideState::Generating, _) => return Err(Error::SlideBusy(position)),
                (state @ (SlideState::Done | SlideState::Failed), Some(image)) => {
                    (image.clone(), state)
                },
                (state, _) => return Err(Error::SlideNotEditable { position, state }),
            };
            deck.apply(Transition::BeginEdit { position })?;
            Ok((image, prior, epoch))
        })?;

        info!(position, from = %prior, "editing slide");
        let guard = InFlight::new(&self.deck, epoch, position, prior);
        let result = bounded(
            self.config.call_timeout(),
            self.generator.edit(&image, instruction),
        )
        .await;

        match result {
            Ok(edited) => match guard.finish(Transition::Complete {
                position,
                image: edited,
            })? {
                Some(deck) => {
                    info!(position, "slide edited");
                    Ok(deck)
                },
                None => Err(Error::SlideEditFailed {
                    position,
                    reason: SUPERSEDED.to_string(),
                }),
            },
            Err(e) => {
                warn!(position, kind = e.kind(), error = %e, "slide edit failed");
                let reason = e.to_string();
                guard.finish(Transition::Fail {
                    position,
                    reason: reason.clone(),
                })?;
                Err(Error::SlideEditFailed { position, reason })
            },
        }
    }

    /// Generate the image of a single `Pending` or `Failed` slide again.
    ///
    /// # Errors
    ///
    /// - [`Error::SlideNotFound`] if no slide has the position
    /// - [`Error::SlideBusy`] if a call is already running for the slide
    /// - [`Error::InvalidRequest`] if the slide has no visual prompt
    /// - [`Error::IllegalTransition`] if the slide is already `Done`
    /// - [`Error::SlideGenerationFailed`] if the call fails, times out or lands
    ///   on a replaced deck
    pub async fn retry_slide(
        &self,
        position: u32,
        style_assets: &[ReferenceAsset],
    ) -> Result<Deck> {
        let ((prompt, prior, epoch), _) = self.update(|deck| {
            let epoch = deck.epoch();
            let slide = deck.slide(position).ok_or(Error::SlideNotFound(position))?;
            if slide.state() == SlideState::Generating {
                return Err(Error::SlideBusy(position));
            }
            if slide.visual_prompt().trim().is_empty() {
                return Err(Error::InvalidRequest(format!(
                    "slide {} has no visual prompt to generate from",
                    position
                )));
            }
            let prompt = slide.visual_prompt().to_string();
            let prior = slide.state();
            deck.apply(Transition::BeginGenerate { position })?;
            Ok((prompt, prior, epoch))
        })?;

        info!(position, "retrying slide");
        let guard = InFlight::new(&self.deck, epoch, position, prior);
        let result = bounded(
            self.config.call_timeout(),
            self.generator.generate(&prompt, style_assets),
        )
        .await;

        let failed = |reason: String| Error::SlideGenerationFailed { position, reason };
        match result {
            Ok(image) => guard
                .finish(Transition::Complete { position, image })?
                .ok_or_else(|| failed(SUPERSEDED.to_string())),
            Err(e) => {
                warn!(position, kind = e.kind(), error = %e, "slide generation failed");
                let reason = e.to_string();
                guard.finish(Transition::Fail {
                    position,
                    reason: reason.clone(),
                })?;
                Err(failed(reason))
            },
        }
    }
}
