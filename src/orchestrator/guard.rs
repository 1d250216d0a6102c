use crate::common::error::Result;
use crate::deck::{Deck, SlideState, Transition};
use tokio::sync::watch;
use tracing::debug;

/// Ownership of one slide while its generate or edit call runs.
///
/// Created right after the slide entered `Generating`. [`InFlight::finish`]
/// publishes the call's result; dropping the guard without finishing (the
/// caller's future was cancelled) puts the slide back into the state it had
/// before the call.
pub(crate) struct InFlight<'a> {
    deck: &'a watch::Sender<Deck>,
    epoch: u64,
    position: u32,
    prior: SlideState,
    armed: bool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn new(
        deck: &'a watch::Sender<Deck>,
        epoch: u64,
        position: u32,
        prior: SlideState,
    ) -> Self {
        Self {
            deck,
            epoch,
            position,
            prior,
            armed: true,
        }
    }

    #[inline]
    pub(crate) fn position(&self) -> u32 {
        self.position
    }

    /// Apply the terminal transition and return the published snapshot.
    ///
    /// `Ok(None)` means the deck was replaced while the call ran; the result
    /// is dropped.
    pub(crate) fn finish(mut self, transition: Transition) -> Result<Option<Deck>> {
        self.armed = false;
        let epoch = self.epoch;

        let mut landed = Ok(None);
        self.deck.send_if_modified(|deck| {
            if deck.epoch() != epoch {
                return false;
            }
            match deck.apply(transition) {
                Ok(()) => {
                    landed = Ok(Some(deck.clone()));
                    true
                },
                Err(e) => {
                    landed = Err(e);
                    false
                },
            }
        });

        if matches!(landed, Ok(None)) {
            debug!(
                position = self.position,
                epoch, "deck replaced during call, discarding result"
            );
        }
        landed
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let (epoch, position, prior) = (self.epoch, self.position, self.prior);
        let reverted = self.deck.send_if_modified(|deck| {
            deck.epoch() == epoch
                && deck
                    .apply(Transition::Revert {
                        position,
                        to: prior,
                    })
                    .is_ok()
        });

        if reverted {
            debug!(position, to = %prior, "call cancelled, slide reverted");
        }
    }
}
