//! Deck orchestration.
//!
//! [`DeckOrchestrator`] owns the current [`Deck`] and drives it through
//! planning, sequential per-slide generation and edits. Every state change is
//! an atomic check-and-apply on a [`tokio::sync::watch`] channel, so callers
//! can observe snapshots through [`DeckOrchestrator::subscribe`] while work is
//! in flight, and independent slides can be edited during a batch.
//!
//! # Example
//!
//! ```rust,no_run
//! use deckcraft::config::DeckConfig;
//! use deckcraft::generation::{ImageGenerator, Planner, ReferenceAsset};
//! use deckcraft::orchestrator::DeckOrchestrator;
//!
//! # async fn run(planner: impl Planner, generator: impl ImageGenerator) -> deckcraft::Result<()> {
//! let style = vec![ReferenceAsset::new("style.png", "image/png", std::fs::read("style.png")?)];
//! let orchestrator = DeckOrchestrator::new(planner, generator, DeckConfig::default());
//!
//! orchestrator.plan("Quarterly results for the board", &style, &[], 5).await?;
//! let report = orchestrator.generate_all_report(&style).await;
//! println!("{} done, {} failed", report.done_count(), report.failed_count());
//!
//! std::fs::write("deck.pptx", orchestrator.export_package()?)?;
//! # Ok(())
//! # }
//! ```

mod batch;
mod edit;
mod guard;

#[cfg(test)]
mod testing;

pub use batch::{BatchEvent, BatchReport, SlideOutcome};

use crate::common::error::{Error, Result};
use crate::config::DeckConfig;
use crate::deck::Deck;
use crate::generation::{GenerationError, ImageGenerator, PlanRequest, Planner, ReferenceAsset};
use crate::ooxml::pptx::{read_package, write_package};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Owns the deck and sequences planner and image generator calls.
pub struct DeckOrchestrator<P, G> {
    planner: P,
    generator: G,
    config: DeckConfig,
    deck: watch::Sender<Deck>,
}

impl<P, G> DeckOrchestrator<P, G>
where
    P: Planner,
    G: ImageGenerator,
{
    /// Create an orchestrator with an empty deck.
    pub fn new(planner: P, generator: G, config: DeckConfig) -> Self {
        let (deck, _) = watch::channel(Deck::empty());
        Self {
            planner,
            generator,
            config,
            deck,
        }
    }

    #[inline]
    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// The current deck.
    pub fn snapshot(&self) -> Deck {
        self.deck.borrow().clone()
    }

    /// Observe every published deck snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Deck> {
        self.deck.subscribe()
    }

    /// Plan a new deck and make it current.
    ///
    /// The planner is called once. The returned slides are taken as-is, in
    /// the order returned, renumbered from 1; their count is not checked
    /// against `target_count`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] for an empty brief, no style assets or a
    ///   count outside the configured range; the planner is not called
    /// - [`Error::PlanningFailed`] if the planner fails or times out; the
    ///   current deck is left as it was
    pub async fn plan(
        &self,
        brief: &str,
        style_assets: &[ReferenceAsset],
        content_assets: &[ReferenceAsset],
        target_count: u32,
    ) -> Result<Deck> {
        if brief.trim().is_empty() {
            return Err(Error::InvalidRequest("brief must not be empty".to_string()));
        }
        if style_assets.is_empty() {
            return Err(Error::InvalidRequest(
                "at least one style asset is required".to_string(),
            ));
        }
        let range = self.config.slide_count_range();
        if !range.contains(&target_count) {
            return Err(Error::InvalidRequest(format!(
                "slide count {} outside {}..={}",
                target_count,
                range.start(),
                range.end()
            )));
        }

        let request = PlanRequest {
            brief: brief.to_string(),
            style_assets: style_assets.to_vec(),
            content_assets: content_assets.to_vec(),
            slide_count: target_count,
        };

        info!(target_count, "planning deck");
        let specs = bounded(self.config.plan_timeout(), self.planner.plan(&request))
            .await
            .map_err(|e| {
                warn!(kind = e.kind(), error = %e, "planning failed");
                Error::PlanningFailed(e.to_string())
            })?;

        if specs.len() != target_count as usize {
            debug!(
                requested = target_count,
                returned = specs.len(),
                "planner returned a different slide count"
            );
        }

        let deck = self.replace_deck(|epoch| Deck::planned(epoch, specs));
        info!(slides = deck.len(), epoch = deck.epoch(), "deck planned");
        Ok(deck)
    }

    /// Replace the deck with the slide images of a `.pptx` package.
    ///
    /// Imported slides are `Done`. A package with no recoverable images leaves
    /// the current deck in place and returns an empty deck; callers that need
    /// content can map that to [`Error::EmptyImport`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPackage`] if `bytes` is not a ZIP archive.
    pub fn import_package(&self, bytes: &[u8]) -> Result<Deck> {
        let entries = read_package(bytes)?;
        if entries.is_empty() {
            info!("package has no slide images, keeping current deck");
            return Ok(Deck::empty());
        }

        let deck = self.replace_deck(|epoch| Deck::imported(epoch, entries));
        info!(slides = deck.len(), epoch = deck.epoch(), "deck imported");
        Ok(deck)
    }

    /// Write every slide that has an image to `.pptx` bytes, in position order.
    pub fn export_package(&self) -> Result<Vec<u8>> {
        let deck = self.snapshot();
        let bytes = write_package(
            deck.images().map(|(_, image)| Some(image.as_slide_image())),
            self.config.slide_size(),
        )?;
        info!(
            exported = deck.images().count(),
            skipped = deck.len() - deck.images().count(),
            "deck exported"
        );
        Ok(bytes)
    }

    /// Discard the deck. Calls still running for it will be ignored.
    pub fn reset(&self) -> Deck {
        let deck = self.replace_deck(|epoch| Deck::from_slides(epoch, Vec::new()));
        info!(epoch = deck.epoch(), "deck reset");
        deck
    }

    /// Install a new deck under the next epoch.
    fn replace_deck(&self, build: impl FnOnce(u64) -> Deck) -> Deck {
        let mut installed = Deck::empty();
        self.deck.send_modify(|deck| {
            *deck = build(deck.epoch() + 1);
            installed = deck.clone();
        });
        installed
    }

    /// Run `f` against the current deck and publish the result if it succeeds.
    ///
    /// `f` must leave the deck untouched when it returns an error.
    fn update<T>(&self, f: impl FnOnce(&mut Deck) -> Result<T>) -> Result<(T, Deck)> {
        let mut outcome = Err(Error::Other("deck update did not run".to_string()));
        self.deck.send_if_modified(|deck| match f(deck) {
            Ok(value) => {
                outcome = Ok((value, deck.clone()));
                true
            },
            Err(e) => {
                outcome = Err(e);
                false
            },
        });
        outcome
    }
}

/// Await `call`, turning expiry of `limit` into [`GenerationError::Timeout`].
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = std::result::Result<T, GenerationError>>,
) -> std::result::Result<T, GenerationError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::deck::SlideState;
    use crate::generation::SlideSpec;
    use crate::ooxml::pptx::{ImageFormat, SlideImage, SlideSize};

    #[tokio::test]
    async fn test_plan_builds_pending_deck() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b", "c"])));
        let deck = orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.epoch(), 1);
        assert_eq!(deck.count(SlideState::Pending), 3);
        assert_eq!(orchestrator.snapshot(), deck);
        assert_eq!(orchestrator.planner.calls(), 1);

        let request = orchestrator.planner.last_request().unwrap();
        assert_eq!(request.slide_count, 3);
        assert_eq!(request.style_assets.len(), 1);
    }

    #[tokio::test]
    async fn test_plan_accepts_count_mismatch_and_renumbers() {
        let returned = vec![
            SlideSpec::new(9, "x", "px"),
            SlideSpec::new(4, "y", "py"),
            SlideSpec::new(4, "z", "pz"),
            SlideSpec::new(1, "w", "pw"),
        ];
        let orchestrator = orchestrator(FakePlanner::returning(returned));
        let deck = orchestrator.plan("brief", &style(), &[], 6).await.unwrap();

        assert_eq!(deck.positions(), [1, 2, 3, 4]);
        let titles: Vec<&str> = deck.slides().iter().map(|s| s.title()).collect();
        assert_eq!(titles, ["x", "y", "z", "w"]);
    }

    #[tokio::test]
    async fn test_plan_rejects_bad_requests_without_calling_planner() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b", "c"])));

        for (brief, assets, count) in [
            ("   ", style(), 3),
            ("brief", Vec::new(), 3),
            ("brief", style(), 2),
            ("brief", style(), 21),
        ] {
            let result = orchestrator.plan(brief, &assets, &[], count).await;
            assert!(matches!(result, Err(Error::InvalidRequest(_))));
        }
        assert_eq!(orchestrator.planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_planning_failure_leaves_deck_untouched() {
        let orchestrator = orchestrator(FakePlanner::failing("model overloaded"));
        orchestrator.import_package(&package_of(2)).unwrap();
        let before = orchestrator.snapshot();

        let result = orchestrator.plan("brief", &style(), &[], 3).await;
        assert!(matches!(result, Err(Error::PlanningFailed(msg)) if msg.contains("model overloaded")));
        assert_eq!(orchestrator.snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_planning_timeout() {
        let orchestrator = orchestrator(FakePlanner::hanging());
        let result = orchestrator.plan("brief", &style(), &[], 3).await;
        assert!(matches!(result, Err(Error::PlanningFailed(msg)) if msg.contains("timed out")));
        assert!(orchestrator.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_import_replaces_deck_with_done_slides() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b", "c"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let deck = orchestrator.import_package(&package_of(2)).unwrap();
        assert_eq!(deck.epoch(), 2);
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.count(SlideState::Done), 2);
        assert_eq!(deck.slide(1).unwrap().title(), "Slide 1");
        assert_eq!(deck.slide(2).unwrap().visual_prompt(), "");
    }

    #[tokio::test]
    async fn test_empty_import_keeps_current_deck() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b", "c"])));
        let planned = orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let empty = write_package(std::iter::empty::<Option<SlideImage<'_>>>(), SlideSize::default()).unwrap();
        let deck = orchestrator.import_package(&empty).unwrap();
        assert!(deck.is_empty());
        assert_eq!(orchestrator.snapshot(), planned);
    }

    #[tokio::test]
    async fn test_import_rejects_non_zip() {
        let orchestrator = orchestrator(FakePlanner::returning(Vec::new()));
        let result = orchestrator.import_package(b"GIF89a not a package");
        assert!(matches!(result, Err(Error::InvalidPackage(_))));
    }

    #[tokio::test]
    async fn test_import_export_agree() {
        let orchestrator = orchestrator(FakePlanner::returning(Vec::new()));
        let imported = orchestrator.import_package(&package_of(5)).unwrap();

        let exported = orchestrator.export_package().unwrap();
        let reimported = read_package(&exported).unwrap();
        assert_eq!(reimported.len(), imported.len());
        for (entry, (position, image)) in reimported.iter().zip(imported.images()) {
            assert_eq!(entry.position, position);
            assert_eq!(&entry.data[..], image.as_slice());
            assert_eq!(entry.format, ImageFormat::Png);
        }
    }

    #[tokio::test]
    async fn test_reset_discards_deck() {
        let orchestrator = orchestrator(FakePlanner::returning(Vec::new()));
        orchestrator.import_package(&package_of(2)).unwrap();
        let mut rx = orchestrator.subscribe();

        let deck = orchestrator.reset();
        assert!(deck.is_empty());
        assert_eq!(deck.epoch(), 2);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }
}
