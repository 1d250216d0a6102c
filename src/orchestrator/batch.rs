//! Sequential generation of every slide in the deck.
use super::guard::InFlight;
use super::{DeckOrchestrator, bounded};
use crate::deck::{Deck, SlideState, Transition};
use crate::generation::{ImageGenerator, Planner, ReferenceAsset};
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, info, warn};

/// How the batch left one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideOutcome {
    Done,
    Failed { reason: String },
    /// Not attempted: already done, busy with another call, or nothing to
    /// generate from
    Skipped { state: SlideState },
}

/// Progress of a batch, one item per published change.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// The slide entered `Generating`
    Started { position: u32, deck: Deck },
    /// The slide reached its outcome for this batch
    Finished {
        position: u32,
        outcome: SlideOutcome,
        deck: Deck,
    },
    /// Last item of every batch
    Completed(BatchReport),
}

/// Per-slide outcomes of a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<(u32, SlideOutcome)>,
    /// The deck was replaced before every slide was processed
    pub interrupted: bool,
}

impl BatchReport {
    pub fn done_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, SlideOutcome::Done))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, SlideOutcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, SlideOutcome::Skipped { .. }))
    }

    /// Positions whose outcome is `Failed`.
    pub fn failed_positions(&self) -> Vec<u32> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SlideOutcome::Failed { .. }))
            .map(|(position, _)| *position)
            .collect()
    }

    fn count(&self, pred: impl Fn(&SlideOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| pred(outcome)).count()
    }
}

/// What to do with the next slide in the queue.
enum Next {
    Generate { prompt: String, prior: SlideState },
    Skip(SlideState),
    Stale,
}

struct BatchState<'a, P, G> {
    orchestrator: &'a DeckOrchestrator<P, G>,
    style_assets: &'a [ReferenceAsset],
    epoch: u64,
    queue: std::vec::IntoIter<u32>,
    in_flight: Option<(InFlight<'a>, String)>,
    records: Vec<(u32, SlideOutcome)>,
    interrupted: bool,
    completed: bool,
}

impl<'a, P, G> BatchState<'a, P, G>
where
    P: Planner,
    G: ImageGenerator,
{
    async fn step(mut self) -> Option<(BatchEvent, Self)> {
        if self.completed {
            return None;
        }

        if let Some((guard, prompt)) = self.in_flight.take() {
            return Some(self.finish_slide(guard, prompt).await);
        }

        let Some(position) = self.queue.next() else {
            return Some(self.complete());
        };

        match self.begin(position) {
            (Next::Generate { prompt, prior }, deck) => {
                let orchestrator = self.orchestrator;
                let guard = InFlight::new(&orchestrator.deck, self.epoch, position, prior);
                self.in_flight = Some((guard, prompt));
                Some((BatchEvent::Started { position, deck }, self))
            },
            (Next::Skip(state), deck) => {
                debug!(position, %state, "slide not attempted");
                let outcome = SlideOutcome::Skipped { state };
                self.records.push((position, outcome.clone()));
                Some((
                    BatchEvent::Finished {
                        position,
                        outcome,
                        deck,
                    },
                    self,
                ))
            },
            (Next::Stale, _) => {
                self.interrupted = true;
                Some(self.complete())
            },
        }
    }

    /// Decide and, for a generate, enter `Generating` in one atomic step.
    fn begin(&self, position: u32) -> (Next, Deck) {
        let epoch = self.epoch;
        let mut next = Next::Stale;
        let mut snapshot = Deck::empty();

        self.orchestrator.deck.send_if_modified(|deck| {
            next = decide(deck, epoch, position);
            let modified = matches!(next, Next::Generate { .. })
                && deck.apply(Transition::BeginGenerate { position }).is_ok();
            snapshot = deck.clone();
            modified
        });

        (next, snapshot)
    }

    async fn finish_slide(mut self, guard: InFlight<'a>, prompt: String) -> (BatchEvent, Self) {
        let position = guard.position();
        let orchestrator = self.orchestrator;
        let generator = &orchestrator.generator;
        let limit = orchestrator.config.call_timeout();

        let (transition, outcome) =
            match bounded(limit, generator.generate(&prompt, self.style_assets)).await {
                Ok(image) => (Transition::Complete { position, image }, SlideOutcome::Done),
                Err(e) => {
                    warn!(position, kind = e.kind(), error = %e, "slide generation failed");
                    let reason = e.to_string();
                    (
                        Transition::Fail {
                            position,
                            reason: reason.clone(),
                        },
                        SlideOutcome::Failed { reason },
                    )
                },
            };

        match guard.finish(transition) {
            Ok(Some(deck)) => {
                self.records.push((position, outcome.clone()));
                (
                    BatchEvent::Finished {
                        position,
                        outcome,
                        deck,
                    },
                    self,
                )
            },
            Ok(None) => {
                self.interrupted = true;
                self.complete()
            },
            Err(e) => {
                warn!(position, error = %e, "could not record slide result");
                self.interrupted = true;
                self.complete()
            },
        }
    }

    fn complete(mut self) -> (BatchEvent, Self) {
        self.completed = true;
        let report = BatchReport {
            outcomes: std::mem::take(&mut self.records),
            interrupted: self.interrupted,
        };
        info!(
            done = report.done_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            interrupted = report.interrupted,
            "batch finished"
        );
        (BatchEvent::Completed(report), self)
    }
}

/// Classify the slide at `position` for a batch running under `epoch`.
fn decide(deck: &Deck, epoch: u64, position: u32) -> Next {
    if deck.epoch() != epoch {
        return Next::Stale;
    }
    let Some(slide) = deck.slide(position) else {
        return Next::Stale;
    };
    match slide.state() {
        SlideState::Pending | SlideState::Failed if !slide.visual_prompt().trim().is_empty() => {
            Next::Generate {
                prompt: slide.visual_prompt().to_string(),
                prior: slide.state(),
            }
        },
        state => Next::Skip(state),
    }
}

impl<P, G> DeckOrchestrator<P, G>
where
    P: Planner,
    G: ImageGenerator,
{
    /// Generate images for the current deck, one slide at a time in position
    /// order.
    ///
    /// For each `Pending` or `Failed` slide the stream yields
    /// [`BatchEvent::Started`] and then [`BatchEvent::Finished`] once the call
    /// returned; a slide's result is published before the next slide starts.
    /// Slides already `Done` (or busy with an edit) are reported as skipped.
    /// Failures are recorded on the slide and never end the batch. The stream
    /// always ends with [`BatchEvent::Completed`]; if the deck is replaced
    /// meanwhile, the in-flight result is discarded and the batch stops early.
    ///
    /// The stream is lazy: a slide enters `Generating` when `Started` is
    /// yielded, but its generate call only begins on the next poll. A consumer
    /// that stops polling after `Started` leaves the slide `Generating` with no
    /// call running until the stream is polled again or dropped.
    ///
    /// Dropping the stream mid-call puts the slide back into its prior state.
    pub fn generate_all<'a>(
        &'a self,
        style_assets: &'a [ReferenceAsset],
    ) -> impl Stream<Item = BatchEvent> + 'a {
        let deck = self.snapshot();
        info!(slides = deck.len(), epoch = deck.epoch(), "batch started");

        let state = BatchState {
            orchestrator: self,
            style_assets,
            epoch: deck.epoch(),
            queue: deck.positions().into_iter(),
            in_flight: None,
            records: Vec::with_capacity(deck.len()),
            interrupted: false,
            completed: false,
        };
        stream::unfold(state, BatchState::step)
    }

    /// Run [`generate_all`](Self::generate_all) to completion and return its report.
    pub async fn generate_all_report(&self, style_assets: &[ReferenceAsset]) -> BatchReport {
        self.generate_all(style_assets)
            .fold(BatchReport::default(), |report, event| async move {
                match event {
                    BatchEvent::Completed(report) => report,
                    _ => report,
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::common::error::Error;
    use crate::ooxml::pptx::read_package;
    use std::time::Duration;

    async fn collect(
        orchestrator: &DeckOrchestrator<FakePlanner, FakeGenerator>,
    ) -> Vec<BatchEvent> {
        let style = style();
        orchestrator.generate_all(&style).collect().await
    }

    /// `(position, state)` pairs in the order they were published.
    fn transitions(events: &[BatchEvent]) -> Vec<(u32, SlideState)> {
        events
            .iter()
            .filter_map(|event| match event {
                BatchEvent::Started { position, .. } => Some((*position, SlideState::Generating)),
                BatchEvent::Finished {
                    position,
                    outcome: SlideOutcome::Done,
                    ..
                } => Some((*position, SlideState::Done)),
                BatchEvent::Finished {
                    position,
                    outcome: SlideOutcome::Failed { .. },
                    ..
                } => Some((*position, SlideState::Failed)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_three_slide_scenario_exports_two() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["one", "two #fail", "three"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let events = collect(&orchestrator).await;
        assert_eq!(
            transitions(&events),
            [
                (1, SlideState::Generating),
                (1, SlideState::Done),
                (2, SlideState::Generating),
                (2, SlideState::Failed),
                (3, SlideState::Generating),
                (3, SlideState::Done),
            ]
        );

        let deck = orchestrator.snapshot();
        assert_eq!(deck.slide(2).unwrap().state(), SlideState::Failed);
        assert!(deck.slide(2).unwrap().image().is_none());
        assert!(deck.slide(2).unwrap().last_error().unwrap().contains("went wrong"));

        let entries = read_package(&orchestrator.export_package().unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(&entries[0].data[..], deck.slide(1).unwrap().image().unwrap().as_slice());
        assert_eq!(&entries[1].data[..], deck.slide(3).unwrap().image().unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_generation_is_sequential_and_in_order() {
        let prompts = ["p1", "p2 #fail", "p3", "p4 #fail", "p5"];
        let orchestrator = orchestrator(FakePlanner::returning(specs(&prompts)));
        orchestrator.plan("brief", &style(), &[], 5).await.unwrap();

        let events = collect(&orchestrator).await;

        // Exactly one Generating -> terminal pair per slide, never interleaved
        let pairs = transitions(&events);
        assert_eq!(pairs.len(), 2 * prompts.len());
        for (index, chunk) in pairs.chunks(2).enumerate() {
            let position = index as u32 + 1;
            assert_eq!(chunk[0], (position, SlideState::Generating));
            assert_eq!(chunk[1].0, position);
            assert!(chunk[1].1.is_terminal());
        }
        assert_eq!(orchestrator.generator.calls(), prompts);

        // Each Started snapshot shows every earlier slide already terminal
        for event in &events {
            if let BatchEvent::Started { position, deck } = event {
                assert!(deck
                    .slides()
                    .iter()
                    .filter(|slide| slide.position() < *position)
                    .all(|slide| slide.state().is_terminal()));
                assert_eq!(deck.count(SlideState::Generating), 1);
            }
        }

        match events.last() {
            Some(BatchEvent::Completed(report)) => {
                assert_eq!(report.done_count(), 3);
                assert_eq!(report.failed_positions(), [2, 4]);
                assert!(!report.interrupted);
            },
            other => panic!("unexpected last event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_isolation() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a #fail", "b", "c #fail", "d"])));
        orchestrator.plan("brief", &style(), &[], 4).await.unwrap();

        let report = orchestrator.generate_all_report(&style()).await;
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.failed_positions(), [1, 3]);

        let deck = orchestrator.snapshot();
        assert_eq!(deck.slide(2).unwrap().image().unwrap(), &png(b"b"));
        assert_eq!(deck.slide(4).unwrap().image().unwrap(), &png(b"d"));
    }

    #[tokio::test]
    async fn test_rerun_skips_done_slides() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b #fail", "c"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();
        orchestrator.generate_all_report(&style()).await;

        let report = orchestrator.generate_all_report(&style()).await;
        assert_eq!(
            report.outcomes,
            [
                (1, SlideOutcome::Skipped { state: SlideState::Done }),
                (
                    2,
                    SlideOutcome::Failed {
                        reason: "transport error: b #fail went wrong".to_string()
                    }
                ),
                (3, SlideOutcome::Skipped { state: SlideState::Done }),
            ]
        );
        assert_eq!(orchestrator.generator.calls(), ["a", "b #fail", "c", "b #fail"]);
    }

    #[tokio::test]
    async fn test_imported_deck_has_nothing_to_generate() {
        let orchestrator = orchestrator(FakePlanner::returning(Vec::new()));
        orchestrator.import_package(&package_of(3)).unwrap();

        let report = orchestrator.generate_all_report(&style()).await;
        assert_eq!(report.skipped_count(), 3);
        assert!(orchestrator.generator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_only_that_slide() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b #hang", "c"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let report = orchestrator.generate_all_report(&style()).await;
        assert_eq!(report.done_count(), 2);
        match &report.outcomes[1] {
            (2, SlideOutcome::Failed { reason }) => assert!(reason.contains("timed out")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_replan_discards_in_flight_result() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a #slow", "b", "c"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let style = style();
        let (report, replanned) = tokio::join!(orchestrator.generate_all_report(&style), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            orchestrator.plan("other brief", &style, &[], 3).await.unwrap()
        });

        assert!(report.interrupted);
        assert!(report.outcomes.is_empty());
        // The new deck never saw the stale image
        assert_eq!(orchestrator.snapshot(), replanned);
        assert_eq!(replanned.count(SlideState::Pending), 3);
        assert_eq!(orchestrator.generator.calls(), ["a #slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_stream_reverts_slide() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a #hang", "b", "c"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let style = style();
        {
            let mut events = Box::pin(orchestrator.generate_all(&style));
            assert!(matches!(events.next().await, Some(BatchEvent::Started { position: 1, .. })));
            assert_eq!(
                orchestrator.snapshot().slide(1).unwrap().state(),
                SlideState::Generating
            );
            let pending = tokio::time::timeout(Duration::from_secs(1), events.next()).await;
            assert!(pending.is_err());
        }

        assert_eq!(orchestrator.snapshot().slide(1).unwrap().state(), SlideState::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_call_begins_on_the_poll_after_started() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a #slow", "b"])));
        orchestrator.plan("brief", &style(), &[], 2).await.unwrap();

        let style = style();
        let mut events = Box::pin(orchestrator.generate_all(&style));
        assert!(matches!(events.next().await, Some(BatchEvent::Started { position: 1, .. })));
        assert_eq!(orchestrator.snapshot().slide(1).unwrap().state(), SlideState::Generating);
        assert!(orchestrator.generator.calls().is_empty());

        let pending = tokio::time::timeout(Duration::from_secs(1), events.next()).await;
        assert!(pending.is_err());
        assert_eq!(orchestrator.generator.calls(), ["a #slow"]);

        assert!(matches!(
            events.next().await,
            Some(BatchEvent::Finished {
                position: 1,
                outcome: SlideOutcome::Done,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_runs_alongside_batch_on_other_slide() {
        let orchestrator = orchestrator(FakePlanner::returning(specs(&["a", "b #slow", "c"])));
        orchestrator.plan("brief", &style(), &[], 3).await.unwrap();

        let style = style();
        let (report, edited) = tokio::join!(orchestrator.generate_all_report(&style), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let busy = orchestrator.edit_slide(2, "warmer").await;
            assert!(matches!(busy, Err(Error::SlideBusy(2))));
            orchestrator.edit_slide(1, "warmer").await
        });

        assert_eq!(report.done_count(), 3);
        let edited = edited.unwrap();
        assert_eq!(edited.slide(1).unwrap().state(), SlideState::Done);
        assert!(orchestrator
            .snapshot()
            .slide(1)
            .unwrap()
            .image()
            .unwrap()
            .as_slice()
            .ends_with(b"awarmer"));
    }
}
