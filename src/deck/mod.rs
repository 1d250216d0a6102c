//! Deck data model.
//!
//! A [`Deck`] is an ordered list of [`Slide`]s unique by position. Decks are
//! plain values: the orchestrator publishes clones of them as snapshots and
//! mutates its own copy only through [`Deck::apply`].

mod image;
mod slide;
mod transition;

pub use image::ImageData;
pub use slide::{Slide, SlideState};
pub use transition::Transition;

use crate::generation::SlideSpec;
use crate::ooxml::pptx::PackageEntry;

/// Ordered slides plus the epoch they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    /// Incremented on every plan, import and reset; results computed for an
    /// older epoch are discarded.
    epoch: u64,
    slides: Vec<Slide>,
}

impl Deck {
    /// An empty deck at epoch 0.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_slides(epoch: u64, slides: Vec<Slide>) -> Self {
        Self { epoch, slides }
    }

    /// Pending slides from planner output, renumbered 1..=n in the order given.
    pub(crate) fn planned(epoch: u64, specs: impl IntoIterator<Item = SlideSpec>) -> Self {
        let slides = specs
            .into_iter()
            .zip(1u32..)
            .map(|(spec, position)| Slide::pending(position, spec.title, spec.visual_prompt))
            .collect();
        Self { epoch, slides }
    }

    /// Done slides from imported package entries, renumbered 1..=n in ordinal order.
    pub(crate) fn imported(epoch: u64, entries: impl IntoIterator<Item = PackageEntry>) -> Self {
        let slides = entries
            .into_iter()
            .zip(1u32..)
            .map(|(entry, position)| Slide::imported(position, ImageData::from(entry)))
            .collect();
        Self { epoch, slides }
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Slides in presentation order.
    #[inline]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, position: u32) -> Option<&Slide> {
        self.slides.iter().find(|slide| slide.position == position)
    }

    pub(crate) fn slide_mut(&mut self, position: u32) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|slide| slide.position == position)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Number of slides currently in `state`.
    pub fn count(&self, state: SlideState) -> usize {
        self.slides.iter().filter(|slide| slide.state == state).count()
    }

    /// Positions in presentation order.
    pub fn positions(&self) -> Vec<u32> {
        self.slides.iter().map(|slide| slide.position).collect()
    }

    /// The image of every slide that has one, in position order.
    pub fn images(&self) -> impl Iterator<Item = (u32, &ImageData)> {
        self.slides
            .iter()
            .filter_map(|slide| slide.image.as_ref().map(|image| (slide.position, image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::ImageFormat;
    use bytes::Bytes;

    #[test]
    fn test_planned_renumbers_in_returned_order() {
        let specs = vec![
            SlideSpec::new(7, "Closing", "sunset"),
            SlideSpec::new(2, "Opening", "sunrise"),
        ];
        let deck = Deck::planned(3, specs);

        assert_eq!(deck.epoch(), 3);
        assert_eq!(deck.positions(), [1, 2]);
        assert_eq!(deck.slide(1).unwrap().title(), "Closing");
        assert_eq!(deck.slide(2).unwrap().visual_prompt(), "sunrise");
        assert_eq!(deck.count(SlideState::Pending), 2);
        assert_eq!(deck.images().count(), 0);
    }

    #[test]
    fn test_imported_slides_are_done() {
        let entries = vec![
            PackageEntry {
                position: 4,
                data: Bytes::from_static(b"a"),
                format: ImageFormat::Png,
            },
            PackageEntry {
                position: 9,
                data: Bytes::from_static(b"b"),
                format: ImageFormat::Jpeg,
            },
        ];
        let deck = Deck::imported(1, entries);

        assert_eq!(deck.positions(), [1, 2]);
        let second = deck.slide(2).unwrap();
        assert_eq!(second.title(), "Slide 2");
        assert_eq!(second.visual_prompt(), "");
        assert_eq!(second.state(), SlideState::Done);
        assert_eq!(second.image().unwrap().mime_type(), "image/jpeg");
        assert!(second.is_editable());
    }
}
