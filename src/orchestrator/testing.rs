//! In-memory planner and image generator used by the orchestrator tests.
//!
//! Generator behaviour is keyed off the prompt or instruction text:
//! `#fail` returns an error, `#hang` never completes, `#slow` takes ten seconds.
use super::DeckOrchestrator;
use crate::config::DeckConfig;
use crate::deck::ImageData;
use crate::generation::{
    GenerationError, ImageGenerator, PlanRequest, Planner, ReferenceAsset, SlideSpec,
};
use crate::ooxml::pptx::{ImageFormat, SlideImage, SlideSize, write_package};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub(crate) enum PlanBehavior {
    Return(Vec<SlideSpec>),
    Fail(String),
    Hang,
}

pub(crate) struct FakePlanner {
    behavior: PlanBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<PlanRequest>>,
}

impl FakePlanner {
    fn with(behavior: PlanBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn returning(specs: Vec<SlideSpec>) -> Self {
        Self::with(PlanBehavior::Return(specs))
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self::with(PlanBehavior::Fail(reason.to_string()))
    }

    pub(crate) fn hanging() -> Self {
        Self::with(PlanBehavior::Hang)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<PlanRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Planner for FakePlanner {
    async fn plan(&self, request: &PlanRequest) -> Result<Vec<SlideSpec>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.behavior {
            PlanBehavior::Return(specs) => Ok(specs.clone()),
            PlanBehavior::Fail(reason) => Err(GenerationError::Transport(reason.clone())),
            PlanBehavior::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeGenerator {
    calls: Mutex<Vec<String>>,
}

impl FakeGenerator {
    /// Prompts and instructions seen so far, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn behave(&self, text: &str) -> Result<(), GenerationError> {
        self.calls.lock().unwrap().push(text.to_string());
        if text.contains("#hang") {
            std::future::pending::<()>().await;
        }
        if text.contains("#slow") {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        if text.contains("#fail") {
            return Err(GenerationError::Transport(format!("{} went wrong", text)));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _style_assets: &[ReferenceAsset],
    ) -> Result<ImageData, GenerationError> {
        self.behave(prompt).await?;
        Ok(png(prompt.as_bytes()))
    }

    async fn edit(&self, image: &ImageData, instruction: &str) -> Result<ImageData, GenerationError> {
        self.behave(instruction).await?;
        let mut data = image.as_slice().to_vec();
        data.extend_from_slice(instruction.as_bytes());
        Ok(ImageData::new(data, image.format()))
    }
}

/// PNG-signed bytes followed by `tail`.
pub(crate) fn png(tail: &[u8]) -> ImageData {
    let mut data = PNG_MAGIC.to_vec();
    data.extend_from_slice(tail);
    ImageData::new(data, ImageFormat::Png)
}

pub(crate) fn orchestrator(planner: FakePlanner) -> DeckOrchestrator<FakePlanner, FakeGenerator> {
    DeckOrchestrator::new(planner, FakeGenerator::default(), DeckConfig::default())
}

/// Slide specs whose titles and prompts are both the given strings.
pub(crate) fn specs(prompts: &[&str]) -> Vec<SlideSpec> {
    prompts
        .iter()
        .zip(1u32..)
        .map(|(prompt, position)| SlideSpec::new(position, *prompt, *prompt))
        .collect()
}

pub(crate) fn style() -> Vec<ReferenceAsset> {
    vec![ReferenceAsset::new("style.png", "image/png", PNG_MAGIC.to_vec())]
}

/// A package of `count` slides with distinct PNG images.
pub(crate) fn package_of(count: u8) -> Vec<u8> {
    let images: Vec<ImageData> = (1..=count).map(|n| png(&[n])).collect();
    write_package(
        images.iter().map(|image| Some(SlideImage::new(image.as_slice(), image.format()))),
        SlideSize::default(),
    )
    .unwrap()
}
