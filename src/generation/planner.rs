use super::asset::ReferenceAsset;
use super::error::GenerationError;
use async_trait::async_trait;

/// Input to one planning call.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// What the deck is about
    pub brief: String,
    pub style_assets: Vec<ReferenceAsset>,
    pub content_assets: Vec<ReferenceAsset>,
    /// Requested number of slides; the planner may return a different count
    pub slide_count: u32,
}

/// One slide as proposed by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSpec {
    pub position: u32,
    pub title: String,
    /// Prompt for the image generator; opaque to the orchestrator
    pub visual_prompt: String,
}

impl SlideSpec {
    pub fn new(position: u32, title: impl Into<String>, visual_prompt: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            visual_prompt: visual_prompt.into(),
        }
    }
}

/// Planner trait - turns a brief into an ordered list of slide specs.
///
/// Implementations wrap a language model backend; prompt construction is
/// entirely theirs.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Propose slides for the request, in presentation order.
    async fn plan(&self, request: &PlanRequest) -> Result<Vec<SlideSpec>, GenerationError>;
}

#[async_trait]
impl<T: Planner + ?Sized> Planner for std::sync::Arc<T> {
    async fn plan(&self, request: &PlanRequest) -> Result<Vec<SlideSpec>, GenerationError> {
        (**self).plan(request).await
    }
}
