use super::asset::ReferenceAsset;
use super::error::GenerationError;
use crate::deck::ImageData;
use async_trait::async_trait;
use std::sync::Arc;

/// Image generator trait - produces and edits slide images.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render a slide image from its visual prompt, guided by the style assets.
    async fn generate(
        &self,
        prompt: &str,
        style_assets: &[ReferenceAsset],
    ) -> Result<ImageData, GenerationError>;

    /// Produce a new image from `image` following a natural-language instruction.
    async fn edit(&self, image: &ImageData, instruction: &str) -> Result<ImageData, GenerationError>;
}

#[async_trait]
impl<T: ImageGenerator + ?Sized> ImageGenerator for Arc<T> {
    async fn generate(
        &self,
        prompt: &str,
        style_assets: &[ReferenceAsset],
    ) -> Result<ImageData, GenerationError> {
        (**self).generate(prompt, style_assets).await
    }

    async fn edit(&self, image: &ImageData, instruction: &str) -> Result<ImageData, GenerationError> {
        (**self).edit(image, instruction).await
    }
}
