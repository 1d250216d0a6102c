//! Image backend selection.
//!
//! Two interchangeable backends can sit behind [`ImageGenerator`]. The
//! runtime choice is an [`ImageVendor`] flag from configuration or the command
//! line; [`VendorGenerator`] carries the chosen implementation and dispatches
//! to it by matching, so the orchestrator sees a single concrete type.
use super::asset::ReferenceAsset;
use super::error::GenerationError;
use super::image::ImageGenerator;
use crate::deck::ImageData;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which image backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVendor {
    #[default]
    Gemini,
    #[serde(alias = "open_ai", alias = "open-ai")]
    OpenAi,
}

impl ImageVendor {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageVendor::Gemini => "gemini",
            ImageVendor::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ImageVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageVendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "gemini" | "google" => Ok(ImageVendor::Gemini),
            "openai" | "open_ai" | "open-ai" => Ok(ImageVendor::OpenAi),
            other => Err(format!("unknown image vendor: {}", other)),
        }
    }
}

/// An image generator backed by one of the two vendors.
#[derive(Debug, Clone)]
pub enum VendorGenerator<G, O> {
    Gemini(G),
    OpenAi(O),
}

impl<G, O> VendorGenerator<G, O> {
    /// Build the backend selected by `vendor`; only the chosen constructor runs.
    pub fn select(vendor: ImageVendor, gemini: impl FnOnce() -> G, openai: impl FnOnce() -> O) -> Self {
        match vendor {
            ImageVendor::Gemini => VendorGenerator::Gemini(gemini()),
            ImageVendor::OpenAi => VendorGenerator::OpenAi(openai()),
        }
    }

    pub fn vendor(&self) -> ImageVendor {
        match self {
            VendorGenerator::Gemini(_) => ImageVendor::Gemini,
            VendorGenerator::OpenAi(_) => ImageVendor::OpenAi,
        }
    }
}

#[async_trait]
impl<G, O> ImageGenerator for VendorGenerator<G, O>
where
    G: ImageGenerator,
    O: ImageGenerator,
{
    async fn generate(
        &self,
        prompt: &str,
        style_assets: &[ReferenceAsset],
    ) -> Result<ImageData, GenerationError> {
        match self {
            VendorGenerator::Gemini(backend) => backend.generate(prompt, style_assets).await,
            VendorGenerator::OpenAi(backend) => backend.generate(prompt, style_assets).await,
        }
    }

    async fn edit(&self, image: &ImageData, instruction: &str) -> Result<ImageData, GenerationError> {
        match self {
            VendorGenerator::Gemini(backend) => backend.edit(image, instruction).await,
            VendorGenerator::OpenAi(backend) => backend.edit(image, instruction).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::ImageFormat;

    struct Fixed(u8);

    #[async_trait]
    impl ImageGenerator for Fixed {
        async fn generate(
            &self,
            _prompt: &str,
            _style_assets: &[ReferenceAsset],
        ) -> Result<ImageData, GenerationError> {
            Ok(ImageData::new(vec![self.0], ImageFormat::Png))
        }

        async fn edit(&self, _image: &ImageData, _instruction: &str) -> Result<ImageData, GenerationError> {
            Err(GenerationError::Validation(format!("backend {} cannot edit", self.0)))
        }
    }

    #[test]
    fn test_vendor_parsing() {
        assert_eq!("Gemini".parse::<ImageVendor>(), Ok(ImageVendor::Gemini));
        assert_eq!("open-ai".parse::<ImageVendor>(), Ok(ImageVendor::OpenAi));
        assert!("dalle".parse::<ImageVendor>().is_err());
        assert_eq!(ImageVendor::OpenAi.to_string(), "openai");
    }

    #[tokio::test]
    async fn test_dispatch_to_selected_backend() {
        let generator = VendorGenerator::select(ImageVendor::OpenAi, || Fixed(1), || Fixed(2));
        assert_eq!(generator.vendor(), ImageVendor::OpenAi);

        let image = generator.generate("prompt", &[]).await.unwrap();
        assert_eq!(image.as_slice(), [2]);

        let err = generator.edit(&image, "brighter").await.unwrap_err();
        assert_eq!(err, GenerationError::Validation("backend 2 cannot edit".to_string()));
    }
}
