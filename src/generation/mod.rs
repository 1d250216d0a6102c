//! Generation capabilities.
//!
//! The orchestrator depends only on the [`Planner`] and [`ImageGenerator`]
//! contracts defined here. Concrete backends live outside the crate and are
//! selected at runtime through [`VendorGenerator`].

mod asset;
mod error;
mod image;
mod planner;
mod vendor;

pub use asset::ReferenceAsset;
pub use error::GenerationError;
pub use image::ImageGenerator;
pub use planner::{PlanRequest, Planner, SlideSpec};
pub use vendor::{ImageVendor, VendorGenerator};
