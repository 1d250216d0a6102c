//! Common types and utilities shared by the codec and the generation pipeline.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
