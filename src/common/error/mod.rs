//! Unified error types for deckcraft.
//!
//! This module provides a unified error type that encompasses errors from the
//! package codec and the generation pipeline, presenting a consistent API to users.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
