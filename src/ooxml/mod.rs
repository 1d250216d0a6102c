//! Office Open XML (OOXML) subset for presentation packages.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, part names, relationships)
//! 2. **PresentationML** (`pptx`): slide image import and picture-deck export
pub mod error;
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::PackURI;

// Re-export error types
pub use error::{OoxmlError, Result};
