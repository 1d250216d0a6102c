//! Unified error types for deckcraft.
//!
//! Package-level failures (OPC, PresentationML) and orchestration failures
//! (planning, per-slide generation and edits) are presented through a single
//! error type so callers can match on one enum.
use crate::deck::SlideState;
use thiserror::Error;

/// Main error type for deckcraft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The planner call failed or timed out. The previous deck is untouched.
    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    /// Generating the image for one slide failed.
    #[error("Generation failed for slide {position}: {reason}")]
    SlideGenerationFailed { position: u32, reason: String },

    /// Editing the image of one slide failed. The previous image is kept.
    #[error("Edit failed for slide {position}: {reason}")]
    SlideEditFailed { position: u32, reason: String },

    /// The import byte stream is not a readable ZIP archive
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// A valid package yielded no slide images
    #[error("Package contains no recoverable slide images")]
    EmptyImport,

    /// Caller supplied arguments outside the accepted domain
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No slide at the given position in the current deck
    #[error("Slide {0} not found")]
    SlideNotFound(u32),

    /// The slide is not in a state that accepts the requested operation
    #[error("Slide {position} cannot be edited while {state}")]
    SlideNotEditable { position: u32, state: SlideState },

    /// Another generation or edit is already running for the slide
    #[error("Slide {0} is already generating")]
    SlideBusy(u32),

    /// The deck reducer refused a state transition
    #[error("Illegal transition for slide {position}: {from} -> {to}")]
    IllegalTransition {
        position: u32,
        from: SlideState,
        to: SlideState,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for deckcraft operations.
pub type Result<T> = std::result::Result<T, Error>;
