use std::time::Duration;
use thiserror::Error;

/// Failure of a planner or image generator call.
///
/// The variants exist for diagnostics; the orchestrator treats them all as a
/// failure of the slide (or plan) being worked on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The backend rejected the request (bad prompt, safety filter, bad asset)
    #[error("request rejected: {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::RateLimited(_) => "rate_limited",
            GenerationError::Validation(_) => "validation",
            GenerationError::Transport(_) => "transport",
            GenerationError::Timeout(_) => "timeout",
            GenerationError::Other(_) => "other",
        }
    }
}
