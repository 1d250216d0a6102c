/// Error types for PresentationML assembly.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// XML generation or parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<std::fmt::Error> for OoxmlError {
    fn from(err: std::fmt::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}
