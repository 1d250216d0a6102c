/// Error types for OPC package operations
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    #[error("Not a ZIP archive: {0}")]
    NotAZip(String),

    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Part {part} declares {size} bytes, over the size limit")]
    PartTooLarge { part: String, size: u64 },

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Attribute error: {0}")]
    AttrError(String),
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::AttrError(err.to_string())
    }
}

impl From<quick_xml::Error> for OpcError {
    fn from(err: quick_xml::Error) -> Self {
        OpcError::XmlError(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for OpcError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        OpcError::XmlError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
