//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        Error::from_opc_error(err)
    }
}

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Opc(e) => Error::from_opc_error(e),
            OoxmlError::Xml(s) => Error::XmlError(s),
            OoxmlError::InvalidFormat(s) => Error::InvalidRequest(s),
        }
    }
}

impl Error {
    pub(crate) fn from_opc_error(err: OpcError) -> Self {
        match err {
            OpcError::IoError(e) => Error::Io(e),
            // Failing to open the archive is the only fatal import condition
            OpcError::NotAZip(e) => Error::InvalidPackage(e),
            OpcError::ZipError(e) => Error::ZipError(e.to_string()),
            OpcError::XmlError(s) => Error::XmlError(s),
            _ => Error::Other(err.to_string()),
        }
    }
}
