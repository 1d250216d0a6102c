/// Open Packaging Conventions (OPC) subset.
///
/// Provides the pieces of the OPC specification needed to move single-image
/// slides in and out of a presentation package:
///
/// - Part names (`PackURI`) and relative reference resolution
/// - Relationship parsing (document order) and serialization
/// - Content type mapping for writing
/// - ZIP-based physical packaging held in memory

pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use packuri::PackURI;
pub use pkgwriter::{PackageWriter, PartBlob};
pub use rel::{Relationship, Relationships};
