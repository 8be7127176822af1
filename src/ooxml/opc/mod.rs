/// Open Packaging Conventions (OPC) implementation.
///
/// This module provides the read-only part of OPC needed to pull
/// SpreadsheetML parts out of an `.xlsx` package:
///
/// - ZIP-based physical packaging
/// - Pack URIs and relative target resolution
/// - Relationship parts (`.rels`)
pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use packuri::PackURI;
pub use phys_pkg::PhysPkgReader;
pub use rel::{Relationship, Relationships};
