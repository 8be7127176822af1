//! Office Open XML (OOXML) package reading.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): ZIP container access, part names and relationships
//! 2. **Format Layer** (`xlsx`): workbook manifest, shared strings and worksheet rows
pub mod error;
pub mod opc;
pub mod xlsx;

// Re-export commonly used types from OPC layer
pub use opc::PackURI;

// Re-export error types
pub use error::{OoxmlError, Result};
