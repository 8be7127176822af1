/// Error types for OOXML operations.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// OPC package error
    #[error(transparent)]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// XML parsing error
    #[error("XML error in {part}: {message}")]
    Xml { part: String, message: String },

    /// The workbook declares no sheets
    #[error("No sheets found in workbook")]
    NoSheets,

    /// A requested sheet name is not declared by the workbook
    #[error("Sheet '{name}' not found. Available: {}", available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    /// A sheet's relationship id has no entry in the workbook relationships
    #[error("Could not find sheet part for '{sheet}' (relationship {r_id})")]
    RelationshipNotFound { sheet: String, r_id: String },

    /// A cell refers to a shared string that does not exist
    #[error("Cell {cell} refers to shared string {index}, but the table holds {len} strings")]
    CorruptReference { cell: String, index: usize, len: usize },

    /// A cell or row address that cannot be parsed
    #[error("Invalid cell reference: {0}")]
    InvalidCellReference(String),
}

impl OoxmlError {
    /// Build an XML error tagged with the part it came from.
    pub fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        OoxmlError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}
