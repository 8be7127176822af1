//! Error types for a spreadsheet to i18n JSON conversion.

use thiserror::Error;

use crate::ooxml::error::OoxmlError;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the spreadsheet failed
    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    /// No header cell carries the key column label
    #[error("Key column '{label}' not found in headers: [{}]", headers.join(", "))]
    KeyColumnNotFound { label: String, headers: Vec<String> },

    /// The sheet ends before the requested header row
    #[error("Header row {0} not found: the sheet has no such row")]
    HeaderRowNotFound(u32),

    /// The sheet has no row to read a header from
    #[error("Sheet '{0}' has no rows")]
    EmptySheet(String),

    /// Row range options that cannot be satisfied
    #[error("Invalid row range: {0}")]
    InvalidRange(String),

    /// Writing the output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::ooxml::opc::error::OpcError> for Error {
    fn from(err: crate::ooxml::opc::error::OpcError) -> Self {
        Error::Ooxml(OoxmlError::Opc(err))
    }
}
