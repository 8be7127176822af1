//! Errors raised while reading the ZIP container of an OOXML package.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// The input path does not exist
    #[error("Input file not found: {0}")]
    PackageNotFound(String),

    /// The input is not a ZIP container
    #[error("Not a valid .xlsx package (expected a ZIP archive): {0}")]
    NotAnArchive(String),

    #[error("Invalid part name: {0}")]
    InvalidPackUri(String),

    /// A part the package needs is missing from the archive
    #[error("Package part '{0}' is missing")]
    PartNotFound(String),

    #[error("Malformed relationship part: {0}")]
    Rels(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::Rels(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
