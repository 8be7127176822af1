/// Constant values related to the Open Packaging Convention.
///
/// This module contains the relationship types and target modes needed to walk from
/// the package root to the workbook, its worksheets and its shared strings.

/// Open XML relationship target modes
pub mod target_mode {
    /// Internal relationship target mode (default)
    pub const INTERNAL: &str = "Internal";

    /// External relationship target mode (e.g., hyperlinks to external URLs)
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs used in OPC packages
pub mod relationship_type {
    // Office document
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

    // SpreadsheetML parts
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

    /// Compare two relationship types by their final path segment.
    ///
    /// Strict Open XML documents use `http://purl.oclc.org/ooxml/...` URIs that
    /// share the final segment with the transitional ones.
    pub fn same_kind(reltype: &str, expected: &str) -> bool {
        match (reltype.rsplit('/').next(), expected.rsplit('/').next()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
