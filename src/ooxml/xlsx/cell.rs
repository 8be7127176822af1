//! Cell addressing and cell kinds for Excel worksheets.
//!
//! Columns and rows are 1-based, the way spreadsheet users count them.

use crate::ooxml::error::{OoxmlError, Result};

/// Highest column Excel can address ("XFD").
pub const MAX_COLUMN: u32 = 16_384;

/// Highest row Excel can address.
pub const MAX_ROW: u32 = 1_048_576;

/// How a cell's stored value has to be interpreted, from its `t` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// `t="s"`: the value is an index into the shared strings table
    SharedString,
    /// `t="inlineStr"`: the text lives in an `<is>` child
    InlineString,
    /// No `t` or `t="n"`: a number, kept as its stored literal
    Numeric,
    /// `t="b"`: `1` or `0`
    Boolean,
    /// `t="str"`, `t="e"` and `t="d"`: formula results, errors and ISO dates stored as text
    Text,
}

impl CellKind {
    /// Interpret the raw value of a cell's `t` attribute.
    pub fn from_type_attr(t: Option<&[u8]>) -> Self {
        match t {
            Some(b"s") => CellKind::SharedString,
            Some(b"inlineStr") => CellKind::InlineString,
            Some(b"b") => CellKind::Boolean,
            Some(b"str") | Some(b"e") | Some(b"d") => CellKind::Text,
            _ => CellKind::Numeric,
        }
    }
}

/// Render a boolean cell the way Excel displays it.
pub fn boolean_text(raw: &str) -> String {
    match raw.trim() {
        "1" => "TRUE".to_string(),
        "0" => "FALSE".to_string(),
        other => other.to_string(),
    }
}

/// Convert column number to Excel column letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        letters.push((col % 26) as u8 + b'A');
        col /= 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Format a 1-based (column, row) pair as an A1-style reference.
pub fn coordinate(col: u32, row: u32) -> String {
    format!("{}{}", column_to_letters(col), row)
}

/// Convert an Excel reference (e.g., "C7") to 1-based (column, row) numbers.
///
/// Absolute markers (`$C$7`) are accepted. The row part may be missing ("C"),
/// in which case only the column is returned.
pub fn reference_to_coords(reference: &str) -> Result<(u32, Option<u32>)> {
    let bytes: Vec<u8> = reference.bytes().filter(|&b| b != b'$').collect();
    let col_end = bytes
        .iter()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(bytes.len());

    if col_end == 0 || col_end > 3 {
        return Err(OoxmlError::InvalidCellReference(reference.to_string()));
    }

    // Convert column letters to number (A=1, B=2, ..., Z=26, AA=27, etc.)
    let mut col_num = 0u32;
    for &byte in &bytes[..col_end] {
        col_num = col_num * 26 + u32::from(byte.to_ascii_uppercase() - b'A' + 1);
    }
    if col_num > MAX_COLUMN {
        return Err(OoxmlError::InvalidCellReference(reference.to_string()));
    }

    let row_part = &bytes[col_end..];
    if row_part.is_empty() {
        return Ok((col_num, None));
    }
    if !row_part.iter().all(u8::is_ascii_digit) {
        return Err(OoxmlError::InvalidCellReference(reference.to_string()));
    }

    let row_num: u32 = atoi_simd::parse::<u32, false, false>(row_part)
        .map_err(|_| OoxmlError::InvalidCellReference(reference.to_string()))?;
    if row_num == 0 {
        return Err(OoxmlError::InvalidCellReference(reference.to_string()));
    }

    Ok((col_num, Some(row_num)))
}
