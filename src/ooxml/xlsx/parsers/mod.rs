//! XML parsers for the SpreadsheetML parts read during a conversion.

pub mod workbook_parser;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesCData, BytesRef, BytesText};

use crate::ooxml::error::{OoxmlError, Result};

/// Append the text of a text event to `out`.
pub(crate) fn push_text(out: &mut String, text: &BytesText<'_>, part: &str) -> Result<()> {
    let decoded = text.decode().map_err(|e| OoxmlError::xml(part, e))?;
    out.push_str(&decoded);
    Ok(())
}

/// Append the text of a CDATA section to `out`.
pub(crate) fn push_cdata(out: &mut String, cdata: &BytesCData<'_>, part: &str) -> Result<()> {
    let decoded = cdata.decode().map_err(|e| OoxmlError::xml(part, e))?;
    out.push_str(&decoded);
    Ok(())
}

/// Append the character a `&...;` reference stands for.
///
/// Unknown named entities are kept verbatim.
pub(crate) fn push_entity(out: &mut String, entity: &BytesRef<'_>, part: &str) -> Result<()> {
    if let Some(ch) = entity
        .resolve_char_ref()
        .map_err(|e| OoxmlError::xml(part, e))?
    {
        out.push(ch);
        return Ok(());
    }

    let name = entity.decode().map_err(|e| OoxmlError::xml(part, e))?;
    match resolve_predefined_entity(&name) {
        Some(resolved) => out.push_str(resolved),
        None => {
            out.push('&');
            out.push_str(&name);
            out.push(';');
        },
    }
    Ok(())
}
