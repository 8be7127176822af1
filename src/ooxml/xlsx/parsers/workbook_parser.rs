//! Parser for Excel workbook.xml files.
//!
//! Only the `<sheets>` declarations are read: they give each sheet's name and the
//! relationship id that leads to its part, in the order the workbook declares them.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::ooxml::error::{OoxmlError, Result};

// Performance: Pre-allocate typical capacity for worksheets
const INITIAL_SHEETS_CAPACITY: usize = 16;

/// One `<sheet>` declaration of the workbook manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Sheet name as shown on its tab
    pub name: String,
    /// Relationship ID pointing at the sheet part (e.g., "rId1")
    pub relationship_id: String,
}

/// Parse workbook.xml content into its sheet declarations, in declaration order.
pub fn parse_workbook_xml(xml: &[u8], part: &str) -> Result<Vec<SheetEntry>> {
    let mut sheets = Vec::with_capacity(INITIAL_SHEETS_CAPACITY);
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sheet"
                    && let Some(entry) = parse_sheet_element(e, part)?
                {
                    sheets.push(entry);
                }
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sheets" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::xml(part, e)),
            _ => {},
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Extract a sheet declaration; declarations without a name or r:id are skipped.
fn parse_sheet_element(e: &BytesStart<'_>, part: &str) -> Result<Option<SheetEntry>> {
    let mut name = None;
    let mut relationship_id = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| OoxmlError::xml(part, err))?;
        let value = || {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|err| OoxmlError::xml(part, err))
        };

        match (attr.key.prefix().is_some(), attr.key.local_name().as_ref()) {
            (false, b"name") => name = Some(value()?),
            (true, b"id") => relationship_id = Some(value()?),
            _ => {},
        }
    }

    Ok(match (name, relationship_id) {
        (Some(name), Some(relationship_id)) => Some(SheetEntry {
            name,
            relationship_id,
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = "xl/workbook.xml";

    #[test]
    fn test_declaration_order_is_kept() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <bookViews><workbookView activeTab="1"/></bookViews>
  <sheets>
    <sheet name="zeta" sheetId="3" r:id="rId3"/>
    <sheet name="alpha" sheetId="1" r:id="rId1" state="hidden"/>
    <sheet name="Tom &amp; Jerry" sheetId="2" r:id="rId2"/>
  </sheets>
  <definedNames><definedName name="x">zeta!$A$1</definedName></definedNames>
</workbook>"#;
        let sheets = parse_workbook_xml(xml.as_bytes(), PART).unwrap();

        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "Tom & Jerry"]);
        assert_eq!(sheets[0].relationship_id, "rId3");
        assert_eq!(sheets[1].relationship_id, "rId1");
    }

    #[test]
    fn test_incomplete_declarations_are_skipped() {
        let xml = r#"<workbook xmlns:r="r"><sheets><sheet name="no-id"/><sheet name="ok" r:id="rId7"/></sheets></workbook>"#;
        let sheets = parse_workbook_xml(xml.as_bytes(), PART).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "ok");
        assert_eq!(sheets[0].relationship_id, "rId7");
    }

    #[test]
    fn test_no_sheets() {
        let sheets = parse_workbook_xml(b"<workbook/>", PART).unwrap();
        assert!(sheets.is_empty());
    }
}
