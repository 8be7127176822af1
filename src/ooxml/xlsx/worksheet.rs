//! Streaming row reader for Excel worksheet parts.
//!
//! [`RowReader`] walks the `<sheetData>` of a worksheet with quick-xml and yields one
//! [`Row`] at a time. It never materializes the whole sheet: the caller decides how
//! far to drive it, and once consumed it cannot be restarted without opening the
//! part again.
//!
//! Cells are addressed by their `r` attribute ("C7"), so a column keeps its index
//! even when cells before it are not declared. A cell without a value node is
//! absent from its row rather than present with an empty value.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::cell::{self, CellKind};
use super::parsers::{push_cdata, push_entity, push_text};
use super::shared_strings::{RunText, SharedStrings};
use crate::ooxml::error::{OoxmlError, Result};

/// One worksheet row: its 1-based number and its present cells.
///
/// Cells are `(column, value)` pairs with strictly increasing 1-based columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    number: u32,
    cells: SmallVec<[(u32, String); 16]>,
}

impl Row {
    /// Create an empty row.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            cells: SmallVec::new(),
        }
    }

    /// The 1-based row number.
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Value of the cell in `column`, if the cell is present.
    pub fn get(&self, column: u32) -> Option<&str> {
        self.cells
            .binary_search_by_key(&column, |(col, _)| *col)
            .ok()
            .map(|idx| self.cells[idx].1.as_str())
    }

    /// Present cells, in column order.
    pub fn cells(&self) -> &[(u32, String)] {
        &self.cells
    }

    /// Number of present cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no present cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Append a cell; cells at or left of the last column are dropped.
    ///
    /// Returns whether the cell was kept.
    pub fn push(&mut self, column: u32, value: String) -> bool {
        if self.cells.last().is_some_and(|(last, _)| *last >= column) {
            return false;
        }
        self.cells.push((column, value));
        true
    }
}

/// A `<c>` element being read.
#[derive(Debug)]
struct PendingCell {
    column: u32,
    kind: CellKind,
    value: Option<String>,
    in_value: bool,
    inline: Option<RunText>,
}

impl PendingCell {
    fn from_element(
        e: &BytesStart<'_>,
        previous_column: u32,
        part: &str,
    ) -> Result<Self> {
        let mut column = None;
        let mut kind = CellKind::Numeric;

        for attr in e.attributes() {
            let attr = attr.map_err(|err| OoxmlError::xml(part, err))?;
            match attr.key.as_ref() {
                b"r" => {
                    let reference = std::str::from_utf8(&attr.value)
                        .map_err(|err| OoxmlError::xml(part, err))?;
                    column = Some(cell::reference_to_coords(reference)?.0);
                },
                b"t" => kind = CellKind::from_type_attr(Some(attr.value.as_ref())),
                _ => {},
            }
        }

        // Writers may omit `r`; the cell then follows the previous one
        let column = match column {
            Some(column) => column,
            None if previous_column < cell::MAX_COLUMN => previous_column + 1,
            None => {
                return Err(OoxmlError::InvalidCellReference(format!(
                    "cell after column {}",
                    cell::column_to_letters(previous_column)
                )));
            },
        };

        Ok(Self {
            column,
            kind,
            value: None,
            in_value: false,
            inline: None,
        })
    }

    /// Buffer that text events should go to, if any.
    fn text_sink(&mut self) -> Option<&mut String> {
        if self.in_value {
            return self.value.as_mut();
        }
        match self.inline.as_mut() {
            Some(run) if run.collecting() => Some(run.buffer()),
            _ => None,
        }
    }

    /// Resolve the cell to its text; `None` when it carries no value.
    fn resolve(self, row: u32, shared_strings: &SharedStrings, part: &str) -> Result<Option<String>> {
        let PendingCell {
            column,
            kind,
            value,
            inline,
            ..
        } = self;

        let resolved = match kind {
            CellKind::SharedString => match value.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => {
                    let reference = cell::coordinate(column, row);
                    let index = raw.parse::<usize>().map_err(|_| {
                        OoxmlError::xml(
                            part,
                            format!("invalid shared string index '{}' in {}", raw, reference),
                        )
                    })?;
                    Some(shared_strings.resolve(index, &reference)?.to_string())
                },
            },
            CellKind::InlineString => match inline {
                Some(mut run) => Some(run.take()),
                None => value,
            },
            CellKind::Boolean => value
                .filter(|v| !v.trim().is_empty())
                .map(|v| cell::boolean_text(&v)),
            CellKind::Numeric | CellKind::Text => value.filter(|v| !v.is_empty()),
        };

        Ok(resolved)
    }
}

/// Lazy, single-pass iterator over the rows of one worksheet part.
pub struct RowReader<'a, B: BufRead> {
    reader: Reader<B>,
    buf: Vec<u8>,
    shared_strings: &'a SharedStrings,
    part: String,
    last_row: u32,
    last_wanted: Option<u32>,
    done: bool,
}

impl<'a, B: BufRead> RowReader<'a, B> {
    /// Create a row reader over the XML of a worksheet part.
    ///
    /// `part` names the part in error messages.
    pub fn new(source: B, shared_strings: &'a SharedStrings, part: impl Into<String>) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(4096),
            shared_strings,
            part: part.into(),
            last_row: 0,
            last_wanted: None,
            done: false,
        }
    }

    /// Stop at the first row numbered above `last`.
    ///
    /// The row past the bound is recognized from its `<row>` tag alone; none of its
    /// cells are read. `None` reads to the end of the sheet.
    pub fn until(mut self, last: Option<u32>) -> Self {
        self.last_wanted = last;
        self
    }

    fn row_number(e: &BytesStart<'_>, previous: u32, part: &str) -> Result<u32> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| OoxmlError::xml(part, err))?;
            if attr.key.as_ref() == b"r" {
                return match atoi_simd::parse::<u32, false, false>(&attr.value) {
                    Ok(n) if (1..=cell::MAX_ROW).contains(&n) => Ok(n),
                    _ => Err(OoxmlError::InvalidCellReference(
                        String::from_utf8_lossy(&attr.value).into_owned(),
                    )),
                };
            }
        }
        if previous >= cell::MAX_ROW {
            return Err(OoxmlError::InvalidCellReference(format!("row after {previous}")));
        }
        Ok(previous + 1)
    }

    fn past_bound(last_wanted: Option<u32>, number: u32) -> bool {
        last_wanted.is_some_and(|last| number > last)
    }

    /// Read up to the end of the next acceptable row.
    fn next_row(&mut self) -> Result<Option<Row>> {
        let mut row: Option<Row> = None;
        let mut cell: Option<PendingCell> = None;
        let mut last_column = 0u32;

        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| OoxmlError::xml(&self.part, e))?;

            match event {
                Event::Start(ref e) => {
                    let name = e.local_name();
                    match (name.as_ref(), row.is_some()) {
                        (b"row", false) => {
                            let number = Self::row_number(e, self.last_row, &self.part)?;
                            if Self::past_bound(self.last_wanted, number) {
                                return Ok(None);
                            }
                            row = Some(Row::new(number));
                            last_column = 0;
                        },
                        (b"c", true) if cell.is_none() => {
                            cell = Some(PendingCell::from_element(e, last_column, &self.part)?);
                        },
                        (local, true) => {
                            if let Some(pending) = cell.as_mut() {
                                match local {
                                    b"v" => {
                                        pending.value = Some(String::new());
                                        pending.in_value = true;
                                    },
                                    b"is" => pending.inline = Some(RunText::default()),
                                    other => {
                                        if let Some(run) = pending.inline.as_mut() {
                                            run.start(other);
                                        }
                                    },
                                }
                            }
                        },
                        _ => {},
                    }
                },
                Event::Empty(ref e) => {
                    let name = e.local_name();
                    match (name.as_ref(), row.is_some()) {
                        (b"row", false) => {
                            let number = Self::row_number(e, self.last_row, &self.part)?;
                            if Self::past_bound(self.last_wanted, number) {
                                return Ok(None);
                            }
                            if let Some(accepted) =
                                Self::accept(&mut self.last_row, &self.part, Row::new(number))
                            {
                                return Ok(Some(accepted));
                            }
                        },
                        (b"c", true) if cell.is_none() => {
                            // A cell without content is absent; it still advances the column
                            last_column = PendingCell::from_element(e, last_column, &self.part)?.column;
                        },
                        (b"is", true) => {
                            if let Some(pending) = cell.as_mut() {
                                pending.inline = Some(RunText::default());
                            }
                        },
                        _ => {},
                    }
                },
                Event::End(ref e) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"row" => {
                            if let Some(finished) = row.take()
                                && let Some(accepted) =
                                    Self::accept(&mut self.last_row, &self.part, finished)
                            {
                                return Ok(Some(accepted));
                            }
                        },
                        b"c" => {
                            if let (Some(pending), Some(current)) = (cell.take(), row.as_mut()) {
                                let column = pending.column;
                                last_column = column;
                                let value =
                                    pending.resolve(current.number, self.shared_strings, &self.part)?;
                                if let Some(value) = value
                                    && !current.push(column, value)
                                {
                                    debug!(
                                        part = %self.part,
                                        cell = %cell::coordinate(column, current.number),
                                        "dropping out-of-order cell"
                                    );
                                }
                            }
                        },
                        b"v" => {
                            if let Some(pending) = cell.as_mut() {
                                pending.in_value = false;
                            }
                        },
                        b"sheetData" => return Ok(None),
                        other => {
                            if let Some(run) = cell.as_mut().and_then(|p| p.inline.as_mut()) {
                                run.end(other);
                            }
                        },
                    }
                },
                Event::Text(ref t) => {
                    if let Some(sink) = cell.as_mut().and_then(PendingCell::text_sink) {
                        push_text(sink, t, &self.part)?;
                    }
                },
                Event::GeneralRef(ref r) => {
                    if let Some(sink) = cell.as_mut().and_then(PendingCell::text_sink) {
                        push_entity(sink, r, &self.part)?;
                    }
                },
                Event::CData(ref c) => {
                    if let Some(sink) = cell.as_mut().and_then(PendingCell::text_sink) {
                        push_cdata(sink, c, &self.part)?;
                    }
                },
                Event::Eof => return Ok(None),
                _ => {},
            }
        }
    }

    /// Enforce ascending row numbers.
    fn accept(last_row: &mut u32, part: &str, row: Row) -> Option<Row> {
        if row.number <= *last_row {
            warn!(
                part,
                row = row.number,
                previous = *last_row,
                "skipping row that is not in ascending order"
            );
            return None;
        }
        *last_row = row.number;
        Some(row)
    }
}

impl<B: BufRead> Iterator for RowReader<'_, B> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

impl<B: BufRead> std::iter::FusedIterator for RowReader<'_, B> {}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = "xl/worksheets/sheet1.xml";

    fn sheet(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1:D4"/>
  <sheetData>{}</sheetData>
  <mergeCells count="1"><mergeCell ref="B3:C3"/></mergeCells>
</worksheet>"#,
            rows
        )
    }

    fn read_all(xml: &str, sst: &SharedStrings) -> Result<Vec<Row>> {
        RowReader::new(xml.as_bytes(), sst, PART).collect()
    }

    fn cells(row: &Row) -> Vec<(u32, &str)> {
        row.cells().iter().map(|(c, v)| (*c, v.as_str())).collect()
    }

    #[test]
    fn test_cell_kinds() {
        let sst = SharedStrings::from(vec!["key".to_string(), "你好".to_string()]);
        let xml = sheet(
            r#"<row r="1">
                <c r="A1" t="s"><v>0</v></c>
                <c r="B1" t="inlineStr"><is><r><t>in</t></r><r><t>line</t></r></is></c>
                <c r="C1"><v>42.5</v></c>
                <c r="D1" t="b"><v>1</v></c>
                <c r="E1" t="str"><f>A1&amp;"x"</f><v>keyx</v></c>
                <c r="F1" t="e"><v>#N/A</v></c>
                <c r="G1" t="s"><v>1</v></c>
            </row>"#,
        );
        let rows = read_all(&xml, &sst).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            cells(&rows[0]),
            vec![
                (1, "key"),
                (2, "inline"),
                (3, "42.5"),
                (4, "TRUE"),
                (5, "keyx"),
                (6, "#N/A"),
                (7, "你好"),
            ]
        );
    }

    #[test]
    fn test_sparse_cells_keep_their_columns() {
        let sst = SharedStrings::new();
        let xml = sheet(
            r#"<row r="2"><c r="A2" t="inlineStr"><is><t>greeting</t></is></c><c r="D2" t="inlineStr"><is><t>Hola</t></is></c></row>"#,
        );
        let rows = read_all(&xml, &sst).unwrap();

        assert_eq!(rows[0].number(), 2);
        assert_eq!(rows[0].get(1), Some("greeting"));
        assert_eq!(rows[0].get(2), None);
        assert_eq!(rows[0].get(3), None);
        assert_eq!(rows[0].get(4), Some("Hola"));
    }

    #[test]
    fn test_cells_without_value_are_absent() {
        let sst = SharedStrings::new();
        let xml = sheet(
            r#"<row r="3"><c r="A3" s="1"/><c r="B3" t="s"></c><c r="C3"><f>SUM(1,2)</f></c><c r="D3"><v>3</v></c></row>"#,
        );
        let rows = read_all(&xml, &sst).unwrap();

        assert_eq!(cells(&rows[0]), vec![(4, "3")]);
    }

    #[test]
    fn test_missing_addresses_follow_previous() {
        let sst = SharedStrings::new();
        let xml = sheet(
            r#"<row><c><v>1</v></c><c><v>2</v></c></row><row><c r="C2"><v>3</v></c><c><v>4</v></c></row>"#,
        );
        let rows = read_all(&xml, &sst).unwrap();

        assert_eq!(rows[0].number(), 1);
        assert_eq!(cells(&rows[0]), vec![(1, "1"), (2, "2")]);
        assert_eq!(rows[1].number(), 2);
        assert_eq!(cells(&rows[1]), vec![(3, "3"), (4, "4")]);
    }

    #[test]
    fn test_gaps_between_rows_and_empty_rows() {
        let sst = SharedStrings::new();
        let xml = sheet(r#"<row r="1"><c r="A1"><v>1</v></c></row><row r="5"/><row r="9" spans="1:1"></row>"#);
        let rows = read_all(&xml, &sst).unwrap();

        let numbers: Vec<u32> = rows.iter().map(Row::number).collect();
        assert_eq!(numbers, vec![1, 5, 9]);
        assert!(rows[1].is_empty());
        assert!(rows[2].is_empty());
    }

    #[test]
    fn test_out_of_order_rows_are_skipped() {
        let sst = SharedStrings::new();
        let xml = sheet(r#"<row r="4"><c r="A4"><v>4</v></c></row><row r="2"><c r="A2"><v>2</v></c></row><row r="6"/>"#);
        let rows = read_all(&xml, &sst).unwrap();

        let numbers: Vec<u32> = rows.iter().map(Row::number).collect();
        assert_eq!(numbers, vec![4, 6]);
    }

    #[test]
    fn test_corrupt_shared_string_reference() {
        let sst = SharedStrings::from(vec!["a".to_string()]);
        let xml = sheet(r#"<row r="7"><c r="C7" t="s"><v>3</v></c></row>"#);

        match read_all(&xml, &sst) {
            Err(OoxmlError::CorruptReference { cell, index, len }) => {
                assert_eq!((cell.as_str(), index, len), ("C7", 3, 1));
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reader_is_lazy_and_fused() {
        let sst = SharedStrings::new();
        // The broken tail is never reached when only the first row is taken
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row><row r="2"><c r="A2" t="s"><v>99</v></c></row>"#;
        let mut reader = RowReader::new(xml.as_bytes(), &sst, PART);

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.number(), 1);
        assert!(matches!(reader.next(), Some(Err(OoxmlError::CorruptReference { .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_until_stops_before_reading_the_next_row() {
        let sst = SharedStrings::new();
        let xml = sheet(
            r#"<row r="1"><c r="A1"><v>1</v></c></row><row r="2"><c r="A2"><v>2</v></c></row><row r="9"><c r="A9" t="s"><v>42</v></c></row>"#,
        );
        let rows: Vec<Row> = RowReader::new(xml.as_bytes(), &sst, PART)
            .until(Some(3))
            .collect::<Result<_>>()
            .unwrap();

        let numbers: Vec<u32> = rows.iter().map(Row::number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_until_includes_the_last_row() {
        let sst = SharedStrings::new();
        let xml = sheet(r#"<row r="1"/><row r="3"><c r="A3"><v>3</v></c></row><row r="4"/>"#);
        let rows: Vec<Row> = RowReader::new(xml.as_bytes(), &sst, PART)
            .until(Some(3))
            .collect::<Result<_>>()
            .unwrap();

        let numbers: Vec<u32> = rows.iter().map(Row::number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_missing_addresses_past_the_sheet_limits() {
        let sst = SharedStrings::new();

        let xml = sheet(r#"<row r="1048576"/><row><c><v>1</v></c></row>"#);
        assert!(matches!(read_all(&xml, &sst), Err(OoxmlError::InvalidCellReference(_))));

        let xml = sheet(r#"<row r="4294967295"/>"#);
        assert!(matches!(read_all(&xml, &sst), Err(OoxmlError::InvalidCellReference(_))));

        let xml = sheet(r#"<row r="1"><c r="XFD1"><v>1</v></c><c><v>2</v></c></row>"#);
        assert!(matches!(read_all(&xml, &sst), Err(OoxmlError::InvalidCellReference(_))));
    }

    #[test]
    fn test_entities_in_values() {
        let sst = SharedStrings::new();
        let xml = sheet(r#"<row r="1"><c r="A1" t="inlineStr"><is><t>a &lt; b &amp; c</t></is></c></row>"#);
        let rows = read_all(&xml, &sst).unwrap();
        assert_eq!(rows[0].get(1), Some("a < b & c"));
    }

    #[test]
    fn test_row_push_rejects_non_increasing_columns() {
        let mut row = Row::new(1);
        assert!(row.push(2, "b".to_string()));
        assert!(!row.push(2, "again".to_string()));
        assert!(!row.push(1, "a".to_string()));
        assert!(row.push(5, "e".to_string()));
        assert_eq!(row.len(), 2);
    }
}
