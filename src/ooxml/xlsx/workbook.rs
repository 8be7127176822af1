//! Excel Workbook access.
//!
//! [`Workbook`] opens an `.xlsx` package, follows its relationships to the workbook
//! part, reads the sheet declarations and the shared strings table, and hands out
//! streaming [`RowReader`]s for individual sheets.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::debug;

use super::parsers::workbook_parser::{self, SheetEntry};
use super::shared_strings::SharedStrings;
use super::worksheet::RowReader;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::{
    DEFAULT_SHARED_STRINGS_URI, DEFAULT_WORKBOOK_URI, PACKAGE_URI, PackURI,
};
use crate::ooxml::opc::{PhysPkgReader, Relationships};

/// A sheet name resolved to the part that holds its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLocation {
    /// Declared sheet name
    pub name: String,
    /// Worksheet part
    pub part: PackURI,
}

/// An opened Excel workbook.
///
/// The package handle is held until the workbook is dropped.
pub struct Workbook<R: Read + Seek = BufReader<File>> {
    package: PhysPkgReader<R>,
    sheets: Vec<SheetEntry>,
    rels: Relationships,
    shared_strings: SharedStrings,
}

impl Workbook<BufReader<File>> {
    /// Open a workbook from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(PhysPkgReader::open(path)?)
    }
}

impl<R: Read + Seek> Workbook<R> {
    /// Open a workbook from any seekable byte source.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::new(PhysPkgReader::from_reader(reader)?)
    }

    /// Load the workbook manifest, its relationships and its shared strings.
    pub fn new(mut package: PhysPkgReader<R>) -> Result<Self> {
        let workbook_uri = Self::locate_workbook(&mut package)?;
        debug!(part = %workbook_uri, "reading workbook manifest");

        let workbook_xml = package.blob_for(&workbook_uri)?;
        let sheets = workbook_parser::parse_workbook_xml(&workbook_xml, workbook_uri.membername())?;
        if sheets.is_empty() {
            return Err(OoxmlError::NoSheets);
        }

        let rels = match package.rels_xml_for(&workbook_uri)? {
            Some(xml) => Relationships::from_xml(&xml, workbook_uri.base_uri())?,
            None => Relationships::default(),
        };

        let shared_strings = Self::load_shared_strings(&mut package, &rels)?;

        Ok(Self {
            package,
            sheets,
            rels,
            shared_strings,
        })
    }

    /// Find the main workbook part through the package relationships.
    fn locate_workbook(package: &mut PhysPkgReader<R>) -> Result<PackURI> {
        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;

        if let Some(xml) = package.rels_xml_for(&package_uri)? {
            let rels = Relationships::from_xml(&xml, package_uri.base_uri())?;
            if let Some(rel) = rels.first_of_type(rt::OFFICE_DOCUMENT) {
                return Ok(rel.target_partname()?);
            }
        }

        Ok(PackURI::new(DEFAULT_WORKBOOK_URI).map_err(OpcError::InvalidPackUri)?)
    }

    /// Load the shared strings table; a workbook without one gets an empty table.
    fn load_shared_strings(
        package: &mut PhysPkgReader<R>,
        rels: &Relationships,
    ) -> Result<SharedStrings> {
        let uri = match rels.first_of_type(rt::SHARED_STRINGS) {
            Some(rel) => rel.target_partname()?,
            None => PackURI::new(DEFAULT_SHARED_STRINGS_URI).map_err(OpcError::InvalidPackUri)?,
        };

        match package.blob_if_present(&uri)? {
            Some(xml) => SharedStrings::parse(&xml, uri.membername()),
            None => {
                debug!(part = %uri, "workbook has no shared strings part");
                Ok(SharedStrings::new())
            },
        }
    }

    /// Sheet declarations, in manifest order.
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// Sheet names, in manifest order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// The shared strings table.
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Resolve a sheet name to its part.
    ///
    /// With a name, the match is exact and case-sensitive. Without one, the first
    /// sheet in manifest order is used.
    pub fn resolve(&self, name: Option<&str>) -> Result<SheetLocation> {
        let entry = match name {
            Some(name) => self
                .sheets
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| OoxmlError::SheetNotFound {
                    name: name.to_string(),
                    available: self.sheets.iter().map(|s| s.name.clone()).collect(),
                })?,
            None => self.sheets.first().ok_or(OoxmlError::NoSheets)?,
        };

        let rel = self
            .rels
            .get(&entry.relationship_id)
            .filter(|rel| !rel.is_external())
            .ok_or_else(|| OoxmlError::RelationshipNotFound {
                sheet: entry.name.clone(),
                r_id: entry.relationship_id.clone(),
            })?;

        Ok(SheetLocation {
            name: entry.name.clone(),
            part: rel.target_partname()?,
        })
    }

    /// Start streaming the rows of a resolved sheet.
    pub fn rows(&mut self, sheet: &SheetLocation) -> Result<RowReader<'_, impl std::io::BufRead>> {
        let Self {
            package,
            shared_strings,
            ..
        } = self;

        let part = package.open_part(sheet.part.membername())?;
        Ok(RowReader::new(
            BufReader::new(part),
            shared_strings,
            sheet.part.membername(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::tests::fixtures::WorkbookBuilder;
    use std::io::Cursor;

    fn open(data: Vec<u8>) -> Workbook<Cursor<Vec<u8>>> {
        Workbook::from_reader(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_first_declared_sheet_is_default() {
        let data = WorkbookBuilder::new()
            .sheet("second-stored-first", &[&["x"]])
            .sheet("other", &[&["y"]])
            .store_sheets_reversed()
            .build();
        let workbook = open(data);

        assert_eq!(workbook.sheet_names(), vec!["second-stored-first", "other"]);
        let location = workbook.resolve(None).unwrap();
        assert_eq!(location.name, "second-stored-first");
        assert_eq!(location.part.as_str(), "/xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_resolve_by_exact_name() {
        let data = WorkbookBuilder::new()
            .sheet("Main", &[&["x"]])
            .sheet("buff-web", &[&["y"]])
            .build();
        let workbook = open(data);

        let location = workbook.resolve(Some("buff-web")).unwrap();
        assert_eq!(location.part.as_str(), "/xl/worksheets/sheet2.xml");

        match workbook.resolve(Some("main")) {
            Err(OoxmlError::SheetNotFound { name, available }) => {
                assert_eq!(name, "main");
                assert_eq!(available, vec!["Main", "buff-web"]);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_sheet_not_found_message_lists_sheets() {
        let data = WorkbookBuilder::new().sheet("A", &[&["x"]]).sheet("B", &[&["y"]]).build();
        let err = open(data).resolve(Some("C")).unwrap_err();
        assert_eq!(err.to_string(), "Sheet 'C' not found. Available: A, B");
    }

    #[test]
    fn test_shared_strings_are_loaded() {
        let data = WorkbookBuilder::new().sheet("S", &[&["key", "en"], &["hi", "Hi"]]).build();
        let mut workbook = open(data);
        assert_eq!(workbook.shared_strings().len(), 4);

        let location = workbook.resolve(None).unwrap();
        let rows: Vec<_> = workbook.rows(&location).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(2), Some("Hi"));
    }

    #[test]
    fn test_workbook_without_shared_strings() {
        let data = WorkbookBuilder::new()
            .inline_strings()
            .sheet("S", &[&["key", "en"], &["hi", "Hi"]])
            .build();
        let mut workbook = open(data);
        assert!(workbook.shared_strings().is_empty());

        let location = workbook.resolve(None).unwrap();
        let rows: Vec<_> = workbook.rows(&location).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows[1].get(1), Some("hi"));
    }

    #[test]
    fn test_missing_manifest() {
        let data = WorkbookBuilder::raw(&[("xl/styles.xml", "<styleSheet/>")]);
        let result = Workbook::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(OoxmlError::Opc(OpcError::PartNotFound(_)))));
    }

    #[test]
    fn test_missing_sheet_relationship() {
        let data = WorkbookBuilder::new().sheet("S", &[&["x"]]).without_workbook_rels().build();
        let workbook = open(data);
        assert!(matches!(
            workbook.resolve(None),
            Err(OoxmlError::RelationshipNotFound { .. })
        ));
    }
}
