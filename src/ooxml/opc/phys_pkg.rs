//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! This module handles the low-level reading of OPC packages from ZIP archives.
//! The archive handle is owned by [`PhysPkgReader`] and released when the reader
//! is dropped, so every exit path of a conversion closes the input file.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// Physical package reader that provides access to parts in a ZIP-based OPC package.
///
/// Parts are decompressed on demand; nothing is cached between reads.
pub struct PhysPkgReader<R: Read + Seek = BufReader<File>> {
    /// The underlying ZIP archive
    archive: ZipArchive<R>,
}

impl PhysPkgReader<BufReader<File>> {
    /// Open an OPC package from a file path.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, cannot be opened,
    /// or isn't a valid ZIP file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> PhysPkgReader<R> {
    /// Create a reader over any seekable byte source.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| OpcError::NotAnArchive(e.to_string()))?;
        Ok(Self { archive })
    }

    /// Get the binary content for a part by its PackURI.
    pub fn blob_for(&mut self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        self.read_part(pack_uri.membername())
    }

    /// Get the binary content of a ZIP member by its name (no leading slash).
    pub fn read_part(&mut self, membername: &str) -> Result<Vec<u8>> {
        let mut blob = Vec::new();
        self.open_part(membername)?.read_to_end(&mut blob)?;
        Ok(blob)
    }

    /// Open a ZIP member for streaming decompression.
    ///
    /// The returned reader borrows the archive until it is dropped.
    pub fn open_part(&mut self, membername: &str) -> Result<impl Read + '_> {
        match self.archive.by_name(membername) {
            Ok(file) => Ok(file),
            Err(ZipError::FileNotFound) => Err(OpcError::PartNotFound(membername.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the content of a part, or `None` when the package has no such part.
    pub fn blob_if_present(&mut self, pack_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        match self.blob_for(pack_uri) {
            Ok(blob) => Ok(Some(blob)),
            Err(OpcError::PartNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get the relationships XML for a specific source URI.
    ///
    /// Relationships files are stored in _rels directories and have a .rels extension.
    /// Returns None if the source has no relationships file.
    pub fn rels_xml_for(&mut self, source_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        self.blob_if_present(&rels_uri)
    }

    /// List all member names in the package, in central directory order.
    pub fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_round_trip() {
        let data = archive(&[("test.txt", b"Hello, World!")]);

        let mut reader = PhysPkgReader::from_reader(Cursor::new(data)).unwrap();
        let pack_uri = PackURI::new("/test.txt").unwrap();
        assert_eq!(reader.blob_for(&pack_uri).unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_multiple_parts() {
        let data = archive(&[
            ("[Content_Types].xml", b"<Types/>"),
            ("_rels/.rels", b"<Relationships/>"),
            ("xl/workbook.xml", b"<workbook/>"),
        ]);
        let mut reader = PhysPkgReader::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(
            reader.member_names(),
            vec!["[Content_Types].xml", "_rels/.rels", "xl/workbook.xml"]
        );
        let workbook = PackURI::new("/xl/workbook.xml").unwrap();
        assert_eq!(reader.blob_for(&workbook).unwrap(), b"<workbook/>");

        let rels = reader.rels_xml_for(&PackURI::new("/").unwrap()).unwrap();
        assert_eq!(rels.as_deref(), Some(&b"<Relationships/>"[..]));
        assert!(reader.rels_xml_for(&workbook).unwrap().is_none());
    }

    #[test]
    fn test_missing_part() {
        let data = archive(&[("a.xml", b"<a/>")]);
        let mut reader = PhysPkgReader::from_reader(Cursor::new(data)).unwrap();

        match reader.read_part("b.xml") {
            Err(OpcError::PartNotFound(name)) => assert_eq!(name, "b.xml"),
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_not_an_archive() {
        let result = PhysPkgReader::from_reader(Cursor::new(b"key,en\nhello,Hello\n".to_vec()));
        assert!(matches!(result, Err(OpcError::NotAnArchive(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = PhysPkgReader::open("/definitely/not/here.xlsx");
        assert!(matches!(result, Err(OpcError::PackageNotFound(_))));
    }
}
