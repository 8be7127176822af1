//! Litchi i18n - convert translation spreadsheets into i18n JSON resources
//!
//! A sheet holds one column of translation keys and one column per language.
//! The converter reads the sheet straight from the `.xlsx` package, works out
//! which header names which language, and writes a JSON object keyed by
//! language tag, each value mapping translation keys to text.
//!
//! # Features
//!
//! - **Streaming worksheet reader**: rows are parsed lazily and reading stops at the
//!   end of the requested range
//! - **Header detection**: free-form labels such as `英语/en`, `zh_rCN` or `Japanese`
//!   are mapped to canonical tags (`en`, `zh-CN`, `ja`)
//! - **Atomic output**: the JSON is only put in place once the whole conversion succeeded
//!
//! # Example
//!
//! ```no_run
//! use litchi_i18n::{ConvertOptions, Converter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new(ConvertOptions {
//!     start: 2,
//!     end: Some(120),
//!     ..ConvertOptions::default()
//! })?;
//!
//! let conversion = converter.convert_path("strings.xlsx")?;
//! for (tag, translations) in conversion.document.iter() {
//!     println!("{}: {} strings", tag, translations.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level sheet access
//!
//! ```no_run
//! use litchi_i18n::ooxml::xlsx::Workbook;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = Workbook::open("strings.xlsx")?;
//! println!("Sheets: {:?}", workbook.sheet_names());
//!
//! let sheet = workbook.resolve(None)?;
//! for row in workbook.rows(&sheet)? {
//!     let row = row?;
//!     println!("{}: {:?}", row.number(), row.get(1));
//! }
//! # Ok(())
//! # }
//! ```

/// Error type for a conversion run
pub mod error;

/// Translation spreadsheet conversion
///
/// Language detection, header classification, the output document model and
/// the converter itself.
pub mod i18n;

/// OOXML (Office Open XML) package reader
///
/// This module provides just enough of the `.xlsx` format to stream cell text
/// out of a worksheet.
pub mod ooxml;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use i18n::{
    Conversion, ConversionReport, ConvertOptions, Converter, LanguageTag, OutputDocument, TagStyle,
};
