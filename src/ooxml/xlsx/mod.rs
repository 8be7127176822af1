//! Excel (.xlsx) spreadsheet reading.
//!
//! Only what is needed to stream cell text out of a worksheet is implemented:
//!
//! - [`Workbook`]: the package, its sheet declarations and the shared strings table
//! - [`RowReader`]: a lazy iterator over the rows of one worksheet part
//! - [`SharedStrings`]: the workbook-wide string table cells refer to by index
//!
//! # Example
//!
//! ```rust,no_run
//! use litchi_i18n::ooxml::xlsx::Workbook;
//!
//! let mut workbook = Workbook::open("strings.xlsx")?;
//! let sheet = workbook.resolve(Some("Main"))?;
//! for row in workbook.rows(&sheet)? {
//!     let row = row?;
//!     println!("row {}: {} cells", row.number(), row.len());
//! }
//! # Ok::<(), litchi_i18n::ooxml::OoxmlError>(())
//! ```

pub mod cell;
pub mod parsers;
pub mod shared_strings;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellKind, coordinate, reference_to_coords};
pub use parsers::workbook_parser::SheetEntry;
pub use shared_strings::SharedStrings;
pub use workbook::{SheetLocation, Workbook};
pub use worksheet::{Row, RowReader};
