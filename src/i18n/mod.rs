//! Translation spreadsheet to i18n JSON conversion.
//!
//! - [`lang`]: header text to language tag normalization
//! - [`columns`]: header row classification into key and language columns
//! - [`document`]: the ordered language → key → text output model
//! - [`convert`]: the row range state machine and the [`Converter`] entry points
//! - [`output`]: atomic JSON writing

pub mod columns;
pub mod convert;
pub mod document;
pub mod lang;
pub mod output;

#[cfg(test)]
pub(crate) mod tests;

pub use columns::{ColumnPlan, HeaderClassifier, LanguageColumn};
pub use convert::{
    Conversion, ConversionReport, ConvertOptions, Converter, DEFAULT_EXCLUDED_COLUMNS, RangeState,
};
pub use document::{LanguageMap, OutputDocument};
pub use lang::{LanguageTag, TagStyle, normalize_header};
pub use output::write_json_atomic;
