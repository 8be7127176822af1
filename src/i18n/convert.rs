//! Spreadsheet to i18n document conversion.
//!
//! [`Converter`] drives a sheet's [`RowReader`](crate::ooxml::xlsx::RowReader) through
//! three states. Rows before `start` are skipped, rows in `[start, end]` are
//! converted, and after `end` the reader is dropped without reading further.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};

use super::columns::{ColumnPlan, HeaderClassifier, LanguageColumn};
use super::document::OutputDocument;
use super::lang::{LanguageTag, TagStyle};
use super::output::write_json_atomic;
use crate::error::{Error, Result};
use crate::ooxml::xlsx::{Row, Workbook};

/// Header labels that never name a language column unless overridden.
pub const DEFAULT_EXCLUDED_COLUMNS: [&str; 3] = ["特殊说明", "is_android", "location"];

/// Options for one conversion. All row numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Sheet to convert; the first declared sheet when `None`
    pub sheet: Option<String>,
    /// First data row
    pub start: u32,
    /// Last data row, inclusive; the end of the sheet when `None`
    pub end: Option<u32>,
    /// Row holding the column headers; the first row of the sheet when `None`
    pub header_row: Option<u32>,
    /// Header label of the key column
    pub key_col: String,
    /// Header label of the default-language column
    pub default_col: String,
    /// Tag the default-language column is written under
    pub default_lang: String,
    /// How detected language codes are written
    pub tag_style: TagStyle,
    /// Header labels that are never language columns
    pub exclude_cols: Vec<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            start: 2,
            end: None,
            header_row: None,
            key_col: "key".to_string(),
            default_col: "default".to_string(),
            default_lang: "en".to_string(),
            tag_style: TagStyle::Abbreviated,
            exclude_cols: DEFAULT_EXCLUDED_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ConvertOptions {
    /// Check the row range.
    ///
    /// The header is read from the same single pass as the data, so an explicit
    /// header row must come before `start`. An implicit one is checked once the
    /// sheet's first row is known.
    pub fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(Error::InvalidRange("start row must be at least 1".to_string()));
        }
        if let Some(end) = self.end
            && end < self.start
        {
            return Err(Error::InvalidRange(format!(
                "end row {end} is before start row {}",
                self.start
            )));
        }
        match self.header_row {
            Some(0) => Err(Error::InvalidRange("header row must be at least 1".to_string())),
            Some(header) if header >= self.start => Err(Error::InvalidRange(format!(
                "header row {header} must come before start row {}",
                self.start
            ))),
            _ => Ok(()),
        }
    }

    fn classifier(&self) -> HeaderClassifier {
        HeaderClassifier::new(
            self.key_col.as_str(),
            self.default_col.as_str(),
            LanguageTag::new(self.default_lang.trim()),
            self.exclude_cols.iter().cloned(),
            self.tag_style,
        )
    }
}

/// Where a row number falls relative to the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeState {
    BeforeStart,
    InRange,
    Done,
}

impl RangeState {
    /// State after seeing row `row`. `Done` is final.
    pub fn advance(self, row: u32, start: u32, end: Option<u32>) -> Self {
        match self {
            RangeState::Done => RangeState::Done,
            _ if row < start => RangeState::BeforeStart,
            _ if end.is_some_and(|end| row > end) => RangeState::Done,
            _ => RangeState::InRange,
        }
    }
}

/// Statistics of a finished conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Name of the converted sheet
    pub sheet: String,
    /// Entries in the workbook's shared strings table
    pub shared_strings: usize,
    /// Columns that were read as languages
    pub languages: Vec<LanguageColumn>,
    /// In-range rows that had a key
    pub rows_processed: usize,
    /// In-range rows skipped because their key was empty or absent
    pub rows_skipped: usize,
    /// In-range rows whose key had already been seen
    pub duplicate_keys: usize,
    /// Entry count per output language, in output order
    pub entries: Vec<(LanguageTag, usize)>,
}

/// A converted document together with its report.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: OutputDocument,
    pub report: ConversionReport,
}

/// Converts translation spreadsheets into [`OutputDocument`]s.
///
/// # Example
///
/// ```rust,no_run
/// use litchi_i18n::{ConvertOptions, Converter};
///
/// let converter = Converter::new(ConvertOptions {
///     sheet: Some("Main".to_string()),
///     ..ConvertOptions::default()
/// })?;
/// let report = converter.convert_to_file("strings.xlsx", "strings.json")?;
/// println!("{} rows converted", report.rows_processed);
/// # Ok::<(), litchi_i18n::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    classifier: HeaderClassifier,
}

impl Converter {
    /// Create a converter, rejecting an invalid row range up front.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        let classifier = options.classifier();
        Ok(Self {
            options,
            classifier,
        })
    }

    /// Convert the workbook at `path`.
    pub fn convert_path<P: AsRef<Path>>(&self, path: P) -> Result<Conversion> {
        let mut workbook: Workbook<BufReader<File>> = Workbook::open(path)?;
        self.convert_workbook(&mut workbook)
    }

    /// Convert a workbook read from any seekable source.
    pub fn convert_reader<R: Read + Seek>(&self, reader: R) -> Result<Conversion> {
        let mut workbook = Workbook::from_reader(reader)?;
        self.convert_workbook(&mut workbook)
    }

    /// Convert the workbook at `input` and write the JSON document to `output`.
    ///
    /// Nothing is written unless the whole conversion succeeds.
    pub fn convert_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ConversionReport> {
        let conversion = self.convert_path(input)?;
        write_json_atomic(output.as_ref(), &conversion.document)?;
        info!(output = %output.as_ref().display(), "wrote i18n document");
        Ok(conversion.report)
    }

    /// Convert one sheet of an opened workbook.
    pub fn convert_workbook<R: Read + Seek>(&self, workbook: &mut Workbook<R>) -> Result<Conversion> {
        let location = workbook.resolve(self.options.sheet.as_deref())?;
        let shared_strings = workbook.shared_strings().len();
        info!(
            sheet = %location.name,
            part = %location.part,
            shared_strings,
            "converting sheet"
        );

        let mut rows = workbook.rows(&location)?.until(self.options.end);
        let header = self.find_header(&mut rows, &location.name)?;
        let plan = self.classifier.classify(&header)?;
        info!(
            key_column = plan.key_column,
            languages = ?plan.languages.iter().map(|l| l.tag.as_str()).collect::<Vec<_>>(),
            "classified header row"
        );

        let mut builder = DocumentBuilder::new(&plan);
        let (start, end) = (self.options.start, self.options.end);
        let mut state = RangeState::BeforeStart;

        for row in rows {
            let row = row?;
            state = state.advance(row.number(), start, end);
            match state {
                RangeState::BeforeStart => continue,
                RangeState::Done => break,
                RangeState::InRange => builder.add_row(&row),
            }
            if end == Some(row.number()) {
                break;
            }
        }

        let (document, stats) = builder.finish();
        let report = ConversionReport {
            sheet: location.name,
            shared_strings,
            languages: plan.languages,
            rows_processed: stats.processed,
            rows_skipped: stats.skipped,
            duplicate_keys: stats.duplicates,
            entries: document
                .iter()
                .map(|(tag, map)| (tag.clone(), map.len()))
                .collect(),
        };
        info!(
            rows = report.rows_processed,
            skipped = report.rows_skipped,
            languages = document.len(),
            "conversion finished"
        );

        Ok(Conversion { document, report })
    }

    /// Consume rows up to and including the header row.
    ///
    /// Without an explicit header row the first row the sheet declares is the
    /// header, whatever its number.
    fn find_header<I>(&self, rows: &mut I, sheet: &str) -> Result<Row>
    where
        I: Iterator<Item = crate::ooxml::Result<Row>>,
    {
        let Some(header_row) = self.options.header_row else {
            let first = rows
                .next()
                .transpose()?
                .ok_or_else(|| Error::EmptySheet(sheet.to_string()))?;
            if first.number() >= self.options.start {
                return Err(Error::InvalidRange(format!(
                    "header is the sheet's first row {}, which is not before start row {}",
                    first.number(),
                    self.options.start
                )));
            }
            return Ok(first);
        };

        for row in rows.by_ref() {
            let row = row?;
            if row.number() == header_row {
                return Ok(row);
            }
            if row.number() > header_row {
                break;
            }
        }
        Err(Error::HeaderRowNotFound(header_row))
    }
}

#[derive(Debug, Default)]
struct RowStats {
    processed: usize,
    skipped: usize,
    duplicates: usize,
}

/// Accumulates in-range rows into a document.
struct DocumentBuilder<'p> {
    plan: &'p ColumnPlan,
    document: OutputDocument,
    seen_keys: HashSet<String>,
    stats: RowStats,
}

impl<'p> DocumentBuilder<'p> {
    fn new(plan: &'p ColumnPlan) -> Self {
        Self {
            plan,
            document: OutputDocument::new(),
            seen_keys: HashSet::new(),
            stats: RowStats::default(),
        }
    }

    fn add_row(&mut self, row: &Row) {
        let Some(key) = present(row, self.plan.key_column) else {
            debug!(row = row.number(), "row without key skipped");
            self.stats.skipped += 1;
            return;
        };

        self.stats.processed += 1;
        if !self.seen_keys.insert(key.to_string()) {
            warn!(key, row = row.number(), "duplicate key; later values replace earlier ones");
            self.stats.duplicates += 1;
        }

        for language in &self.plan.languages {
            if let Some(text) = present(row, language.column) {
                self.document.insert(&language.tag, key, text.to_string());
            }
        }
    }

    fn finish(self) -> (OutputDocument, RowStats) {
        (self.document, self.stats)
    }
}

/// A cell's trimmed text, or `None` when the cell is absent or blank.
fn present(row: &Row, column: u32) -> Option<&str> {
    row.get(column).map(str::trim).filter(|text| !text.is_empty())
}
