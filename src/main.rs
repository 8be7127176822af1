//! Command-line converter from translation spreadsheets to i18n JSON.
//!
//! # Usage
//!
//! ```sh
//! xlsx2i18n strings.xlsx strings.json --sheet Main --start 2 --end 120
//! ```
//!
//! Logs go to stderr and can be tuned with `RUST_LOG`; stdout only carries the
//! summary of a successful run.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use litchi_i18n::i18n::{DEFAULT_EXCLUDED_COLUMNS, write_json_atomic};
use litchi_i18n::{Conversion, ConvertOptions, Converter, TagStyle};
use tracing::info;

/// How many entries of each language to echo after a successful run
const SAMPLE_SIZE: usize = 3;

/// Convert a multilingual Excel sheet into an i18n JSON resource map
#[derive(Parser, Debug)]
#[command(
    name = "xlsx2i18n",
    about = "Convert a multilingual Excel (.xlsx) sheet into i18n JSON",
    long_about = "Reads one sheet of an .xlsx workbook whose header row names a key column and\n\
                  one column per language, and writes a JSON object mapping each language tag\n\
                  to its key → text translations.",
    version
)]
struct Args {
    /// Spreadsheet to read
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// JSON file to write
    #[arg(value_name = "OUTPUT")]
    output_file: PathBuf,

    /// Sheet to convert (default: the first sheet of the workbook)
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// First data row, 1-based
    #[arg(long, value_name = "N", default_value_t = 2)]
    start: u32,

    /// Last data row, 1-based and inclusive (default: the last row of the sheet)
    #[arg(long, value_name = "N")]
    end: Option<u32>,

    /// Row holding the column headers, 1-based (default: the first row of the sheet)
    #[arg(long, value_name = "N")]
    header_row: Option<u32>,

    /// Header label of the key column
    #[arg(long, value_name = "LABEL", default_value = "key")]
    key_col: String,

    /// Header label of the default-language column
    #[arg(long, value_name = "LABEL", default_value = "default")]
    default_col: String,

    /// Language tag for the default-language column
    #[arg(long, value_name = "TAG", default_value = "en")]
    default_lang: String,

    /// Keep language codes as written in the header (e.g. `zh_rCN` instead of `zh-CN`)
    #[arg(long)]
    no_abbrev: bool,

    /// Header label that is never a language column (repeatable)
    #[arg(long, value_name = "LABEL", default_values = DEFAULT_EXCLUDED_COLUMNS)]
    exclude_col: Vec<String>,

    /// Log every skipped row and column
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            sheet: self.sheet.clone(),
            start: self.start,
            end: self.end,
            header_row: self.header_row,
            key_col: self.key_col.clone(),
            default_col: self.default_col.clone(),
            default_lang: self.default_lang.clone(),
            tag_style: if self.no_abbrev {
                TagStyle::Preserved
            } else {
                TagStyle::Abbreviated
            },
            exclude_cols: self.exclude_col.clone(),
        }
    }

    fn log_directive(&self) -> &'static str {
        if self.verbose {
            "litchi_i18n=debug"
        } else if self.quiet {
            "litchi_i18n=warn"
        } else {
            "litchi_i18n=info"
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn init_logging(args: &Args) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(args.log_directive().parse()?),
        )
        .init();
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let converter = Converter::new(args.options())?;

    info!(input = %args.input_file.display(), "reading workbook");
    let conversion = converter
        .convert_path(&args.input_file)
        .with_context(|| format!("Failed to convert {}", args.input_file.display()))?;

    write_json_atomic(&args.output_file, &conversion.document)
        .with_context(|| format!("Failed to write {}", args.output_file.display()))?;

    print_summary(&args.output_file, &conversion);
    Ok(())
}

fn print_summary(output: &Path, conversion: &Conversion) {
    let report = &conversion.report;

    println!("✓ Wrote {}", output.display());
    println!(
        "  Sheet '{}': {} rows converted, {} without key, {} duplicate keys",
        report.sheet, report.rows_processed, report.rows_skipped, report.duplicate_keys
    );
    if report.entries.is_empty() {
        println!("  No translations found");
        return;
    }

    for (tag, translations) in conversion.document.iter() {
        println!("  {tag}: {} entries", translations.len());
        for (key, text) in translations.iter().take(SAMPLE_SIZE) {
            println!("    {key} = {text}");
        }
    }
}
