//! Atomic JSON output.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;

/// Serialize `value` as pretty-printed UTF-8 JSON and move it into place at `path`.
///
/// The JSON is first written to a temporary file next to `path`. The target is only
/// created or replaced once serialization and flushing succeeded; on error the
/// temporary file is removed and `path` is left untouched.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir)?;
    debug!(temp = %temp.path().display(), target = %path.display(), "writing output");

    let mut writer = BufWriter::new(temp);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;

    let temp = writer.into_inner().map_err(|err| err.into_error())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    Ok(())
}
