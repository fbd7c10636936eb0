//! CSV output: overwrite guard and row writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::record::IssueRecord;
use crate::{Error, Result};

/// Fixed header row of the output file
pub const CSV_HEADER: [&str; 8] = [
    "number",
    "title",
    "createdAt",
    "updatedAt",
    "closedAt",
    "state",
    "stateReason",
    "labels",
];

/// Make sure writing to `path` is allowed
///
/// A missing file is always fine. An existing one needs either
/// `allow_overwrite` or a yes from `confirm`; a no leaves the file as it was
/// and returns [`Error::OverwriteDeclined`].
pub fn prepare_output<F>(path: &Path, allow_overwrite: bool, confirm: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<bool>,
{
    if !path.exists() {
        return Ok(());
    }

    if allow_overwrite {
        info!(path = %path.display(), "Overwriting existing output file");
        return Ok(());
    }

    if confirm(path)? {
        Ok(())
    } else {
        Err(Error::OverwriteDeclined(path.to_path_buf()))
    }
}

/// Appends issue rows to a CSV stream
///
/// The header is written on construction. Dropping the writer flushes it, so
/// the stream is released on every exit path.
pub struct RowWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl RowWriter<File> {
    /// Create (or truncate) the file at `path` and write the header
    pub fn create(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Opening output file");
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> RowWriter<W> {
    /// Wrap any writer and write the header
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(CSV_HEADER)?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one issue row
    pub fn write_issue(&mut self, record: &IssueRecord) -> Result<()> {
        self.inner.write_record(record.to_row())?;
        self.rows += 1;
        Ok(())
    }

    /// Number of issue rows written so far (header excluded)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush buffered rows to the underlying stream
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| Error::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

impl<W: Write> std::fmt::Debug for RowWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowWriter")
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}
