//! Append-only CSV output for exported messages

use csv::{QuoteStyle, WriterBuilder};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

use crate::error::Result;
use crate::models::ExportedRow;

/// Appends rows as `id,date,from,subject` with no header and no quoting.
///
/// The file is opened for each append and closed again, so every page written
/// before a failure stays on disk.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append `rows`, creating the file and its directory if needed
    pub fn append(&self, rows: &[ExportedRow]) -> Result<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(file);

        for row in rows {
            writer.write_record([&row.id, &row.date, &row.from, &row.subject])?;
        }
        writer.flush()?;

        debug!("Appended {} rows to {:?}", rows.len(), self.path);
        Ok(rows.len())
    }
}
