//! Bulk deletion of message IDs listed in a CSV/TSV file

use chrono::Local;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::GmailClient;
use crate::config::Config;
use crate::error::{GmailError, Result};
use crate::export::pause;
use crate::progress::{timestamp_pretty, ProgressTracker, StatusReporter};

/// Message ID on one line of a delete file.
///
/// The ID is everything before the first tab, then before the first comma,
/// with surrounding whitespace removed. Remaining fields are ignored.
pub fn parse_message_id(line: &str) -> &str {
    let field = line.split('\t').next().unwrap_or_default();
    field.split(',').next().unwrap_or_default().trim()
}

/// Splits a line-oriented ID file into batches of at most `batch_size` IDs.
///
/// A batch is yielded as soon as it is full, and whatever remains is yielded
/// once the input ends. That final batch may be empty. Blank lines are skipped.
pub struct IdBatches<R> {
    lines: Lines<R>,
    batch_size: usize,
    finished: bool,
}

impl<R: BufRead> IdBatches<R> {
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            lines: reader.lines(),
            batch_size: batch_size.max(1),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for IdBatches<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.lines.next() {
                Some(Ok(line)) => {
                    let id = parse_message_id(&line);
                    if id.is_empty() {
                        debug!("Skipping line without a message ID");
                        continue;
                    }
                    batch.push(id.to_string());
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finished = true;
                    break;
                }
            }
        }
        Some(Ok(batch))
    }
}

/// Number of lines in `path`
pub fn count_lines(path: &Path) -> Result<u64> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}

/// CSV files waiting in the delete queue directory, sorted by path
pub fn discover_delete_files(queue_dir: &Path) -> Result<Vec<PathBuf>> {
    if !queue_dir.exists() {
        warn!("Delete queue directory {:?} does not exist", queue_dir);
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(queue_dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext == "csv")
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pause before the batch after a failed one.
///
/// A rate-limit response stretches the usual delay to the provider's
/// retry-after hint; the failed batch itself is not retried.
pub fn delay_after_failure(batch_delay: Duration, e: &GmailError) -> Duration {
    match e.retry_after() {
        Some(seconds) => batch_delay.max(Duration::from_secs(seconds)),
        None => batch_delay,
    }
}

fn suffix(summary: &DeleteSummary) -> String {
    format!(
        "Complete ({}/{})",
        summary.messages_deleted, summary.line_count
    )
}

/// Tunables for one delete run
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub bar_length: usize,
}

impl DeleteOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.delete.batch_size,
            batch_delay: config.delete.batch_delay(),
            bar_length: config.progress.bar_length,
        }
    }
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A batch whose delete call failed; it is not retried
#[derive(Debug, Clone)]
pub struct FailedBatch {
    pub index: u64,
    pub ids: Vec<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteSummary {
    /// Lines in the input file
    pub line_count: u64,
    pub batches_attempted: u64,
    pub messages_deleted: u64,
    pub failed_batches: Vec<FailedBatch>,
}

impl DeleteSummary {
    pub fn is_empty_input(&self) -> bool {
        self.line_count == 0
    }
}

/// Deletes the messages listed in an ID file, one batch at a time
pub struct BatchDeleter<'a> {
    client: &'a dyn GmailClient,
    reporter: &'a dyn StatusReporter,
    options: DeleteOptions,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(
        client: &'a dyn GmailClient,
        reporter: &'a dyn StatusReporter,
        options: DeleteOptions,
    ) -> Self {
        Self {
            client,
            reporter,
            options,
        }
    }

    /// Delete every message listed in `path`.
    ///
    /// A failed batch is logged and recorded in the summary; the remaining
    /// batches are still attempted. Errors are returned only for local IO.
    pub async fn delete_from_file(&self, path: &Path) -> Result<DeleteSummary> {
        let mut summary = DeleteSummary::default();
        self.reporter.message(&format!(
            "[{}] Deleting messages in file {}",
            timestamp_pretty(Local::now()),
            path.display()
        ));

        summary.line_count = count_lines(path)?;
        if summary.line_count == 0 {
            info!("Delete file {:?} is empty", path);
            self.reporter.message("There are no email ids in this file.");
            return Ok(summary);
        }

        let batch_size = self.options.batch_size.max(1) as u64;
        let total_batches = (summary.line_count + batch_size - 1) / batch_size;
        let mut tracker = ProgressTracker::new("Deleting:", total_batches, self.options.bar_length);
        self.render(&mut tracker, &summary)?;

        let batches = IdBatches::new(BufReader::new(File::open(path)?), self.options.batch_size);
        let mut next_delay: Option<Duration> = None;

        for batch in batches {
            let batch = batch?;
            if batch.is_empty() {
                continue;
            }

            if let Some(delay) = next_delay.take() {
                pause(delay).await;
            }

            summary.batches_attempted += 1;
            next_delay = Some(self.options.batch_delay);

            match self.client.batch_delete(&batch).await {
                Ok(()) => {
                    debug!("Batch {} deleted {} messages", summary.batches_attempted, batch.len());
                    summary.messages_deleted += batch.len() as u64;
                }
                Err(e) => {
                    next_delay = Some(delay_after_failure(self.options.batch_delay, &e));
                    self.record_failure(&mut summary, batch, e);
                }
            }

            self.render(&mut tracker, &summary)?;
        }

        if let Some(line) = tracker.finish(summary.batches_attempted, &suffix(&summary))? {
            self.reporter.progress(&line);
        }

        info!(
            "Deleted {} messages from {:?} ({} failed batches)",
            summary.messages_deleted,
            path,
            summary.failed_batches.len()
        );
        self.reporter.message(&format!(
            "[{}] Finished deleting {} messages",
            timestamp_pretty(Local::now()),
            summary.messages_deleted
        ));
        Ok(summary)
    }

    fn record_failure(&self, summary: &mut DeleteSummary, ids: Vec<String>, e: GmailError) {
        error!(
            "Batch {} ({} ids) failed: {}",
            summary.batches_attempted,
            ids.len(),
            e
        );
        self.reporter.message(&format!("An error occurred: {}", e));
        summary.failed_batches.push(FailedBatch {
            index: summary.batches_attempted,
            ids,
            error: e.to_string(),
        });
    }

    fn render(&self, tracker: &mut ProgressTracker, summary: &DeleteSummary) -> Result<()> {
        let line = tracker.render(summary.batches_attempted, &suffix(summary))?;
        self.reporter.progress(&line);
        Ok(())
    }
}
