//! Label export: walks every page of a label and appends each page to a CSV file

use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::GmailClient;
use crate::config::Config;
use crate::csv_sink::CsvSink;
use crate::error::{GmailError, Result};
use crate::models::{ExportedRow, Label, PageCursor};
use crate::progress::{timestamp_pretty, ProgressTracker, StatusReporter};

/// Tunables for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub fetch_batch_size: u32,
    pub page_delay: Duration,
    pub message_delay: Duration,
    pub output_dir: PathBuf,
    pub bar_length: usize,
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch_batch_size: config.export.fetch_batch_size,
            page_delay: config.export.page_delay(),
            message_delay: config.export.message_delay(),
            output_dir: config.export.output_dir.clone(),
            bar_length: config.progress.bar_length,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The label had no messages; nothing was written
    Empty,
    /// Every page was fetched and written
    Completed,
    /// A remote call failed; rows written before it stay in the file
    Aborted { error: String },
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub outcome: ExportOutcome,
    pub output_path: PathBuf,
    pub messages_total: u64,
    pub pages_fetched: u64,
    pub rows_written: u64,
}

impl ExportSummary {
    fn new(output_path: &Path) -> Self {
        Self {
            outcome: ExportOutcome::Completed,
            output_path: output_path.to_path_buf(),
            messages_total: 0,
            pages_fetched: 0,
            rows_written: 0,
        }
    }
}

/// Exports the messages of a label to CSV
pub struct LabelExporter<'a> {
    client: &'a dyn GmailClient,
    reporter: &'a dyn StatusReporter,
    options: ExportOptions,
}

impl<'a> LabelExporter<'a> {
    pub fn new(
        client: &'a dyn GmailClient,
        reporter: &'a dyn StatusReporter,
        options: ExportOptions,
    ) -> Self {
        Self {
            client,
            reporter,
            options,
        }
    }

    /// Where the export of `label` is written
    pub fn output_path(&self, label: &Label) -> PathBuf {
        self.options
            .output_dir
            .join(format!("{}.csv", label.file_stem()))
    }

    /// Export `label` to its default output path
    pub async fn export(&self, label: &Label) -> Result<ExportSummary> {
        let output_path = self.output_path(label);
        self.export_label(label, &output_path).await
    }

    /// Export every message of `label` to `output_path`.
    ///
    /// Remote failures end the run with [`ExportOutcome::Aborted`] rather than an
    /// error; local write failures are returned as errors. Pages are appended as
    /// soon as they are fetched and are never rolled back.
    pub async fn export_label(&self, label: &Label, output_path: &Path) -> Result<ExportSummary> {
        let mut summary = ExportSummary::new(output_path);
        self.reporter.message(&format!(
            "[{}] Downloading emails from label: {}",
            timestamp_pretty(Local::now()),
            label.file_stem()
        ));

        self.reporter.start_spinner("Getting label info");
        let label_info = self.client.get_label_info(&label.id).await;
        self.reporter.stop_spinner();

        let messages_total = match label_info {
            Ok(info) => {
                debug!("Label {} reports {} messages", info.id, info.messages_total);
                info.messages_total
            }
            Err(e) => return Ok(self.abort(summary, "get label info", e)),
        };
        summary.messages_total = messages_total;

        if messages_total == 0 {
            info!("Label {} has no messages", label.id);
            self.reporter.message("There are no emails in this label.");
            summary.outcome = ExportOutcome::Empty;
            return Ok(summary);
        }

        let batch_size = u64::from(self.options.fetch_batch_size.max(1));
        let total_pages = (messages_total + batch_size - 1) / batch_size;
        let mut tracker = ProgressTracker::new("Downloading:", total_pages, self.options.bar_length);
        let sink = CsvSink::new(output_path);
        let label_ids = vec![label.id.clone()];

        self.render(&mut tracker, 0, &summary)?;

        let mut cursor = PageCursor::First;
        while !cursor.is_exhausted() {
            let (rows, next_page_token) = match self.fetch_page(&label_ids, &cursor).await {
                Ok(page) => page,
                Err(e) => return Ok(self.abort(summary, "fetch page", e)),
            };

            if !rows.is_empty() {
                sink.append(&rows)?;
            }
            summary.rows_written += rows.len() as u64;
            summary.pages_fetched += 1;
            self.render(&mut tracker, summary.pages_fetched, &summary)?;

            cursor = PageCursor::after(next_page_token);
            if !cursor.is_exhausted() {
                pause(self.options.page_delay).await;
            }
        }

        if let Some(line) = tracker.finish(summary.pages_fetched, &self.suffix(&summary))? {
            self.reporter.progress(&line);
        }

        info!(
            "Exported {} messages from {} in {} pages",
            summary.rows_written, label.id, summary.pages_fetched
        );
        self.reporter.message(&format!(
            "[{}] Done! Emails data stored in {}.",
            timestamp_pretty(Local::now()),
            output_path.display()
        ));
        Ok(summary)
    }

    /// Fetch one page of summaries and the headers of each message on it
    async fn fetch_page(
        &self,
        label_ids: &[String],
        cursor: &PageCursor,
    ) -> Result<(Vec<ExportedRow>, Option<String>)> {
        let page = self
            .client
            .list_messages_page(label_ids, self.options.fetch_batch_size, cursor)
            .await?;

        if page.messages.is_empty() {
            debug!("No messages found at cursor {:?}", cursor);
        }

        let mut rows = Vec::with_capacity(page.messages.len());
        for (index, summary) in page.messages.iter().enumerate() {
            if index > 0 {
                pause(self.options.message_delay).await;
            }
            let detail = self.client.get_message(&summary.id).await?;
            rows.push(ExportedRow::from_detail(&summary.id, &detail));
        }

        Ok((rows, page.next_page_token))
    }

    fn suffix(&self, summary: &ExportSummary) -> String {
        format!(
            "Complete ({}/{})",
            summary.rows_written, summary.messages_total
        )
    }

    fn render(&self, tracker: &mut ProgressTracker, iteration: u64, summary: &ExportSummary) -> Result<()> {
        let line = tracker.render(iteration, &self.suffix(summary))?;
        self.reporter.progress(&line);
        Ok(())
    }

    fn abort(&self, mut summary: ExportSummary, stage: &str, e: GmailError) -> ExportSummary {
        error!("Export failed during {}: {}", stage, e);
        if summary.rows_written > 0 {
            warn!(
                "{} rows were written to {:?} before the failure",
                summary.rows_written, summary.output_path
            );
        }
        self.reporter.message(&format!("An error occurred: {}", e));
        if e.is_transient() {
            self.reporter
                .message("The error looks temporary; running the export again may succeed.");
        }
        summary.outcome = ExportOutcome::Aborted {
            error: e.to_string(),
        };
        summary
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
