//! Text progress bar and status reporting for the export and delete pipelines

use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{GmailError, Result};

pub const DEFAULT_BAR_LENGTH: usize = 50;

const FILL: char = '█';
const EMPTY: char = '-';

/// Percentage of `iteration` over `total`, one decimal place
pub fn percent_complete(iteration: u64, total: u64) -> String {
    format!("{:.1}", 100.0 * (iteration as f64 / total as f64))
}

/// Number of filled cells for a bar of `bar_length`
pub fn filled_length(iteration: u64, total: u64, bar_length: usize) -> usize {
    (bar_length as u64 * iteration.min(total) / total) as usize
}

/// Format elapsed seconds as `Ns`, `Mm Ss` or `Hh Mm Ss`
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    if elapsed_seconds < 60 {
        format!("{}s", elapsed_seconds)
    } else if elapsed_seconds < 3600 {
        format!("{}m {}s", elapsed_seconds / 60, elapsed_seconds % 60)
    } else {
        format!(
            "{}h {}m {}s",
            elapsed_seconds / 3600,
            (elapsed_seconds % 3600) / 60,
            elapsed_seconds % 60
        )
    }
}

/// Local timestamp for log banners, e.g. `10/19/2026, 14:03:59`
pub fn timestamp_pretty(time: DateTime<Local>) -> String {
    time.format("%m/%d/%Y, %H:%M:%S").to_string()
}

/// Render one progress line.
///
/// The line starts with a carriage return so it overwrites the previous one, and
/// ends with a newline once `iteration` reaches `total`. `total` must be positive.
pub fn render_progress_bar(
    iteration: u64,
    total: u64,
    elapsed_seconds: u64,
    prefix: &str,
    suffix: &str,
    bar_length: usize,
) -> Result<String> {
    if total == 0 {
        return Err(GmailError::InvalidProgress(
            "total must be greater than 0".to_string(),
        ));
    }

    let filled = filled_length(iteration, total, bar_length);
    let bar: String = std::iter::repeat(FILL)
        .take(filled)
        .chain(std::iter::repeat(EMPTY).take(bar_length - filled))
        .collect();

    let mut line = format!(
        "\r{} |{}| {}% {} [time: {}]",
        prefix,
        bar,
        percent_complete(iteration, total),
        suffix,
        format_elapsed(elapsed_seconds)
    );
    if iteration >= total {
        line.push('\n');
    }
    Ok(line)
}

/// Progress for one pipeline run: fixed prefix, estimated total, start time
#[derive(Debug)]
pub struct ProgressTracker {
    prefix: String,
    total: u64,
    bar_length: usize,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(prefix: impl Into<String>, total: u64, bar_length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            total,
            bar_length,
            started: Instant::now(),
        }
    }

    /// Render the bar for `iteration`.
    ///
    /// The total is an estimate taken before the run; when more iterations happen
    /// than estimated it is raised to keep the bar well-formed.
    pub fn render(&mut self, iteration: u64, suffix: &str) -> Result<String> {
        if iteration > self.total {
            self.total = iteration;
        }
        render_progress_bar(
            iteration,
            self.total,
            self.started.elapsed().as_secs(),
            &self.prefix,
            suffix,
            self.bar_length,
        )
    }

    /// Close the bar after the last `iteration` when the run ended short of the
    /// estimated total. Returns `None` if the bar already reached its total.
    pub fn finish(&mut self, iteration: u64, suffix: &str) -> Result<Option<String>> {
        if iteration >= self.total {
            return Ok(None);
        }
        self.total = iteration.max(1);
        self.render(self.total, suffix).map(Some)
    }
}

/// Status output for the pipelines
///
/// Passed explicitly into each pipeline so tests can capture what the user would see.
pub trait StatusReporter: Send + Sync {
    /// Print a message on its own line
    fn message(&self, text: &str);

    /// Overwrite the current progress line
    fn progress(&self, line: &str);

    /// Show a spinner while waiting on a remote call
    fn start_spinner(&self, text: &str);

    /// Remove the spinner, if any
    fn stop_spinner(&self);
}

/// Terminal reporter using stdout and an indicatif spinner
pub struct ConsoleReporter {
    spinner: Mutex<Option<ProgressBar>>,
    spinner_style: ProgressStyle,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("▹▸▹▹▸▸▸ ");

        Self {
            spinner: Mutex::new(None),
            spinner_style,
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for ConsoleReporter {
    fn message(&self, text: &str) {
        println!("{}", text);
    }

    fn progress(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(line.as_bytes());
        let _ = stdout.flush();
    }

    fn start_spinner(&self, text: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(self.spinner_style.clone());
        pb.set_message(text.to_string());
        pb.enable_steady_tick(Duration::from_millis(300));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}
