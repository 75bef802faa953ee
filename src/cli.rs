//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::client::GmailClient;
use crate::config::Config;
use crate::delete::DeleteSummary;
use crate::error::Result;
use crate::export::{ExportOptions, ExportOutcome, ExportSummary, LabelExporter};
use crate::menu::{self, find_label, Menu, Prompter};
use crate::progress::StatusReporter;

#[derive(Parser, Debug)]
#[command(name = "gmail-label-export")]
#[command(version)]
#[command(about = "Export Gmail labels to CSV and bulk-delete messages by ID", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = ".gmail-export/token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Run a single action instead of the interactive menu
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Authenticate with Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// List labels
    Labels,

    /// Export every message of a label to CSV
    Export {
        /// Label id or exact label name
        #[arg(short, long)]
        label: String,

        /// Output file (defaults to <output_dir>/<label>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete the messages whose ids are listed in a file
    Delete {
        /// File with one message id per line
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a command that needs an authenticated client
///
/// `None` runs the interactive menu. `Auth` and `InitConfig` are handled by the
/// binary before a client exists and are no-ops here.
pub async fn run_with_client(
    command: Option<Commands>,
    client: &dyn GmailClient,
    reporter: &dyn StatusReporter,
    prompter: &dyn Prompter,
    config: &Config,
) -> Result<()> {
    match command {
        None => Menu::new(client, reporter, prompter, config).run().await,
        Some(Commands::Labels) => {
            menu::show_labels(client, reporter).await?;
            Ok(())
        }
        Some(Commands::Export { label, output }) => {
            let labels = client.list_labels().await?;
            let label = find_label(&labels, &label)?;
            info!("Exporting label {} ({})", label.name, label.id);

            let exporter = LabelExporter::new(client, reporter, ExportOptions::from_config(config));
            let path = output.unwrap_or_else(|| exporter.output_path(label));
            let summary = exporter.export_label(label, &path).await?;
            report_export(&summary, reporter);
            Ok(())
        }
        Some(Commands::Delete { file }) => {
            let summary = menu::delete_file(client, reporter, config, &file).await?;
            report_delete(&summary, reporter);
            Ok(())
        }
        Some(Commands::Auth { .. }) | Some(Commands::InitConfig { .. }) => Ok(()),
    }
}

pub(crate) fn report_export(summary: &ExportSummary, reporter: &dyn StatusReporter) {
    if let ExportOutcome::Aborted { error } = &summary.outcome {
        reporter.message(&format!(
            "Export stopped early: {} of {} messages written to {} ({})",
            summary.rows_written,
            summary.messages_total,
            summary.output_path.display(),
            error
        ));
    }
}

pub(crate) fn report_delete(summary: &DeleteSummary, reporter: &dyn StatusReporter) {
    if summary.failed_batches.is_empty() {
        return;
    }

    let failed_ids: usize = summary.failed_batches.iter().map(|b| b.ids.len()).sum();
    reporter.message(&format!(
        "{} batches ({} ids) failed and were not retried:",
        summary.failed_batches.len(),
        failed_ids
    ));
    for batch in &summary.failed_batches {
        reporter.message(&format!("  batch {}: {}", batch.index, batch.error));
    }
}
