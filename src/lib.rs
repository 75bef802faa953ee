//! Gmail Label Export
//!
//! Exports the messages of a Gmail label to CSV and deletes messages in bulk
//! from a file of message IDs.
//!
//! # Overview
//!
//! - **Export**: walks a label page by page and appends `id,date,from,subject`
//!   rows to a CSV file as each page arrives
//! - **Delete**: reads message IDs from a CSV/TSV file and removes them with
//!   `messages.batchDelete`, a fixed number at a time
//! - **Progress**: a plain-text progress bar with elapsed time
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_label_export::{auth, client::ProductionGmailClient, config::Config};
//! use gmail_label_export::export::{ExportOptions, LabelExporter};
//! use gmail_label_export::models::Label;
//! use gmail_label_export::progress::ConsoleReporter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         ".gmail-export/token.json".as_ref(),
//!     )
//!     .await?;
//!
//!     let client = ProductionGmailClient::new(hub);
//!     let reporter = ConsoleReporter::new();
//!     let exporter = LabelExporter::new(&client, &reporter, ExportOptions::from_config(&config));
//!
//!     let summary = exporter.export(&Label::new("INBOX", "INBOX")).await?;
//!     println!("{} rows written", summary.rows_written);
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`client`] - Gmail API client trait and production implementation
//! - [`cli`] - Command-line arguments and command dispatch
//! - [`config`] - Configuration management
//! - [`csv_sink`] - Append-only CSV writer
//! - [`delete`] - Batch delete pipeline
//! - [`error`] - Error types and result aliases
//! - [`export`] - Label export pipeline
//! - [`menu`] - Interactive numbered menu
//! - [`models`] - Core data structures
//! - [`progress`] - Progress bar rendering and status reporting

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod csv_sink;
pub mod delete;
pub mod error;
pub mod export;
pub mod menu;
pub mod models;
pub mod progress;

pub use error::{GmailError, Result};

pub use models::{ExportedRow, Label, LabelInfo, MessageDetail, MessagePage, PageCursor};

pub use client::{GmailClient, ProductionGmailClient};

pub use config::{Config, DeleteConfig, ExportConfig};

pub use export::{ExportOutcome, ExportSummary, LabelExporter};
pub use delete::{BatchDeleter, DeleteSummary};

pub use cli::{Cli, Commands};
pub use menu::{Menu, MenuAction};
pub use progress::{ConsoleReporter, StatusReporter};
