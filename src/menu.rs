//! Numbered text menu and the actions behind it

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::cli::{report_delete, report_export};
use crate::client::GmailClient;
use crate::config::Config;
use crate::delete::{discover_delete_files, BatchDeleter, DeleteOptions, DeleteSummary};
use crate::error::{GmailError, Result};
use crate::export::{ExportOptions, ExportSummary, LabelExporter};
use crate::models::Label;
use crate::progress::StatusReporter;

/// Top-level menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    GetLabels,
    ExportLabel,
    DeleteEmails,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 4] = [
        MenuAction::GetLabels,
        MenuAction::ExportLabel,
        MenuAction::DeleteEmails,
        MenuAction::Exit,
    ];

    pub fn key(&self) -> u8 {
        match self {
            MenuAction::GetLabels => 1,
            MenuAction::ExportLabel => 2,
            MenuAction::DeleteEmails => 3,
            MenuAction::Exit => 0,
        }
    }

    /// Parse the number typed at the menu prompt
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|action| trimmed == action.key().to_string())
            .ok_or_else(|| {
                GmailError::InvalidSelection(format!("'{}' is not a menu option", trimmed))
            })
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MenuAction::GetLabels => "Get labels",
            MenuAction::ExportLabel => "Get emails of a label",
            MenuAction::DeleteEmails => "Delete emails",
            MenuAction::Exit => "Exit",
        };
        write!(f, "[{}] {}", self.key(), text)
    }
}

/// Parse an index typed for a list of `len` entries
pub fn parse_index(input: &str, len: usize) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(index) if index < len => Ok(index),
        _ if len == 0 => Err(GmailError::InvalidSelection(
            "there is nothing to select".to_string(),
        )),
        _ => Err(GmailError::InvalidSelection(format!(
            "'{}' (expected 0-{})",
            trimmed,
            len - 1
        ))),
    }
}

/// Find a label by id, falling back to an exact name match
pub fn find_label<'a>(labels: &'a [Label], key: &str) -> Result<&'a Label> {
    labels
        .iter()
        .find(|l| l.id == key)
        .or_else(|| labels.iter().find(|l| l.name == key))
        .ok_or_else(|| GmailError::InvalidSelection(format!("no label with id or name '{}'", key)))
}

/// Source of typed answers
pub trait Prompter: Send + Sync {
    fn ask(&self, message: &str) -> Result<String>;
}

/// Reads answers from the terminal with inquire
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&self, message: &str) -> Result<String> {
        Ok(inquire::Text::new(message).prompt()?)
    }
}

/// Fetch labels and print them as `[index] - name`
pub async fn show_labels(
    client: &dyn GmailClient,
    reporter: &dyn StatusReporter,
) -> Result<Vec<Label>> {
    reporter.start_spinner("Getting labels");
    let labels = client.list_labels().await;
    reporter.stop_spinner();
    let labels = labels?;

    if labels.is_empty() {
        reporter.message("No labels found.");
        return Ok(labels);
    }

    reporter.message("Labels:");
    for (index, label) in labels.iter().enumerate() {
        reporter.message(&format!("[{}] - {}", index, label.name));
    }
    Ok(labels)
}

/// Export one label using the configured output directory
pub async fn export_label(
    client: &dyn GmailClient,
    reporter: &dyn StatusReporter,
    config: &Config,
    label: &Label,
) -> Result<ExportSummary> {
    LabelExporter::new(client, reporter, ExportOptions::from_config(config))
        .export(label)
        .await
}

/// Delete the messages listed in one file
pub async fn delete_file(
    client: &dyn GmailClient,
    reporter: &dyn StatusReporter,
    config: &Config,
    path: &Path,
) -> Result<DeleteSummary> {
    BatchDeleter::new(client, reporter, DeleteOptions::from_config(config))
        .delete_from_file(path)
        .await
}

/// Interactive menu loop
pub struct Menu<'a> {
    client: &'a dyn GmailClient,
    reporter: &'a dyn StatusReporter,
    prompter: &'a dyn Prompter,
    config: &'a Config,
}

impl<'a> Menu<'a> {
    pub fn new(
        client: &'a dyn GmailClient,
        reporter: &'a dyn StatusReporter,
        prompter: &'a dyn Prompter,
        config: &'a Config,
    ) -> Self {
        Self {
            client,
            reporter,
            prompter,
            config,
        }
    }

    /// Show the menu until the user exits.
    ///
    /// Invalid selections and remote failures are reported and the menu is shown
    /// again; a cancelled prompt ends the loop.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.print_menu();
            let answer = self
                .prompter
                .ask("Select an option (typing in the number then hit enter):")?;

            let action = match MenuAction::parse(&answer) {
                Ok(action) => action,
                Err(e) => {
                    self.reporter.message(&e.to_string());
                    continue;
                }
            };

            self.reporter.message(&format!("\nSelected option: {}", action));
            if action == MenuAction::Exit {
                info!("Exiting menu");
                return Ok(());
            }

            match self.dispatch(action).await {
                Ok(()) => {}
                Err(e @ GmailError::OperationCancelled(_)) => return Err(e),
                Err(e @ GmailError::InvalidSelection(_)) => {
                    warn!("{}", e);
                    self.reporter.message(&e.to_string());
                }
                Err(e) => {
                    error!("{} failed: {}", action, e);
                    self.reporter.message(&format!("An error occurred: {}", e));
                }
            }
        }
    }

    async fn dispatch(&self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::GetLabels => {
                show_labels(self.client, self.reporter).await?;
            }
            MenuAction::ExportLabel => {
                let labels = show_labels(self.client, self.reporter).await?;
                let answer = self
                    .prompter
                    .ask("Select a label (typing in the number then hit enter):")?;
                let label = &labels[parse_index(&answer, labels.len())?];
                self.reporter
                    .message(&format!("\nSelected option: {}", label.name));
                let summary = export_label(self.client, self.reporter, self.config, label).await?;
                report_export(&summary, self.reporter);
            }
            MenuAction::DeleteEmails => {
                let files = self.list_delete_files()?;
                let answer = self.prompter.ask("Select the file number:")?;
                let path = &files[parse_index(&answer, files.len())?];
                self.reporter
                    .message(&format!("\nSelected option: {}\n", path.display()));
                let summary = delete_file(self.client, self.reporter, self.config, path).await?;
                report_delete(&summary, self.reporter);
            }
            MenuAction::Exit => {}
        }
        Ok(())
    }

    fn list_delete_files(&self) -> Result<Vec<PathBuf>> {
        let files = discover_delete_files(&self.config.delete.queue_dir)?;
        if files.is_empty() {
            self.reporter.message(&format!(
                "No .csv files found in {}",
                self.config.delete.queue_dir.display()
            ));
        }
        for (index, path) in files.iter().enumerate() {
            self.reporter
                .message(&format!("[{}] - {}", index, path.display()));
        }
        Ok(files)
    }

    fn print_menu(&self) {
        let mut text = String::from("\nMenu:");
        for action in MenuAction::ALL {
            text.push_str(&format!("\n  {}", action));
        }
        self.reporter.message(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_action() {
        assert_eq!(MenuAction::parse("1").unwrap(), MenuAction::GetLabels);
        assert_eq!(MenuAction::parse(" 2 ").unwrap(), MenuAction::ExportLabel);
        assert_eq!(MenuAction::parse("3").unwrap(), MenuAction::DeleteEmails);
        assert_eq!(MenuAction::parse("0").unwrap(), MenuAction::Exit);
    }

    #[test]
    fn test_parse_menu_action_invalid() {
        for input in ["4", "-1", "", "one", "01"] {
            let result = MenuAction::parse(input);
            assert!(
                matches!(result, Err(GmailError::InvalidSelection(_))),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_menu_action_display() {
        assert_eq!(MenuAction::GetLabels.to_string(), "[1] Get labels");
        assert_eq!(MenuAction::Exit.to_string(), "[0] Exit");
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0", 3).unwrap(), 0);
        assert_eq!(parse_index(" 2\n", 3).unwrap(), 2);

        let err = parse_index("3", 3).unwrap_err();
        assert_eq!(err.to_string(), "Invalid selection: '3' (expected 0-2)");

        assert!(parse_index("abc", 3).is_err());
        assert!(parse_index("-1", 3).is_err());
        assert!(matches!(
            parse_index("0", 0),
            Err(GmailError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_find_label() {
        let labels = vec![
            Label::new("INBOX", "INBOX"),
            Label::new("Label_1", "Receipts"),
        ];

        assert_eq!(find_label(&labels, "Label_1").unwrap().name, "Receipts");
        assert_eq!(find_label(&labels, "Receipts").unwrap().id, "Label_1");
        assert!(matches!(
            find_label(&labels, "Missing"),
            Err(GmailError::InvalidSelection(_))
        ));
    }
}
