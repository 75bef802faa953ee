//! Common test utilities and fixtures

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use gmail_label_export::client::GmailClient;
use gmail_label_export::config::Config;
use gmail_label_export::error::{GmailError, Result};
use gmail_label_export::menu::Prompter;
use gmail_label_export::models::{
    Header, Label, LabelInfo, MessageDetail, MessagePage, MessageSummary, PageCursor,
};
use gmail_label_export::progress::StatusReporter;
use mockall::mock;

mock! {
    pub GmailClient {}

    #[async_trait::async_trait]
    impl GmailClient for GmailClient {
        async fn list_labels(&self) -> Result<Vec<Label>>;
        async fn get_label_info(&self, label_id: &str) -> Result<LabelInfo>;
        async fn list_messages_page(
            &self,
            label_ids: &[String],
            page_size: u32,
            cursor: &PageCursor,
        ) -> Result<MessagePage>;
        async fn get_message(&self, message_id: &str) -> Result<MessageDetail>;
        async fn batch_delete(&self, message_ids: &[String]) -> Result<()>;
    }
}

/// Captures everything the pipelines would show the user
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<String>>,
    pub spinners: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn progress_lines(&self) -> Vec<String> {
        self.progress.lock().unwrap().clone()
    }

    pub fn saw_message(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl StatusReporter for RecordingReporter {
    fn message(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }

    fn progress(&self, line: &str) {
        self.progress.lock().unwrap().push(line.to_string());
    }

    fn start_spinner(&self, text: &str) {
        self.spinners.lock().unwrap().push(text.to_string());
    }

    fn stop_spinner(&self) {}
}

/// Replays canned answers; runs out as a cancelled prompt
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, _message: &str) -> Result<String> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GmailError::OperationCancelled("no more scripted answers".to_string()))
    }
}

/// Config with every delay disabled and files under `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.export.page_delay_ms = 0;
    config.export.message_delay_ms = 0;
    config.export.output_dir = root.join("get-emails");
    config.delete.batch_delay_ms = 0;
    config.delete.queue_dir = root.join("to-delete");
    config
}

pub fn no_delay() -> Duration {
    Duration::ZERO
}

pub fn message_ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{:04}", prefix, i)).collect()
}

pub fn page_of(ids: &[String], next_page_token: Option<&str>) -> MessagePage {
    MessagePage {
        messages: ids
            .iter()
            .map(|id| MessageSummary { id: id.clone() })
            .collect(),
        next_page_token: next_page_token.map(str::to_string),
    }
}

pub fn detail_for(id: &str, from: &str, subject: &str) -> MessageDetail {
    MessageDetail {
        id: id.to_string(),
        headers: vec![
            Header::new("Date", "Mon, 1 Jan 2024 10:00:00 +0000"),
            Header::new("From", from),
            Header::new("Subject", subject),
        ],
    }
}

/// Write one message id per line
pub fn write_id_file(path: &Path, lines: &[String]) {
    let mut body = lines.join("\n");
    if !lines.is_empty() {
        body.push('\n');
    }
    std::fs::write(path, body).unwrap();
}
