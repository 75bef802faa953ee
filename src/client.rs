//! Gmail API client for label, message and batch-delete calls

use async_trait::async_trait;
use google_gmail1::api::{BatchDeleteMessagesRequest, Message};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{GmailHub, FULL_ACCESS_SCOPE};
use crate::error::{GmailError, Result};
use crate::models::{Header, Label, LabelInfo, MessageDetail, MessagePage, MessageSummary, PageCursor};

const USER_ID: &str = "me";

/// Headers requested with `format=metadata`
const EXPORT_HEADERS: &[&str] = &["From", "Date", "Subject"];

/// Remote operations the pipelines depend on
///
/// Every failure comes back as a `GmailError`; callers decide whether it ends
/// the run or only the current page or batch.
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// List all labels in the account
    async fn list_labels(&self) -> Result<Vec<Label>>;

    /// Get label metadata, including its total message count
    async fn get_label_info(&self, label_id: &str) -> Result<LabelInfo>;

    /// Fetch one page of message references for the given labels
    async fn list_messages_page(
        &self,
        label_ids: &[String],
        page_size: u32,
        cursor: &PageCursor,
    ) -> Result<MessagePage>;

    /// Fetch message headers
    async fn get_message(&self, id: &str) -> Result<MessageDetail>;

    /// Permanently delete messages in one call
    async fn batch_delete(&self, ids: &[String]) -> Result<()>;
}

/// Production Gmail client
///
/// Calls are made one at a time; each is bounded by a request timeout so a
/// stalled connection surfaces as a `NetworkError` instead of hanging the run.
pub struct ProductionGmailClient {
    hub: GmailHub,
    request_timeout: Duration,
}

impl ProductionGmailClient {
    pub fn new(hub: GmailHub) -> Self {
        Self::with_timeout(hub, Duration::from_secs(30))
    }

    pub fn with_timeout(hub: GmailHub, request_timeout: Duration) -> Self {
        Self {
            hub,
            request_timeout,
        }
    }

    async fn call<T, F>(&self, operation: &str, request: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, google_gmail1::Error>>,
    {
        debug!("Calling Gmail API: {}", operation);
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result.map_err(GmailError::from),
            Err(_) => {
                warn!(
                    "Gmail API {} call timed out after {:?}",
                    operation, self.request_timeout
                );
                Err(GmailError::NetworkError(format!(
                    "{} timed out after {:?}",
                    operation, self.request_timeout
                )))
            }
        }
    }
}

/// Reduce an API message to its id and headers
fn parse_message_detail(msg: Message) -> Result<MessageDetail> {
    let id = msg
        .id
        .ok_or_else(|| GmailError::InvalidMessageFormat("Missing message ID".to_string()))?;

    let headers = msg
        .payload
        .and_then(|p| p.headers)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|h| match (h.name, h.value) {
            (Some(name), Some(value)) => Some(Header { name, value }),
            _ => None,
        })
        .collect();

    Ok(MessageDetail { id, headers })
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        let request = self
            .hub
            .users()
            .labels_list(USER_ID)
            .add_scope(FULL_ACCESS_SCOPE)
            .doit();
        let (_, response) = self.call("labels.list", request).await?;

        let labels: Vec<Label> = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| match (label.id, label.name) {
                (Some(id), Some(name)) => Some(Label { id, name }),
                _ => None,
            })
            .collect();

        debug!("Successfully parsed {} labels", labels.len());
        Ok(labels)
    }

    async fn get_label_info(&self, label_id: &str) -> Result<LabelInfo> {
        let request = self
            .hub
            .users()
            .labels_get(USER_ID, label_id)
            .add_scope(FULL_ACCESS_SCOPE)
            .doit();
        let (_, label) = self.call("labels.get", request).await?;

        Ok(LabelInfo {
            id: label.id.unwrap_or_else(|| label_id.to_string()),
            messages_total: label.messages_total.unwrap_or(0).max(0) as u64,
        })
    }

    async fn list_messages_page(
        &self,
        label_ids: &[String],
        page_size: u32,
        cursor: &PageCursor,
    ) -> Result<MessagePage> {
        if cursor.is_exhausted() {
            return Ok(MessagePage::default());
        }

        let mut request = self
            .hub
            .users()
            .messages_list(USER_ID)
            .max_results(page_size);
        for label_id in label_ids {
            request = request.add_label_ids(label_id);
        }
        if let Some(token) = cursor.token() {
            request = request.page_token(token);
        }

        let (_, response) = self
            .call("messages.list", request.add_scope(FULL_ACCESS_SCOPE).doit())
            .await?;

        let messages = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id.map(|id| MessageSummary { id }))
            .collect();

        Ok(MessagePage {
            messages,
            next_page_token: response.next_page_token,
        })
    }

    async fn get_message(&self, id: &str) -> Result<MessageDetail> {
        let mut request = self
            .hub
            .users()
            .messages_get(USER_ID, id)
            .format("metadata");
        for header in EXPORT_HEADERS {
            request = request.add_metadata_headers(header);
        }

        let (_, msg) = self
            .call("messages.get", request.add_scope(FULL_ACCESS_SCOPE).doit())
            .await?;
        parse_message_detail(msg)
    }

    async fn batch_delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let body = BatchDeleteMessagesRequest {
            ids: Some(ids.to_vec()),
        };
        let request = self
            .hub
            .users()
            .messages_batch_delete(body, USER_ID)
            .add_scope(FULL_ACCESS_SCOPE)
            .doit();
        self.call("messages.batchDelete", request).await?;

        debug!("Deleted {} messages", ids.len());
        Ok(())
    }
}
