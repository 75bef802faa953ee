use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GmailError, Result};

/// Gmail caps `messages.list` maxResults at 500
const MAX_FETCH_BATCH_SIZE: u32 = 500;

/// Gmail caps `messages.batchDelete` at 1000 ids
const MAX_DELETE_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub delete: DeleteConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: default_fetch_batch_size(),
            page_delay_ms: default_page_delay_ms(),
            message_delay_ms: default_message_delay_ms(),
            output_dir: default_output_dir(),
        }
    }
}

impl ExportConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConfig {
    #[serde(default = "default_delete_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_queue_dir")]
    pub queue_dir: PathBuf,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            batch_size: default_delete_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            queue_dir: default_queue_dir(),
        }
    }
}

impl DeleteConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_bar_length")]
    pub bar_length: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            bar_length: default_bar_length(),
        }
    }
}

fn default_fetch_batch_size() -> u32 {
    50
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_message_delay_ms() -> u64 {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("files/get-emails")
}

fn default_delete_batch_size() -> usize {
    25
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_queue_dir() -> PathBuf {
    PathBuf::from("files/to-delete")
}

fn default_bar_length() -> usize {
    crate::progress::DEFAULT_BAR_LENGTH
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GmailError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                GmailError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GmailError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.export.fetch_batch_size == 0 {
            return Err(GmailError::ConfigError(
                "export.fetch_batch_size must be at least 1".to_string(),
            ));
        }
        if self.export.fetch_batch_size > MAX_FETCH_BATCH_SIZE {
            return Err(GmailError::ConfigError(format!(
                "export.fetch_batch_size cannot exceed {} (Gmail messages.list limit)",
                MAX_FETCH_BATCH_SIZE
            )));
        }
        if self.export.output_dir.as_os_str().is_empty() {
            return Err(GmailError::ConfigError(
                "export.output_dir cannot be empty".to_string(),
            ));
        }

        if self.delete.batch_size == 0 {
            return Err(GmailError::ConfigError(
                "delete.batch_size must be at least 1".to_string(),
            ));
        }
        if self.delete.batch_size > MAX_DELETE_BATCH_SIZE {
            return Err(GmailError::ConfigError(format!(
                "delete.batch_size cannot exceed {} (Gmail batchDelete limit)",
                MAX_DELETE_BATCH_SIZE
            )));
        }
        if self.delete.queue_dir.as_os_str().is_empty() {
            return Err(GmailError::ConfigError(
                "delete.queue_dir cannot be empty".to_string(),
            ));
        }

        if self.progress.bar_length == 0 {
            return Err(GmailError::ConfigError(
                "progress.bar_length must be at least 1".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
