//! Feedback sinks.
//!
//! A sink receives each [`Feedback`] record once. Delivery is best-effort:
//! failures are reported to the caller and never retried.

use std::path::{Path, PathBuf};
use std::time::Duration;

use adkar_core::types::Feedback;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::ChatError;
use crate::remote::http_client;

/// Destination for feedback records.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    fn name(&self) -> &str;

    async fn submit(&self, feedback: &Feedback) -> Result<(), ChatError>;
}

// =============================================================================
// HttpFeedbackSink
// =============================================================================

/// POSTs the feedback JSON to an endpoint. Any non-2xx status, and a
/// request that outlives the timeout, is a failure.
#[derive(Clone)]
pub struct HttpFeedbackSink {
    client: Client,
    endpoint: String,
}

impl HttpFeedbackSink {
    /// `None` disables the request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ChatError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FeedbackSink for HttpFeedbackSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, feedback: &Feedback) -> Result<(), ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(feedback)
            .send()
            .await
            .map_err(|e| ChatError::Sink(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Sink(format!("endpoint returned {}", status)));
        }
        Ok(())
    }
}

// =============================================================================
// JsonFileSink
// =============================================================================

/// Keeps a pretty-printed JSON array of feedback entries on disk.
///
/// Each entry is the feedback record plus a local `timestamp`. A missing or
/// unreadable file starts a fresh array. Feedback identical to an entry
/// already in the file is not written twice.
pub struct JsonFileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Vec<Value> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Feedback log unreadable; starting fresh"
                );
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Value>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Feedback log is not a JSON array; starting fresh"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FeedbackSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn submit(&self, feedback: &Feedback) -> Result<(), ChatError> {
        let _guard = self.write_lock.lock().await;

        let record =
            serde_json::to_value(feedback).map_err(|e| ChatError::Sink(e.to_string()))?;
        let mut entries = self.read_entries().await;

        let duplicate = entries.iter().any(|entry| without_timestamp(entry) == record);
        if duplicate {
            tracing::debug!(message_id = %feedback.message_id, "Duplicate feedback skipped");
            return Ok(());
        }

        let mut entry = record;
        if let Value::Object(ref mut map) = entry {
            map.insert(
                "timestamp".to_string(),
                Value::String(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            );
        }
        entries.push(entry);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ChatError::Sink(format!("{}: {}", parent.display(), e)))?;
        }
        let content =
            serde_json::to_string_pretty(&entries).map_err(|e| ChatError::Sink(e.to_string()))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| ChatError::Sink(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

fn without_timestamp(entry: &Value) -> Value {
    let mut entry = entry.clone();
    if let Value::Object(ref mut map) = entry {
        map.remove("timestamp");
    }
    entry
}

// =============================================================================
// LogSink
// =============================================================================

/// Emits feedback as a structured log event. Used when nothing else is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl FeedbackSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn submit(&self, feedback: &Feedback) -> Result<(), ChatError> {
        tracing::info!(
            message_id = %feedback.message_id,
            rating = feedback.rating,
            categories = ?feedback.categories,
            comment = %feedback.comment,
            "Feedback received"
        );
        Ok(())
    }
}
