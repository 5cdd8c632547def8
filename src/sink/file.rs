//! File-based audit sink
//!
//! Appends each event as one JSON line. The file handle is opened once
//! at construction and shared behind a lock; each persisted batch is
//! flushed to the OS before returning.

use crate::error::{AuditError, Result};
use crate::sink::AuditSink;
use crate::types::AuditEvent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only JSON-lines sink
pub struct FileSink {
    file: Mutex<File>,
    path: PathBuf,
}

impl FileSink {
    /// Open (or create) the audit log file at the given path
    ///
    /// Parent directories are created if missing.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AuditError::Sink(format!(
                    "Failed to create audit log directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                AuditError::Sink(format!(
                    "Failed to open audit log file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for FileSink {
    async fn persist(&self, events: &[AuditEvent]) -> Result<()> {
        let mut lines = String::new();
        for event in events {
            lines.push_str(&serde_json::to_string(event)?);
            lines.push('\n');
        }

        let mut file = self.file.lock().await;
        file.write_all(lines.as_bytes()).await.map_err(|e| {
            AuditError::Sink(format!(
                "Failed to write audit log file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        file.flush().await.map_err(|e| {
            AuditError::Sink(format!(
                "Failed to flush audit log file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            count = events.len(),
            path = %self.path.display(),
            "Batch persisted to file sink"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
