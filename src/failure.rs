//! Dropped-batch reporting — handle batches that exhaust the retry budget
//!
//! Provides a `FailureHandler` trait for surfacing dropped batches to the
//! host application. The pipeline never re-buffers a failed batch, so this
//! is the host's only channel for observing audit-log loss.

use crate::error::Result;
use crate::types::AuditEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A batch dropped after retry exhaustion, with context about the failure
#[derive(Debug, Clone)]
pub struct FailedBatch {
    /// The events that could not be persisted
    pub events: Vec<AuditEvent>,

    /// Reason the final persist attempt failed
    pub reason: String,

    /// Instant the batch was dropped
    pub failed_at: DateTime<Utc>,
}

impl FailedBatch {
    /// Create a new failed batch record
    pub fn new(events: Vec<AuditEvent>, reason: impl Into<String>) -> Self {
        Self {
            events,
            reason: reason.into(),
            failed_at: Utc::now(),
        }
    }
}

/// Trait for dropped-batch handlers
///
/// Implementations decide what to do with batches the pipeline gave up
/// on. They may log, store, forward, or alert — but they must not feed
/// events back into the pipeline.
#[async_trait]
pub trait FailureHandler: Send + Sync {
    /// Handle a dropped batch
    async fn handle(&self, batch: FailedBatch) -> Result<()>;

    /// Number of batches dropped so far
    async fn count(&self) -> Result<usize>;

    /// List recent dropped batches, most recent first
    async fn list(&self, limit: usize) -> Result<Vec<FailedBatch>>;
}

/// Default handler — logs the drop and retains nothing
pub struct LogFailureHandler;

#[async_trait]
impl FailureHandler for LogFailureHandler {
    async fn handle(&self, batch: FailedBatch) -> Result<()> {
        tracing::error!(
            events = batch.events.len(),
            reason = %batch.reason,
            "Audit batch dropped after retry exhaustion"
        );
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(0)
    }

    async fn list(&self, _limit: usize) -> Result<Vec<FailedBatch>> {
        Ok(Vec::new())
    }
}

/// In-memory failure handler for development and testing
///
/// Stores dropped batches in a `Vec` with configurable max capacity.
pub struct MemoryFailureHandler {
    batches: Arc<RwLock<Vec<FailedBatch>>>,
    max_batches: usize,
}

impl MemoryFailureHandler {
    /// Create a new in-memory failure handler
    pub fn new(max_batches: usize) -> Self {
        Self {
            batches: Arc::new(RwLock::new(Vec::new())),
            max_batches,
        }
    }
}

impl Default for MemoryFailureHandler {
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl Clone for MemoryFailureHandler {
    fn clone(&self) -> Self {
        Self {
            batches: Arc::clone(&self.batches),
            max_batches: self.max_batches,
        }
    }
}

#[async_trait]
impl FailureHandler for MemoryFailureHandler {
    async fn handle(&self, batch: FailedBatch) -> Result<()> {
        tracing::warn!(
            events = batch.events.len(),
            reason = %batch.reason,
            "Audit batch dropped"
        );

        let mut batches = self.batches.write().await;
        batches.push(batch);

        // Enforce max capacity
        if self.max_batches > 0 && batches.len() > self.max_batches {
            let drain_count = batches.len() - self.max_batches;
            batches.drain(..drain_count);
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let batches = self.batches.read().await;
        Ok(batches.len())
    }

    async fn list(&self, limit: usize) -> Result<Vec<FailedBatch>> {
        let batches = self.batches.read().await;
        let result: Vec<FailedBatch> = batches.iter().rev().take(limit).cloned().collect();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuditLevel;

    fn test_batch(reason: &str) -> FailedBatch {
        FailedBatch::new(
            vec![AuditEvent::new("user.update", AuditLevel::Medium)],
            reason,
        )
    }

    #[test]
    fn test_failed_batch_creation() {
        let batch = test_batch("sink unreachable");
        assert_eq!(batch.reason, "sink unreachable");
        assert_eq!(batch.events.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_handler_handle_and_count() {
        let handler = MemoryFailureHandler::default();
        assert_eq!(handler.count().await.unwrap(), 0);

        handler.handle(test_batch("failed")).await.unwrap();
        assert_eq!(handler.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_handler_list_recent_first() {
        let handler = MemoryFailureHandler::default();
        for i in 0..5 {
            handler.handle(test_batch(&format!("reason {}", i))).await.unwrap();
        }

        let list = handler.list(3).await.unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].reason, "reason 4");
        assert_eq!(list[2].reason, "reason 2");
    }

    #[tokio::test]
    async fn test_memory_handler_max_capacity() {
        let handler = MemoryFailureHandler::new(3);
        for i in 0..5 {
            handler.handle(test_batch(&format!("reason {}", i))).await.unwrap();
        }

        assert_eq!(handler.count().await.unwrap(), 3);
        let list = handler.list(10).await.unwrap();
        // Oldest batches drained
        assert_eq!(list[0].reason, "reason 4");
        assert_eq!(list[2].reason, "reason 2");
    }

    #[tokio::test]
    async fn test_log_handler_retains_nothing() {
        let handler = LogFailureHandler;
        handler.handle(test_batch("failed")).await.unwrap();
        assert_eq!(handler.count().await.unwrap(), 0);
        assert!(handler.list(10).await.unwrap().is_empty());
    }
}
