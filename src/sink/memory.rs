//! In-memory audit sink for testing and single-process use

use crate::error::Result;
use crate::sink::AuditSink;
use crate::types::AuditEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory sink backed by a capacity-bounded `Vec`
///
/// Clones share storage, so a handle kept by the host remains readable
/// after the sink is moved into a pipeline.
pub struct MemorySink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
    max_events: usize,
}

impl MemorySink {
    /// Create a new memory sink retaining at most `max_events` events
    ///
    /// `max_events == 0` means unbounded.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            max_events,
        }
    }

    /// Get all persisted events, oldest first
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    /// Number of persisted events
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether no events have been persisted
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Clear all persisted events
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl Clone for MemorySink {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            max_events: self.max_events,
        }
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn persist(&self, events: &[AuditEvent]) -> Result<()> {
        let mut stored = self.events.write().await;
        stored.extend_from_slice(events);

        // Enforce max capacity, oldest first
        if self.max_events > 0 && stored.len() > self.max_events {
            let drain_count = stored.len() - self.max_events;
            stored.drain(..drain_count);
        }

        tracing::debug!(count = events.len(), "Batch persisted to memory sink");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuditLevel;

    fn test_events(n: usize) -> Vec<AuditEvent> {
        (0..n)
            .map(|i| AuditEvent::new(format!("action.{}", i), AuditLevel::Medium))
            .collect()
    }

    #[tokio::test]
    async fn test_persist_preserves_order() {
        let sink = MemorySink::default();
        sink.persist(&test_events(3)).await.unwrap();

        let stored = sink.events().await;
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].action, "action.0");
        assert_eq!(stored[2].action, "action.2");
    }

    #[tokio::test]
    async fn test_clone_shares_storage() {
        let sink = MemorySink::default();
        let handle = sink.clone();

        sink.persist(&test_events(2)).await.unwrap();
        assert_eq!(handle.len().await, 2);
    }

    #[tokio::test]
    async fn test_max_capacity_drops_oldest() {
        let sink = MemorySink::new(3);
        sink.persist(&test_events(5)).await.unwrap();

        let stored = sink.events().await;
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].action, "action.2");
        assert_eq!(stored[2].action, "action.4");
    }

    #[tokio::test]
    async fn test_clear() {
        let sink = MemorySink::default();
        sink.persist(&test_events(2)).await.unwrap();
        sink.clear().await;
        assert!(sink.is_empty().await);
    }
}
