//! Audit sink trait — the core abstraction for storage backends
//!
//! All storage backends (relational table, log file, remote service,
//! in-memory) implement `AuditSink` to provide a uniform API for batch
//! persistence. The `AuditPipeline` uses a sink to perform all writes.

use crate::error::Result;
use crate::types::AuditEvent;
use async_trait::async_trait;

pub mod file;
pub mod memory;

/// Core trait for audit storage backends
///
/// Implementations own the concrete storage format (SQL schema, file
/// layout, HTTP payload). A failed `persist` is retried by the pipeline
/// with the same batch contents, so implementations should be safe to
/// call repeatedly with identical input.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist a batch of events, in order
    ///
    /// Either the whole batch is accepted or an error is returned;
    /// partial writes are treated as failure by the pipeline.
    async fn persist(&self, events: &[AuditEvent]) -> Result<()>;

    /// Sink name (e.g., "memory", "file", "postgres")
    fn name(&self) -> &str;
}
