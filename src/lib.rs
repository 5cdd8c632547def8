//! # audit-pipeline
//!
//! Asynchronous batching audit-log pipeline with pluggable storage sinks.
//!
//! ## Overview
//!
//! `audit-pipeline` records discrete audit events without blocking the
//! caller on storage latency. Events are sanitized, buffered in memory,
//! and flushed in batches — when the batch size is reached or on a
//! timer — to any `AuditSink` backend (in-memory, JSON-lines file,
//! relational table, remote service). Failed flushes retry with
//! monotonic backoff; exhausted batches are dropped and reported to a
//! `FailureHandler` rather than ever degrading the caller's path.
//!
//! ## Quick Start
//!
//! ```rust
//! use audit_pipeline::{AuditConfig, AuditEvent, AuditLevel, AuditPipeline, MemorySink};
//!
//! # async fn example() -> audit_pipeline::Result<()> {
//! let sink = MemorySink::default();
//! let pipeline = AuditPipeline::new(AuditConfig::default(), sink.clone())?;
//!
//! // Fire-and-forget; never blocks on the sink
//! pipeline
//!     .record(
//!         AuditEvent::new("note.delete", AuditLevel::High)
//!             .with_actor("usr-1")
//!             .with_target("note:42")
//!             .with_metadata("ip", serde_json::json!("10.0.0.1")),
//!     )
//!     .await;
//!
//! // Explicit drain, e.g. at shutdown
//! pipeline.flush().await?;
//! pipeline.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Sinks
//!
//! - **memory** — In-memory sink for testing and single-process use
//! - **file** — Append-only JSON-lines file
//!
//! ## Architecture
//!
//! - **AuditSink** trait — core abstraction all backends implement
//! - **AuditPipeline** — buffer, flush triggers, retry, shutdown
//! - **FailureHandler** trait — host-facing channel for dropped batches
//! - **AuditEvent** — sink-agnostic event record

pub mod config;
pub mod error;
pub mod failure;
pub mod pipeline;
pub mod sanitize;
pub mod sink;
pub mod types;

// Re-export core types
pub use config::{AuditConfig, BackoffPolicy, SanitizeConfig};
pub use error::{AuditError, Result};
pub use failure::{FailedBatch, FailureHandler, LogFailureHandler, MemoryFailureHandler};
pub use pipeline::AuditPipeline;
pub use sink::AuditSink;
pub use types::{AuditEvent, AuditLevel};

// Re-export sinks for convenience
pub use sink::file::FileSink;
pub use sink::memory::MemorySink;
