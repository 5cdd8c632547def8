//! Core types for the audit pipeline
//!
//! All types use camelCase JSON serialization for wire compatibility.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Severity of an audit event
///
/// Ordered: `Low < Medium < High < Critical`. The pipeline discards
/// events below the configured minimum level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    /// Routine activity (reads, listings)
    #[default]
    Low,
    /// Normal mutations (create, update)
    Medium,
    /// Sensitive mutations (delete, permission change)
    High,
    /// Security-relevant actions (auth failures, key rotation)
    Critical,
}

/// One recorded occurrence of a sensitive or notable action
///
/// Events are immutable after creation. The pipeline owns a buffered
/// event until it is persisted by a sink or dropped after retry
/// exhaustion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Unique event identifier (aud-<uuid>)
    pub id: String,

    /// Instant the event occurred
    #[serde(default = "epoch")]
    pub timestamp: DateTime<Utc>,

    /// Principal that caused the event; `None` for system-initiated events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    /// Short symbolic name of what happened (e.g., "user.update", "note.delete")
    pub action: String,

    /// Identifier of the entity acted upon (e.g., "note:42")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resource: Option<String>,

    /// Severity tag
    #[serde(default)]
    pub level: AuditLevel,

    /// Event-specific detail; subject to sanitization
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Sentinel for events deserialized without a timestamp; the pipeline
/// assigns the current time when it buffers such an event.
pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}

impl AuditEvent {
    /// Create a new event with auto-generated id and timestamp
    pub fn new(action: impl Into<String>, level: AuditLevel) -> Self {
        Self {
            id: format!("aud-{}", uuid::Uuid::new_v4()),
            timestamp: Utc::now(),
            actor_id: None,
            action: action.into(),
            target_resource: None,
            level,
            metadata: HashMap::new(),
        }
    }

    /// Set the acting principal
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Set the target resource
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_resource = Some(target.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the generation timestamp is still the epoch sentinel
    pub(crate) fn timestamp_unset(&self) -> bool {
        self.timestamp == epoch()
    }
}
