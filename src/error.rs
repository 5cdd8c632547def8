//! Error types for audit-pipeline

use thiserror::Error;

/// Errors that can occur in the audit pipeline
#[derive(Debug, Error)]
pub enum AuditError {
    /// Invalid or missing configuration at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single persist call to the sink failed
    #[error("Sink error: {0}")]
    Sink(String),

    /// A flush exhausted its retry budget and the batch was dropped
    #[error("Failed to persist batch after {attempts} attempts: {reason}")]
    Persist {
        attempts: u32,
        reason: String,
    },

    /// Metadata could not be traversed for redaction
    #[error("Sanitization error: {0}")]
    Sanitize(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation attempted after the pipeline was shut down
    #[error("Pipeline is shut down")]
    Closed,
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
