//! Pipeline configuration
//!
//! All settings are read once at construction; there is no hot-reload
//! contract. Hosts typically deserialize `AuditConfig` from their own
//! environment-driven config layer.

use crate::error::{AuditError, Result};
use crate::types::AuditLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound applied to any computed retry delay
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Retry delay curve between failed persist attempts
///
/// Both variants produce monotonic non-decreasing delays, so a
/// struggling sink is never hit faster on later attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum BackoffPolicy {
    /// Same delay before every attempt
    #[default]
    Fixed,
    /// Delay multiplied by `factor` after each failed attempt
    Exponential { factor: u32 },
}

impl BackoffPolicy {
    /// Delay to sleep after the given zero-based failed attempt,
    /// capped at 60s
    pub fn delay_for(&self, base: Duration, attempt: u32) -> Duration {
        let delay = match self {
            BackoffPolicy::Fixed => base,
            BackoffPolicy::Exponential { factor } => {
                let scale = factor.saturating_pow(attempt);
                base.saturating_mul(scale)
            }
        };
        delay.min(MAX_RETRY_DELAY)
    }
}

/// Metadata redaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeConfig {
    /// Master switch for redaction
    pub enabled: bool,

    /// Metadata keys whose values are replaced
    #[serde(default)]
    pub fields: Vec<String>,

    /// Substitute value written in place of a redacted field
    #[serde(default = "default_replacement")]
    pub replacement: String,
}

fn default_replacement() -> String {
    "[REDACTED]".to_string()
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fields: vec![
                "password".to_string(),
                "token".to_string(),
                "secret".to_string(),
            ],
            replacement: default_replacement(),
        }
    }
}

/// Process-wide audit pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Master switch; when false, every `record` call is a no-op
    pub enabled: bool,

    /// Minimum severity recorded; lower-level events are discarded
    #[serde(default)]
    pub level: AuditLevel,

    /// Buffered-event count that triggers an immediate flush
    pub batch_size: usize,

    /// Maximum time a buffered event waits before a timer-triggered flush
    pub flush_interval_ms: u64,

    /// Retry attempts after the initial failed persist
    pub max_retries: u32,

    /// Base delay between retry attempts
    pub retry_delay_ms: u64,

    /// Retry delay curve
    #[serde(default)]
    pub backoff: BackoffPolicy,

    /// Redaction settings
    #[serde(default)]
    pub sanitize: SanitizeConfig,

    /// Static context (environment, service, version) merged into every
    /// event; call-site metadata wins on key collision
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: AuditLevel::Low,
            batch_size: 50,
            flush_interval_ms: 5_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
            backoff: BackoffPolicy::default(),
            sanitize: SanitizeConfig::default(),
            metadata: HashMap::new(),
        }
    }
}

impl AuditConfig {
    /// Validate construction-time invariants
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(AuditError::Config(
                "batchSize must be at least 1".to_string(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(AuditError::Config(
                "flushIntervalMs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Timer period as a `Duration`
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Base retry delay as a `Duration`
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AuditConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enabled);
        assert_eq!(config.level, AuditLevel::Low);
        assert_eq!(config.batch_size, 50);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = AuditConfig {
            batch_size: 0,
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::Config(_))));
    }

    #[test]
    fn test_zero_flush_interval_rejected() {
        let config = AuditConfig {
            flush_interval_ms: 0,
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::Config(_))));
    }

    #[test]
    fn test_fixed_backoff_constant() {
        let base = Duration::from_millis(100);
        let policy = BackoffPolicy::Fixed;
        assert_eq!(policy.delay_for(base, 0), base);
        assert_eq!(policy.delay_for(base, 5), base);
    }

    #[test]
    fn test_exponential_backoff_monotonic() {
        let base = Duration::from_millis(100);
        let policy = BackoffPolicy::Exponential { factor: 2 };

        let mut prev = Duration::ZERO;
        for attempt in 0..10 {
            let delay = policy.delay_for(base, attempt);
            assert!(delay >= prev, "delay decreased at attempt {}", attempt);
            prev = delay;
        }

        assert_eq!(policy.delay_for(base, 0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(base, 1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(base, 2), Duration::from_millis(400));
    }

    #[test]
    fn test_exponential_backoff_capped() {
        let policy = BackoffPolicy::Exponential { factor: 10 };
        let delay = policy.delay_for(Duration::from_secs(5), 20);
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn test_config_serialization() {
        let config = AuditConfig {
            level: AuditLevel::Medium,
            backoff: BackoffPolicy::Exponential { factor: 2 },
            ..AuditConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"batchSize\":50"));
        assert!(json.contains("\"flushIntervalMs\":5000"));
        assert!(json.contains("\"level\":\"medium\""));

        let parsed: AuditConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.level, AuditLevel::Medium);
        assert_eq!(parsed.backoff, BackoffPolicy::Exponential { factor: 2 });
    }

    #[test]
    fn test_config_defaults_on_missing_fields() {
        let json = r#"{
            "enabled": true,
            "batchSize": 10,
            "flushIntervalMs": 1000,
            "maxRetries": 2,
            "retryDelayMs": 50
        }"#;

        let config: AuditConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.level, AuditLevel::Low);
        assert_eq!(config.backoff, BackoffPolicy::Fixed);
        assert!(config.sanitize.enabled);
        assert_eq!(config.sanitize.replacement, "[REDACTED]");
    }

    #[test]
    fn test_sanitize_default_fields() {
        let sanitize = SanitizeConfig::default();
        assert!(sanitize.fields.contains(&"password".to_string()));
        assert!(sanitize.fields.contains(&"token".to_string()));
    }
}
