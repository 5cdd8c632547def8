//! Metadata redaction
//!
//! Replaces the values of configured sensitive keys before an event is
//! buffered. Redaction is deep: configured keys are matched at every
//! level of nested objects, including objects inside arrays.

use crate::config::SanitizeConfig;
use crate::error::AuditError;
use serde_json::Value;
use std::collections::HashMap;

/// Nesting bound for redaction traversal. Subtrees deeper than this are
/// left untouched and a warning is logged rather than dropping the event.
const MAX_DEPTH: usize = 32;

/// Redact configured fields in an event's metadata, in place
///
/// No-op when `config.enabled` is false or no fields are configured.
pub fn sanitize_metadata(config: &SanitizeConfig, metadata: &mut HashMap<String, Value>) {
    if !config.enabled || config.fields.is_empty() {
        return;
    }

    let mut truncated = false;
    for (key, value) in metadata.iter_mut() {
        if is_sensitive(config, key) {
            *value = Value::String(config.replacement.clone());
        } else {
            sanitize_value(config, value, 1, &mut truncated);
        }
    }

    // Policy: malformed (too deep) metadata is logged and passed through
    // unredacted rather than dropping the event
    if truncated {
        let error = AuditError::Sanitize(format!(
            "metadata nesting exceeds {} levels, subtree passed through unredacted",
            MAX_DEPTH
        ));
        tracing::warn!(error = %error, "Sanitization incomplete");
    }
}

fn is_sensitive(config: &SanitizeConfig, key: &str) -> bool {
    config.fields.iter().any(|f| f.as_str() == key)
}

fn sanitize_value(config: &SanitizeConfig, value: &mut Value, depth: usize, truncated: &mut bool) {
    if depth > MAX_DEPTH {
        *truncated = true;
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_sensitive(config, key) {
                    *nested = Value::String(config.replacement.clone());
                } else {
                    sanitize_value(config, nested, depth + 1, truncated);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_value(config, item, depth + 1, truncated);
            }
        }
        _ => {}
    }
}
