//! Redaction of sensitive fields before payloads reach the logs.

use serde_json::Value;

const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a field as sensitive (compared lowercase).
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "auth",
    "jwt",
    "apikey",
    "api_key",
];

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|fragment| key.contains(fragment))
}

/// Replace the value of every sensitive key with `"[REDACTED]"`.
///
/// Walks nested objects and arrays. Scalars are returned unchanged.
pub fn sanitize_for_logging(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| {
                    if is_sensitive(&key) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, sanitize_for_logging(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_for_logging).collect()),
        other => other,
    }
}

/// Serialize and sanitize any value for a log field.
pub fn sanitized<T: serde::Serialize>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(v) => sanitize_for_logging(v),
        Err(_) => Value::String(REDACTED.to_string()),
    }
}
