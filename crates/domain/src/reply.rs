//! Interpretation of action replies (`/rotate`, `/restart`, `/auth/*/set`).
//!
//! The relay signals success in more than one way: `{"ok": true}`,
//! `{"status": "restarted"}`, or a bare 2xx with an empty object.

use serde_json::Value;

use crate::lenient;

/// A decoded action reply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionReply {
    pub ok: bool,
    pub status: Option<String>,
    /// Items the relay reports as changed (rotation only).
    pub changed: Vec<Value>,
    pub error: Option<String>,
}

impl ActionReply {
    /// Decode a reply body. Non-object bodies decode to an unsuccessful reply.
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        let Value::Object(map) = body else {
            return Self::default();
        };
        Self {
            ok: lenient::flag(map.get("ok")),
            status: lenient::string(map.get("status")),
            changed: match map.get("changed") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            },
            error: lenient::string(map.get("error")).filter(|s| !s.is_empty()),
        }
    }

    /// Whether the relay reported success in any accepted shape.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.ok || self.status.as_deref() == Some("restarted")
    }

    /// Number of phones whose IP changed.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    /// The relay's error message, or `fallback` when none was sent.
    #[must_use]
    pub fn error_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.error.as_deref().unwrap_or(fallback)
    }
}
