//! A handset connected to the relay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;
use crate::payload::ShapeError;
use crate::time::{Timestamp, parse_timestamp};

/// A phone as reported by `GET /phones`.
///
/// Ephemeral: the whole list is replaced on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Phone {
    pub id: String,
    pub online: bool,
    pub ip: Option<String>,
    pub version: Option<String>,
    /// Raw connection timestamp, kept verbatim for display fallbacks.
    pub since: Option<String>,
}

impl Phone {
    /// Create an online phone with only an id set.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            online: true,
            ip: None,
            version: None,
            since: None,
        }
    }

    /// Parsed connection timestamp, when the relay sent a readable one.
    #[must_use]
    pub fn since_timestamp(&self) -> Option<Timestamp> {
        self.since.as_deref().and_then(parse_timestamp)
    }
}

impl TryFrom<Value> for Phone {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ShapeError::NotAnObject);
        };
        Ok(Self {
            id: lenient::string(map.get("id")).unwrap_or_default(),
            online: lenient::flag(map.get("online")),
            ip: lenient::string(map.get("ip")).filter(|s| !s.is_empty()),
            version: lenient::string(map.get("version")).filter(|s| !s.is_empty()),
            since: lenient::string(map.get("since")).filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_numeric_id() {
        let phone: Phone = serde_json::from_value(json!({
            "id": 3,
            "online": true,
            "ip": "10.0.0.3",
            "version": "1.4.2"
        }))
        .unwrap();
        assert_eq!(phone.id, "3");
        assert!(phone.online);
        assert_eq!(phone.ip.as_deref(), Some("10.0.0.3"));
        assert_eq!(phone.version.as_deref(), Some("1.4.2"));
        assert!(phone.since.is_none());
    }

    #[test]
    fn should_default_missing_fields() {
        let phone: Phone = serde_json::from_value(json!({})).unwrap();
        assert_eq!(phone.id, "");
        assert!(!phone.online);
        assert!(phone.ip.is_none());
    }

    #[test]
    fn should_reject_non_object() {
        let result: Result<Phone, _> = serde_json::from_value(json!("phone"));
        assert!(result.is_err());
    }

    #[test]
    fn should_parse_since_timestamp() {
        let mut phone = Phone::new("1");
        phone.since = Some("2024-05-01T12:00:00Z".to_string());
        assert!(phone.since_timestamp().is_some());
        phone.since = Some("not a date".to_string());
        assert!(phone.since_timestamp().is_none());
    }
}
