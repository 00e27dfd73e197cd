//! A proxied client session flowing through the relay.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;
use crate::payload::ShapeError;
use crate::time::{Timestamp, parse_timestamp};

/// Protocol label used when the relay does not report one.
pub const UNKNOWN_PROTO: &str = "UNKNOWN";

/// An active client connection as reported by `GET /clients`.
///
/// Ephemeral: the whole list is replaced on every poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ClientConnection {
    pub stream: Option<String>,
    pub phone: Option<String>,
    pub ip: Option<String>,
    pub proto: Option<String>,
    pub port: Option<u16>,
    /// Raw connection timestamp, kept verbatim for display fallbacks.
    pub since: Option<String>,
    pub bytes_up: u64,
    pub bytes_down: u64,
    /// Instantaneous upload rate in bytes per second.
    pub rate_up: Option<f64>,
    /// Instantaneous download rate in bytes per second.
    pub rate_down: Option<f64>,
}

impl ClientConnection {
    /// Parsed connection timestamp, when the relay sent a readable one.
    #[must_use]
    pub fn since_timestamp(&self) -> Option<Timestamp> {
        self.since.as_deref().and_then(parse_timestamp)
    }

    /// `"{proto} :{port}"`, or the protocol alone when no port is known.
    #[must_use]
    pub fn proto_port(&self) -> String {
        let proto = self.proto.as_deref().unwrap_or(UNKNOWN_PROTO);
        match self.port {
            Some(port) => format!("{proto} :{port}"),
            None => proto.to_string(),
        }
    }

    /// Upload rate contribution to aggregates (absent counts as zero).
    #[must_use]
    pub fn upload_rate(&self) -> f64 {
        self.rate_up.unwrap_or(0.0)
    }

    /// Download rate contribution to aggregates (absent counts as zero).
    #[must_use]
    pub fn download_rate(&self) -> f64 {
        self.rate_down.unwrap_or(0.0)
    }
}

/// First key in `keys` holding a usable (non-null) value.
fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

impl TryFrom<Value> for ClientConnection {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ShapeError::NotAnObject);
        };
        Ok(Self {
            stream: lenient::string(map.get("stream")),
            phone: lenient::string(map.get("phone")),
            ip: lenient::string(map.get("ip")),
            proto: lenient::string(first(&map, &["proto", "kind", "type"]))
                .filter(|s| !s.is_empty()),
            port: lenient::port(first(&map, &["port", "listen_port"])),
            since: lenient::string(map.get("since")).filter(|s| !s.is_empty()),
            bytes_up: lenient::counter(map.get("bytes_up")),
            bytes_down: lenient::counter(map.get("bytes_down")),
            rate_up: lenient::float(first(&map, &["bytes_up_rate", "rate_up"])),
            rate_down: lenient::float(first(&map, &["bytes_down_rate", "rate_down"])),
        })
    }
}
