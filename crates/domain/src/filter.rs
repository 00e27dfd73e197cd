//! Client filter: three independent substring predicates.

use serde::{Deserialize, Serialize};

use crate::client::ClientConnection;

/// Which field of a [`ClientConnection`] a filter value targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Ip,
    Phone,
    Stream,
}

/// Substring filters applied to the cached client list.
///
/// Values are stored trimmed. An empty value imposes no constraint.
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientFilter {
    ip: String,
    phone: String,
    stream: String,
}

impl ClientFilter {
    /// Build a filter from raw input values.
    #[must_use]
    pub fn new(ip: &str, phone: &str, stream: &str) -> Self {
        Self {
            ip: ip.trim().to_string(),
            phone: phone.trim().to_string(),
            stream: stream.trim().to_string(),
        }
    }

    /// Replace one predicate, keeping the others.
    pub fn set(&mut self, field: FilterField, value: &str) {
        let value = value.trim().to_string();
        match field {
            FilterField::Ip => self.ip = value,
            FilterField::Phone => self.phone = value,
            FilterField::Stream => self.stream = value,
        }
    }

    /// Current value of one predicate.
    #[must_use]
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Ip => &self.ip,
            FilterField::Phone => &self.phone,
            FilterField::Stream => &self.stream,
        }
    }

    /// Clear every predicate.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ip.is_empty() && self.phone.is_empty() && self.stream.is_empty()
    }

    /// Whether `client` passes every active predicate.
    #[must_use]
    pub fn matches(&self, client: &ClientConnection) -> bool {
        contains(client.ip.as_deref(), &self.ip)
            && contains(client.phone.as_deref(), &self.phone)
            && contains(client.stream.as_deref(), &self.stream)
    }

    /// Filter `clients`, preserving their order.
    pub fn apply<'a>(
        &'a self,
        clients: &'a [ClientConnection],
    ) -> impl Iterator<Item = &'a ClientConnection> + 'a {
        clients.iter().filter(move |client| self.matches(client))
    }

    /// Human-readable description of the active predicates.
    ///
    /// Parts appear in the order phone, IP, stream.
    #[must_use]
    pub fn describe(&self) -> String {
        let parts: Vec<String> = [
            ("Телефон", &self.phone),
            ("IP", &self.ip),
            ("Stream", &self.stream),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}={value}"))
        .collect();

        if parts.is_empty() {
            "Фильтр: нет".to_string()
        } else {
            format!("Фильтр: {}", parts.join(" · "))
        }
    }
}

fn contains(field: Option<&str>, needle: &str) -> bool {
    needle.is_empty() || field.unwrap_or_default().contains(needle)
}
