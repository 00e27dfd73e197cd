//! Extraction of item lists from loosely-shaped JSON bodies.
//!
//! The relay wraps lists under a named key (`{"phones": [...]}`) but some
//! endpoints answer with a bare array. Anything else yields an empty list.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A JSON item did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected a JSON object")]
    NotAnObject,
}

/// Items recovered from a payload, plus how many were unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

/// Pull the list stored under `key`, or the body itself when it is an array.
///
/// Items that fail to deserialise are counted in [`Extracted::skipped`]
/// instead of failing the whole list.
#[must_use]
pub fn extract_list<T: DeserializeOwned>(body: Value, key: &str) -> Extracted<T> {
    let raw = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let total = raw.len();
    let items: Vec<T> = raw
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    let skipped = total - items.len();
    Extracted { items, skipped }
}
