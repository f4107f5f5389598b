//! Canonical JSON serialization helpers.
//!
//! Serializes structures with recursively sorted object keys so that the
//! same model always produces the same bytes, and hashes those bytes with
//! blake3 for logging and comparison.

use serde::Serialize;
use serde_json::{map::Map, Value};

use crate::errors::Result;

/// Recursively sort JSON object keys to obtain a canonical representation.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, val) in entries {
                sorted.insert(key, canonicalize(val));
            }

            Value::Object(sorted)
        }
        Value::Array(elements) => Value::Array(elements.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialize a value into compact canonical JSON.
pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String> {
    let canonical = canonicalize(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&canonical)?)
}

/// Blake3 hash of the canonical JSON form, hex encoded.
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String> {
    let json = canonical_json_string(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}
