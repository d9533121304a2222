//! Cache key derivation.
//!
//! A key is the SHA-256 of an entry's canonical JSON: object keys sorted
//! recursively, compact separators, arrays kept in order.

use std::{collections::BTreeMap, fmt};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::entries::ErrorEntry;

/// Hex-encoded content fingerprint of one entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_entry(entry: &ErrorEntry) -> Result<Self, serde_json::Error> {
        let canonical = canonical_json(entry)?;
        Ok(Self(hash_canonical(&canonical)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize `entry` so that field order in the source never affects the result.
pub fn canonical_json(entry: &ErrorEntry) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(entry)?;
    serde_json::to_string(&sort_keys(value))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, sort_keys(value)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn hash_canonical(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
