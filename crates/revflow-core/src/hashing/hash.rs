//! Hash helpers; the rest of the crate never touches the hasher directly.

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;

/// Hashes a string and returns lowercase hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hash of the canonical JSON form of `value`.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}
