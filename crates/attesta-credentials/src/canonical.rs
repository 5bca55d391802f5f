//! Canonical byte form of a credential document.
//!
//! Object keys are sorted by their UTF-8 bytes at every depth, array order is
//! kept, and output uses compact separators with serde_json literal rules for
//! strings, numbers, booleans and null. Two values that compare equal as
//! JSON always produce the same bytes, whatever order their keys were
//! inserted in.

use serde_json::{Map, Value};

/// Top-level fields never covered by a proof: the proof itself, internal
/// correlation ids, and the append-only event history.
pub const EXCLUDED_FIELDS: &[&str] = &["proof", "uid", "_uid", "eventHistory"];

/// Serialize `value` to canonical bytes.
pub fn canonicalize(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(256);
    write_value(value, &mut out);
    out
}

/// Copy of `doc` with [`EXCLUDED_FIELDS`] removed. Non-object values are
/// returned unchanged.
pub fn strip_excluded(doc: &Value) -> Value {
    match doc {
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .iter()
                .filter(|(k, _)| !EXCLUDED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            Value::Object(kept)
        }
        other => other.clone(),
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn compute_digest(bytes: &[u8]) -> String {
    attesta_crypto::sha256_hex(bytes)
}

/// Digest of a document as it is stamped into its proof.
pub(crate) fn document_digest(doc: &Value) -> String {
    compute_digest(&canonicalize(&strip_excluded(doc)))
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_value(item, out);
            }
            out.push(b'}');
        }
    }
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    // Serializing a &str into JSON cannot fail.
    let quoted = Value::String(s.to_owned()).to_string();
    out.extend_from_slice(quoted.as_bytes());
}
