//! # Canonical Serialization & Digests
//!
//! The single authoritative implementation of canonical JSON and the
//! digests derived from it. Fingerprints, result digests, and journal
//! chain hashes all go through this module so every subsystem (and every
//! replica) hashes identical bytes for identical values.
//!
//! Canonical form: object keys sorted lexicographically at every nesting
//! level, no incidental whitespace, arrays in submitted order.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Render a JSON value in canonical form.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// SHA-256 over the canonical form, lowercase hex.
pub fn canonical_digest(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to_canonical_string(value).as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint of a request payload: digest over `{kind, params}` so that
/// field order in `params` is irrelevant but values are byte-exact.
pub fn payload_fingerprint(kind: &str, params: &Value) -> String {
    canonical_digest(&serde_json::json!({
        "kind": kind,
        "params": params,
    }))
}

/// Digest over the core fields of a result submission. `result_id` is
/// deliberately excluded.
pub fn result_digest(
    job_id: &str,
    ok: bool,
    result: &Option<Value>,
    error: &Option<Value>,
) -> String {
    canonical_digest(&serde_json::json!({
        "error": error,
        "job_id": job_id,
        "ok": ok,
        "result": result,
    }))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped(key, out);
                out.push(':');
                if let Some(v) = map.get(*key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
    }
}

fn write_escaped(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
