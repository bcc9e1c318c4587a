//! Canonical JSON encoding for deterministic signing bytes.
//!
//! The encoding rules:
//! - Object keys sorted by their UTF-16 code units
//! - Array element order preserved
//! - No insignificant whitespace
//! - Strings escaped as `serde_json` escapes them (`\"`, `\\`, `\b`, `\f`,
//!   `\n`, `\r`, `\t`, other control characters as `\u00XX`)
//! - Integers in decimal; floats in ECMAScript `Number::toString` form, so
//!   `1.0` prints as `1`, `-0.0` as `0` and `1e21` as `1e+21`
//!
//! These are the rules `JSON.stringify` follows over sorted keys, so packs
//! canonicalize the same way outside Rust.
//!
//! The canonical encoding is critical: the attestor and the verifier may
//! run in different processes and must agree on the exact byte sequence.

use serde_json::{Map, Number, Value};

use crate::pack::Pack;

/// Encode the signable part of a pack (`meta` and `events`) to canonical bytes.
pub fn canonical_pack_bytes(pack: &Pack) -> Vec<u8> {
    canonical_json_bytes(&pack.signable_value())
}

/// Encode any JSON value to canonical bytes.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a JSON value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(buf, n),
        Value::String(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Object(map) => encode_object_canonical(buf, map),
    }
}

fn encode_number(buf: &mut Vec<u8>, n: &Number) {
    match n.as_f64() {
        Some(f) if n.is_f64() => encode_float(buf, f),
        _ => buf.extend_from_slice(n.to_string().as_bytes()),
    }
}

/// Encode a finite float in ECMAScript `Number::toString` form.
fn encode_float(buf: &mut Vec<u8>, f: f64) {
    if f == 0.0 {
        buf.push(b'0');
        return;
    }
    if f < 0.0 {
        buf.push(b'-');
    }

    // Shortest round-trip digits as `d.ddde<exp>`.
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp.parse::<i32>().unwrap_or(0) + 1;

    let text = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat(n.unsigned_abs() as usize), digits)
    } else {
        let sign = if n > 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        let dot = if rest.is_empty() { "" } else { "." };
        format!("{}{}{}e{}{}", first, dot, rest, sign, (n - 1).unsigned_abs())
    };
    buf.extend_from_slice(text.as_bytes());
}

/// Encode a string with JSON escaping.
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    buf.push(b'"');
    for &byte in s.as_bytes() {
        match byte {
            b'"' => buf.extend_from_slice(b"\\\""),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            0x08 => buf.extend_from_slice(b"\\b"),
            0x0c => buf.extend_from_slice(b"\\f"),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            0x00..=0x1f => {
                buf.extend_from_slice(b"\\u00");
                buf.push(HEX[(byte >> 4) as usize]);
                buf.push(HEX[(byte & 0x0f) as usize]);
            }
            // Multi-byte UTF-8 sequences pass through untouched.
            _ => buf.push(byte),
        }
    }
    buf.push(b'"');
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    buf.push(b'[');
    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_value_to(buf, item);
    }
    buf.push(b']');
}

/// Encode an object with its keys sorted.
fn encode_object_canonical(buf: &mut Vec<u8>, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.encode_utf16().cmp(b.0.encode_utf16()));

    buf.push(b'{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_text(buf, key);
        buf.push(b':');
        encode_value_to(buf, value);
    }
    buf.push(b'}');
}
