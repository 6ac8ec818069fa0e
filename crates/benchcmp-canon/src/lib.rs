#![deny(missing_docs)]
#![doc = "Canonical JSON encoding: sorted keys, a fixed float formatting rule, and explicit NaN/Infinity handling."]

use std::io::Write;

use benchcmp_core::errors::{BenchError, ErrorInfo};
use benchcmp_core::{to_value, JsonValue};
use serde::Serialize;

pub mod canonical;
/// Stable content hashes over canonical bytes.
pub mod hash;
pub mod number;
/// Encoder options.
pub mod options;
pub mod render;
pub mod writer;

pub use canonical::{canonicalize, CanonicalNode};
pub use hash::{stable_hash_string, stable_hash_value, stable_hash_with};
pub use options::{EncodeOptions, FloatFormat, Layout, NonFinitePolicy};
pub use render::{render_bounded, render_repr, truncate_with_marker};

/// Encodes `value` compactly with shortest round-trip floats, rejecting NaN and
/// infinities. The result carries no trailing newline.
pub fn encode(value: &JsonValue) -> Result<String, BenchError> {
    encode_with(value, &EncodeOptions::default())
}

/// Encodes `value` under explicit options.
pub fn encode_with(value: &JsonValue, options: &EncodeOptions) -> Result<String, BenchError> {
    let node = canonicalize(value, options)?;
    let mut out = String::new();
    writer::write_node(&node, options.layout, &mut out);
    Ok(out)
}

/// Encodes `value` with two-space indentation.
pub fn encode_pretty(value: &JsonValue) -> Result<String, BenchError> {
    encode_with(value, &EncodeOptions::default().pretty())
}

/// UTF-8 bytes of [`encode`]; used for hashing and byte-for-byte comparison.
pub fn encode_bytes(value: &JsonValue) -> Result<Vec<u8>, BenchError> {
    encode(value).map(String::into_bytes)
}

/// Converts a serializable payload and encodes it under `options`.
pub fn encode_serializable<T: Serialize + ?Sized>(
    value: &T,
    options: &EncodeOptions,
) -> Result<String, BenchError> {
    encode_with(&to_value(value)?, options)
}

/// Serializes a value into canonical JSON bytes with deterministic ordering.
pub fn to_canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BenchError> {
    encode_serializable(value, &EncodeOptions::default()).map(String::into_bytes)
}

/// Writes the encoding of `value` to a line-oriented sink, followed by exactly
/// one newline.
pub fn write_line<W: Write>(
    sink: &mut W,
    value: &JsonValue,
    options: &EncodeOptions,
) -> Result<(), BenchError> {
    let mut text = encode_with(value, options)?;
    text.push('\n');
    sink.write_all(text.as_bytes())
        .map_err(|err| BenchError::Serde(ErrorInfo::new("write-line", err.to_string())))
}
