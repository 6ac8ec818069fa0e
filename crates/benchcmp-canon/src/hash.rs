use benchcmp_core::errors::BenchError;
use benchcmp_core::JsonValue;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::options::EncodeOptions;
use crate::{encode_bytes, encode_serializable, to_canonical_json_bytes};

/// Computes a stable hexadecimal SHA-256 of the canonical encoding of `value`.
pub fn stable_hash_value(value: &JsonValue) -> Result<String, BenchError> {
    let bytes = encode_bytes(value)?;
    Ok(hex_digest(&bytes))
}

/// Computes a stable hexadecimal hash for any serializable payload.
pub fn stable_hash_string<T: Serialize + ?Sized>(value: &T) -> Result<String, BenchError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(hex_digest(&bytes))
}

/// Like [`stable_hash_string`], encoding under explicit options.
pub fn stable_hash_with<T: Serialize + ?Sized>(
    value: &T,
    options: &EncodeOptions,
) -> Result<String, BenchError> {
    let text = encode_serializable(value, options)?;
    Ok(hex_digest(text.as_bytes()))
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
