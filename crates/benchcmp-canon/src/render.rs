//! Bounded renderings for diagnostics and reports.

use benchcmp_core::errors::BenchError;
use benchcmp_core::JsonValue;

use crate::encode_with;
use crate::options::EncodeOptions;

/// Cuts `text` to at most `limit` bytes on a character boundary and appends a
/// `...N bytes truncated` marker naming how many bytes were dropped.
pub fn truncate_with_marker(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...{} bytes truncated", &text[..cut], text.len() - cut)
}

/// Encodes `value` under `options` and bounds the result to `limit` bytes.
pub fn render_bounded(
    value: &JsonValue,
    options: &EncodeOptions,
    limit: usize,
) -> Result<String, BenchError> {
    let text = encode_with(value, options)?;
    Ok(truncate_with_marker(&text, limit))
}

/// Short compact rendering used inside mismatch records. Non-finite floats are
/// shown as their literals so the rendering cannot fail.
pub fn render_repr(value: &JsonValue, limit: usize) -> String {
    match render_bounded(value, &EncodeOptions::default().permissive(), limit) {
        Ok(text) => text,
        Err(err) => format!("<unrenderable: {}>", err.info().code),
    }
}
