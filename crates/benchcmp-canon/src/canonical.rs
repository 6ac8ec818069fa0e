//! First stage of the encoder: normalize a value tree into canonical form.

use benchcmp_core::errors::BenchError;
use benchcmp_core::JsonValue;

use crate::number::{format_float, format_int, int_is_encodable, non_finite_literal};
use crate::options::{EncodeOptions, NonFinitePolicy};

/// Value tree with sorted mapping entries and pre-rendered number tokens.
///
/// Everything that could vary between platforms has been decided by the time a
/// node exists; the writer only concatenates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalNode {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Number token, already formatted.
    Number(String),
    /// String payload, unescaped.
    String(String),
    /// Ordered items.
    Sequence(Vec<CanonicalNode>),
    /// Entries sorted by the UTF-8 bytes of their keys.
    Mapping(Vec<(String, CanonicalNode)>),
}

/// Builds the canonical tree for `value`.
pub fn canonicalize(value: &JsonValue, options: &EncodeOptions) -> Result<CanonicalNode, BenchError> {
    options.validate()?;
    let mut path = String::from("$");
    canonicalize_at(value, options, &mut path)
}

fn canonicalize_at(
    value: &JsonValue,
    options: &EncodeOptions,
    path: &mut String,
) -> Result<CanonicalNode, BenchError> {
    let node = match value {
        JsonValue::Null => CanonicalNode::Null,
        JsonValue::Bool(flag) => CanonicalNode::Bool(*flag),
        JsonValue::Int(int) => {
            if !int_is_encodable(*int) {
                return Err(BenchError::unencodable("integer wider than 64 bits", path.as_str()));
            }
            CanonicalNode::Number(format_int(*int))
        }
        JsonValue::Float(float) => match non_finite_literal(*float) {
            None => CanonicalNode::Number(format_float(*float, options.float_format)),
            Some(literal) => match options.non_finite {
                NonFinitePolicy::Reject => return Err(BenchError::non_finite(literal, path.as_str())),
                NonFinitePolicy::Permissive => CanonicalNode::String(literal.to_string()),
            },
        },
        JsonValue::String(text) => CanonicalNode::String(text.clone()),
        JsonValue::Sequence(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let mark = path.len();
                path.push_str(&format!("[{index}]"));
                let node = canonicalize_at(item, options, path);
                path.truncate(mark);
                nodes.push(node?);
            }
            CanonicalNode::Sequence(nodes)
        }
        JsonValue::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, item) in map {
                let mark = path.len();
                path.push('.');
                path.push_str(key);
                let node = canonicalize_at(item, options, path);
                path.truncate(mark);
                entries.push((key.clone(), node?));
            }
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            CanonicalNode::Mapping(entries)
        }
    };
    Ok(node)
}
