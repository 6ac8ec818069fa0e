//! The JSON-like value tree passed between every benchcmp component.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::{BenchError, ErrorInfo};

/// Mapping from string keys to values. Keys iterate in UTF-8 byte order.
pub type Mapping = BTreeMap<String, JsonValue>;

/// Closed set of JSON-like variants.
///
/// Integers and floats are distinct so that `1` and `1.0` survive a round trip
/// through the canonical encoder. `Float` may hold NaN or an infinity in memory;
/// whether such a value can be encoded is decided by the encoder's policy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON `true` / `false`. Never treated as a number.
    Bool(bool),
    /// Integer wide enough for every `i64` and `u64`. Only that range encodes.
    Int(i128),
    /// IEEE-754 binary64 number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<JsonValue>),
    /// String-keyed mapping; insertion order is not retained.
    Mapping(Mapping),
}

impl JsonValue {
    /// Short lowercase name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "bool",
            JsonValue::Int(_) => "int",
            JsonValue::Float(_) => "float",
            JsonValue::String(_) => "string",
            JsonValue::Sequence(_) => "sequence",
            JsonValue::Mapping(_) => "mapping",
        }
    }

    /// Returns whether the value is an integer or a float. Booleans are not numbers.
    pub fn is_number(&self) -> bool {
        matches!(self, JsonValue::Int(_) | JsonValue::Float(_))
    }

    /// Returns whether the value is a sequence or a mapping.
    pub fn is_container(&self) -> bool {
        matches!(self, JsonValue::Sequence(_) | JsonValue::Mapping(_))
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Int(value) => Some(*value as f64),
            JsonValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the mapping payload, if any.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            JsonValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the sequence payload, if any.
    pub fn as_sequence(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a key when the value is a mapping.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Builds a mapping from key/value pairs. Later duplicates win.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, JsonValue)>,
    {
        JsonValue::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Builds a sequence from anything convertible into values.
    pub fn sequence<T, I>(items: I) -> Self
    where
        T: Into<JsonValue>,
        I: IntoIterator<Item = T>,
    {
        JsonValue::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Converts a decoded `serde_json` tree into a value.
    pub fn from_serde_json(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(flag) => JsonValue::Bool(flag),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    JsonValue::Int(int as i128)
                } else if let Some(uint) = number.as_u64() {
                    JsonValue::Int(uint as i128)
                } else {
                    JsonValue::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(text) => JsonValue::String(text),
            Value::Array(items) => {
                JsonValue::Sequence(items.into_iter().map(JsonValue::from_serde_json).collect())
            }
            Value::Object(map) => JsonValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, JsonValue::from_serde_json(value)))
                    .collect(),
            ),
        }
    }
}

/// Parses JSON text into a value.
///
/// Floats are parsed with correct rounding, so `decode(encode(v))` restores the
/// exact bit pattern of every finite float in `v`.
pub fn decode(text: &str) -> Result<JsonValue, BenchError> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        BenchError::Serde(
            ErrorInfo::new("json-decode", err.to_string())
                .with_context("line", err.line().to_string())
                .with_context("column", err.column().to_string()),
        )
    })?;
    Ok(JsonValue::from_serde_json(value))
}

/// Parses UTF-8 JSON bytes into a value.
pub fn decode_slice(bytes: &[u8]) -> Result<JsonValue, BenchError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| BenchError::Serde(ErrorInfo::new("json-utf8", err.to_string())))?;
    decode(text)
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        JsonValue::from_serde_json(value)
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<f64> for JsonValue {
    fn from(value: f64) -> Self {
        JsonValue::Float(value)
    }
}

impl From<f32> for JsonValue {
    fn from(value: f32) -> Self {
        JsonValue::Float(value as f64)
    }
}

macro_rules! int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for JsonValue {
                fn from(value: $ty) -> Self {
                    JsonValue::Int(value as i128)
                }
            }
        )*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl<T: Into<JsonValue>> From<Vec<T>> for JsonValue {
    fn from(items: Vec<T>) -> Self {
        JsonValue::sequence(items)
    }
}

impl<T: Into<JsonValue>> From<Option<T>> for JsonValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(JsonValue::Null)
    }
}

impl From<Mapping> for JsonValue {
    fn from(map: Mapping) -> Self {
        JsonValue::Mapping(map)
    }
}
