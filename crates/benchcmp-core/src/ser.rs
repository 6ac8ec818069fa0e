//! `serde` bridge that turns any `Serialize` type into a [`JsonValue`].
//!
//! The bridge is the one place where a caller can hand the engine something that
//! is not JSON-like. Such values fail with [`BenchError::Unencodable`] carrying
//! the offending type and the path at which it was found.

use std::fmt::Display;

use serde::ser::{self, Serialize};

use crate::errors::{BenchError, ErrorInfo};
use crate::value::{JsonValue, Mapping};

/// Converts any serializable value into a [`JsonValue`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue, BenchError> {
    value
        .serialize(ValueSerializer::at("$".to_string()))
        .map_err(|err| err.0)
}

/// Error wrapper required by the `serde::ser::Error` contract.
#[derive(Debug)]
pub struct SerializeError(BenchError);

impl SerializeError {
    fn unencodable(type_name: &str, path: &str) -> Self {
        Self(BenchError::unencodable(type_name, path))
    }

    fn located(self, path: &str) -> Self {
        match self.0 {
            BenchError::Unencodable(info) if !info.context.contains_key("path") => {
                Self(BenchError::Unencodable(info.with_context("path", path)))
            }
            other => Self(other),
        }
    }
}

impl Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SerializeError {}

impl ser::Error for SerializeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self(BenchError::Unencodable(
            ErrorInfo::new("serialize-custom", msg.to_string()).with_context("type", "custom"),
        ))
    }
}

fn child_index(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

fn child_key(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

struct ValueSerializer {
    path: String,
}

impl ValueSerializer {
    fn at(path: String) -> Self {
        Self { path }
    }
}

type SerResult = Result<JsonValue, SerializeError>;

impl ser::Serializer for ValueSerializer {
    type Ok = JsonValue;
    type Error = SerializeError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> SerResult {
        Ok(JsonValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_i16(self, v: i16) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_i32(self, v: i32) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_i64(self, v: i64) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_i128(self, v: i128) -> SerResult {
        Ok(JsonValue::Int(v))
    }

    fn serialize_u8(self, v: u8) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_u16(self, v: u16) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_u32(self, v: u32) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_u64(self, v: u64) -> SerResult {
        Ok(JsonValue::Int(v as i128))
    }

    fn serialize_u128(self, v: u128) -> SerResult {
        i128::try_from(v)
            .map(JsonValue::Int)
            .map_err(|_| SerializeError::unencodable("u128 beyond i128::MAX", &self.path))
    }

    fn serialize_f32(self, v: f32) -> SerResult {
        Ok(JsonValue::Float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> SerResult {
        Ok(JsonValue::Float(v))
    }

    fn serialize_char(self, v: char) -> SerResult {
        Ok(JsonValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> SerResult {
        Ok(JsonValue::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> SerResult {
        Err(SerializeError::unencodable("bytes", &self.path))
    }

    fn serialize_none(self) -> SerResult {
        Ok(JsonValue::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> SerResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> SerResult {
        Ok(JsonValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> SerResult {
        Ok(JsonValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> SerResult {
        Ok(JsonValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> SerResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> SerResult {
        let path = child_key(&self.path, variant);
        let inner = value.serialize(ValueSerializer::at(path))?;
        let mut map = Mapping::new();
        map.insert(variant.to_string(), inner);
        Ok(JsonValue::Mapping(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, SerializeError> {
        Ok(SeqBuilder {
            path: self.path,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, SerializeError> {
        Ok(VariantSeqBuilder {
            variant,
            inner: SeqBuilder {
                path: child_key(&self.path, variant),
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, SerializeError> {
        Ok(MapBuilder {
            path: self.path,
            entries: Mapping::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<MapBuilder, SerializeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantMapBuilder, SerializeError> {
        Ok(VariantMapBuilder {
            variant,
            inner: MapBuilder {
                path: child_key(&self.path, variant),
                entries: Mapping::new(),
                pending_key: None,
            },
        })
    }
}

struct SeqBuilder {
    path: String,
    items: Vec<JsonValue>,
}

impl SeqBuilder {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        let path = child_index(&self.path, self.items.len());
        let item = value
            .serialize(ValueSerializer::at(path.clone()))
            .map_err(|err| err.located(&path))?;
        self.items.push(item);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        Ok(JsonValue::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        Ok(JsonValue::Sequence(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> SerResult {
        Ok(JsonValue::Sequence(self.items))
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    inner: SeqBuilder,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.inner.push(value)
    }

    fn end(self) -> SerResult {
        let mut map = Mapping::new();
        map.insert(
            self.variant.to_string(),
            JsonValue::Sequence(self.inner.items),
        );
        Ok(JsonValue::Mapping(map))
    }
}

struct MapBuilder {
    path: String,
    entries: Mapping,
    pending_key: Option<String>,
}

impl MapBuilder {
    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<(), SerializeError> {
        let path = child_key(&self.path, &key);
        let item = value
            .serialize(ValueSerializer::at(path.clone()))
            .map_err(|err| err.located(&path))?;
        self.entries.insert(key, item);
        Ok(())
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), SerializeError> {
        let key = key.serialize(KeySerializer { path: &self.path })?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        let key = self.pending_key.take().ok_or_else(|| {
            SerializeError(BenchError::Serde(ErrorInfo::new(
                "map-value-without-key",
                format!("map value at {} serialized before its key", self.path),
            )))
        })?;
        self.insert(key, value)
    }

    fn end(self) -> SerResult {
        Ok(JsonValue::Mapping(self.entries))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> SerResult {
        Ok(JsonValue::Mapping(self.entries))
    }
}

struct VariantMapBuilder {
    variant: &'static str,
    inner: MapBuilder,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = JsonValue;
    type Error = SerializeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        self.inner.insert(key.to_string(), value)
    }

    fn end(self) -> SerResult {
        let mut map = Mapping::new();
        map.insert(
            self.variant.to_string(),
            JsonValue::Mapping(self.inner.entries),
        );
        Ok(JsonValue::Mapping(map))
    }
}

/// Serializer for mapping keys. Strings pass through; integers, booleans and
/// chars are stringified the way JSON object keys usually are.
struct KeySerializer<'a> {
    path: &'a str,
}

impl KeySerializer<'_> {
    fn reject(&self, type_name: &str) -> SerializeError {
        SerializeError::unencodable(&format!("{type_name} map key"), self.path)
    }
}

type KeyResult = Result<String, SerializeError>;

impl ser::Serializer for KeySerializer<'_> {
    type Ok = String;
    type Error = SerializeError;
    type SerializeSeq = ser::Impossible<String, SerializeError>;
    type SerializeTuple = ser::Impossible<String, SerializeError>;
    type SerializeTupleStruct = ser::Impossible<String, SerializeError>;
    type SerializeTupleVariant = ser::Impossible<String, SerializeError>;
    type SerializeMap = ser::Impossible<String, SerializeError>;
    type SerializeStruct = ser::Impossible<String, SerializeError>;
    type SerializeStructVariant = ser::Impossible<String, SerializeError>;

    fn serialize_bool(self, v: bool) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> KeyResult {
        Err(self.reject("f32"))
    }

    fn serialize_f64(self, _v: f64) -> KeyResult {
        Err(self.reject("f64"))
    }

    fn serialize_char(self, v: char) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> KeyResult {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> KeyResult {
        Err(self.reject("bytes"))
    }

    fn serialize_none(self) -> KeyResult {
        Err(self.reject("none"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> KeyResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> KeyResult {
        Err(self.reject("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> KeyResult {
        Err(self.reject(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> KeyResult {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> KeyResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> KeyResult {
        Err(self.reject(name))
    }

    fn serialize_seq(
        self,
        _len: Option<usize>,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject("sequence"))
    }

    fn serialize_tuple(
        self,
        _len: usize,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject(name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject(name))
    }

    fn serialize_map(
        self,
        _len: Option<usize>,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject("mapping"))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<ser::Impossible<String, SerializeError>, SerializeError> {
        Err(self.reject(name))
    }
}

impl Serialize for JsonValue {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use ser::{SerializeMap, SerializeSeq};

        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(flag) => serializer.serialize_bool(*flag),
            JsonValue::Int(value) => {
                if let Ok(small) = i64::try_from(*value) {
                    serializer.serialize_i64(small)
                } else if let Ok(unsigned) = u64::try_from(*value) {
                    serializer.serialize_u64(unsigned)
                } else {
                    serializer.serialize_i128(*value)
                }
            }
            JsonValue::Float(value) => serializer.serialize_f64(*value),
            JsonValue::String(text) => serializer.serialize_str(text),
            JsonValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonValue::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}
