use std::collections::{BTreeMap, HashMap};

use benchcmp_core::errors::BenchError;
use benchcmp_core::{decode, to_value, JsonValue};
use serde::Serialize;

#[derive(Serialize)]
struct Metrics {
    mse: f64,
    samples: Vec<u32>,
    label: Option<String>,
}

#[derive(Serialize)]
enum Shape {
    Unit,
    Pair(i32, i32),
    Named { radius: f64 },
}

#[test]
fn structs_become_mappings() {
    let value = to_value(&Metrics {
        mse: 0.25,
        samples: vec![1, 2],
        label: None,
    })
    .unwrap();
    assert_eq!(value.get("mse"), Some(&JsonValue::Float(0.25)));
    assert_eq!(
        value.get("samples"),
        Some(&JsonValue::Sequence(vec![JsonValue::Int(1), JsonValue::Int(2)]))
    );
    assert_eq!(value.get("label"), Some(&JsonValue::Null));
}

#[test]
fn enums_are_externally_tagged() {
    assert_eq!(to_value(&Shape::Unit).unwrap(), JsonValue::from("Unit"));
    let pair = to_value(&Shape::Pair(1, 2)).unwrap();
    assert_eq!(
        pair.get("Pair"),
        Some(&JsonValue::Sequence(vec![JsonValue::Int(1), JsonValue::Int(2)]))
    );
    let named = to_value(&Shape::Named { radius: 1.5 }).unwrap();
    assert_eq!(
        named.get("Named").and_then(|inner| inner.get("radius")),
        Some(&JsonValue::Float(1.5))
    );
}

#[test]
fn integer_keys_are_stringified() {
    let mut map = HashMap::new();
    map.insert(7u32, "seven");
    let value = to_value(&map).unwrap();
    assert_eq!(value.get("7"), Some(&JsonValue::from("seven")));
}

struct RawBytes(&'static [u8]);

impl Serialize for RawBytes {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(self.0)
    }
}

#[derive(Serialize)]
struct Blob {
    payload: RawBytes,
}

#[test]
fn byte_strings_are_rejected_with_path() {
    let err = to_value(&vec![Blob {
        payload: RawBytes(b"abc"),
    }])
    .unwrap_err();
    match err {
        BenchError::Unencodable(info) => {
            assert_eq!(info.context.get("type").map(String::as_str), Some("bytes"));
            assert_eq!(
                info.context.get("path").map(String::as_str),
                Some("$[0].payload")
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn float_keys_are_rejected() {
    #[derive(Serialize)]
    struct Wrapper {
        table: Vec<(f64, u8)>,
    }
    // Tuples are fine as sequences; only mapping keys must be strings.
    assert!(to_value(&Wrapper { table: vec![(0.5, 1)] }).is_ok());

    struct FloatKeyed;
    impl Serialize for FloatKeyed {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeMap;
            let mut map = s.serialize_map(Some(1))?;
            map.serialize_entry(&0.5f64, &1u8)?;
            map.end()
        }
    }
    let mut outer = BTreeMap::new();
    outer.insert("weights", FloatKeyed);
    let err = to_value(&outer).unwrap_err();
    assert_eq!(
        err.info().context.get("type").map(String::as_str),
        Some("f64 map key")
    );
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("$.weights")
    );
}

#[test]
fn decode_keeps_int_float_distinction() {
    let value = decode(r#"{"a": 1, "b": 1.0, "c": [true, null, "x"], "d": 18446744073709551615}"#)
        .unwrap();
    assert_eq!(value.get("a"), Some(&JsonValue::Int(1)));
    assert_eq!(value.get("b"), Some(&JsonValue::Float(1.0)));
    assert_eq!(value.get("d"), Some(&JsonValue::Int(u64::MAX as i128)));
    assert_eq!(value.get("c").and_then(JsonValue::as_sequence).map(<[_]>::len), Some(3));
}

#[test]
fn decode_reports_position_on_error() {
    let err = decode("{\"a\": }").unwrap_err();
    assert_eq!(err.info().code, "json-decode");
    assert_eq!(err.info().context.get("line").map(String::as_str), Some("1"));
}

#[test]
fn value_round_trips_through_serde_json() {
    let value = JsonValue::mapping([
        ("n", JsonValue::Int(-3)),
        ("x", JsonValue::Float(0.1)),
        ("s", JsonValue::sequence(["a", "b"])),
    ]);
    let text = serde_json::to_string(&value).unwrap();
    let back: JsonValue = serde_json::from_str(&text).unwrap();
    assert_eq!(back, value);
}

#[test]
fn booleans_are_not_numbers() {
    assert!(!JsonValue::Bool(true).is_number());
    assert_eq!(JsonValue::Bool(true).as_f64(), None);
    assert!(JsonValue::Int(1).is_number());
}
