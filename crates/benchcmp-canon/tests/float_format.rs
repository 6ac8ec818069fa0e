use benchcmp_canon::number::format_float;
use benchcmp_canon::{encode, encode_with, EncodeOptions, FloatFormat};
use benchcmp_core::JsonValue;

fn shortest(value: f64) -> String {
    format_float(value, FloatFormat::ShortestRoundTrip)
}

#[test]
fn shortest_round_trip_table() {
    let cases: &[(f64, &str)] = &[
        (0.1 + 0.2, "0.30000000000000004"),
        (1.0, "1.0"),
        (-2.5, "-2.5"),
        (100.0, "100.0"),
        (123.5, "123.5"),
        (0.000001, "0.000001"),
        (1e-7, "1e-7"),
        (1.25e-9, "1.25e-9"),
        (1e20, "100000000000000000000.0"),
        (1e21, "1e+21"),
        (1.5e300, "1.5e+300"),
        (5e-324, "5e-324"),
        (f64::MAX, "1.7976931348623157e+308"),
        (2.0f64.powi(53), "9007199254740992.0"),
    ];
    for (value, expected) in cases {
        assert_eq!(shortest(*value), *expected, "formatting {value:e}");
    }
}

#[test]
fn negative_zero_normalizes() {
    assert_eq!(shortest(-0.0), "0.0");
    assert_eq!(
        encode(&JsonValue::Float(-0.0)).unwrap(),
        encode(&JsonValue::Float(0.0)).unwrap()
    );
}

#[test]
fn integers_have_no_suffix() {
    assert_eq!(encode(&JsonValue::Int(100)).unwrap(), "100");
    assert_eq!(encode(&JsonValue::Int(-7)).unwrap(), "-7");
    assert_eq!(
        encode(&JsonValue::Int(u64::MAX as i128)).unwrap(),
        "18446744073709551615"
    );
}

#[test]
fn seventeen_significant_digits() {
    let fixed = FloatFormat::Significant(17);
    assert_eq!(format_float(0.1, fixed), "0.10000000000000001");
    assert_eq!(format_float(0.1 + 0.2, fixed), "0.30000000000000004");
    assert_eq!(format_float(1.0, fixed), "1.0");
    assert_eq!(format_float(1e21, fixed), "1e+21");
}

#[test]
fn fewer_significant_digits_round() {
    assert_eq!(format_float(2.0 / 3.0, FloatFormat::Significant(6)), "0.666667");
    assert_eq!(format_float(1234.5678, FloatFormat::Significant(3)), "1230.0");
}

#[test]
fn shortest_digits_parse_back_to_same_bits() {
    for value in [0.1, 1.0 / 3.0, 6.02214076e23, 2.2250738585072014e-308, 123456.789] {
        let text = shortest(value);
        let parsed: f64 = text.parse().unwrap();
        assert_eq!(parsed.to_bits(), value.to_bits(), "{text}");
    }
}

#[test]
fn float_stability_across_calls() {
    let value = JsonValue::Float(0.1 + 0.2);
    let first = encode(&value).unwrap();
    for _ in 0..16 {
        assert_eq!(encode(&value).unwrap(), first);
    }
}

#[test]
fn out_of_range_digit_count_is_rejected() {
    let options = EncodeOptions::default().with_float_format(FloatFormat::Significant(18));
    let err = encode_with(&JsonValue::Float(1.0), &options).unwrap_err();
    assert_eq!(err.info().code, "float-format-digits");
}
