use benchcmp_canon::{encode, encode_pretty, stable_hash_value};
use benchcmp_core::JsonValue;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn payload() -> JsonValue {
    let rows: Vec<JsonValue> = (0..256)
        .map(|idx| {
            JsonValue::mapping([
                ("id", JsonValue::Int(idx)),
                ("value", JsonValue::Float(idx as f64 * 0.1 + 1e-9)),
                ("label", JsonValue::from(format!("row-{idx}"))),
            ])
        })
        .collect();
    JsonValue::mapping([
        ("rows", JsonValue::Sequence(rows)),
        ("seed", JsonValue::Int(7)),
    ])
}

fn bench_encode(c: &mut Criterion) {
    let value = payload();
    c.bench_function("encode_compact", |b| b.iter(|| encode(black_box(&value)).unwrap()));
    c.bench_function("encode_pretty", |b| {
        b.iter(|| encode_pretty(black_box(&value)).unwrap())
    });
    c.bench_function("stable_hash", |b| {
        b.iter(|| stable_hash_value(black_box(&value)).unwrap())
    });
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
