//! Key and value codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lmdbmap_codec::{Cbor, Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    name: String,
    email: String,
    age: u32,
    tags: Vec<String>,
}

fn sample_user() -> User {
    User {
        name: "Alice".into(),
        email: "alice@example.com".into(),
        age: 30,
        tags: vec!["admin".into(), "beta".into()],
    }
}

/// Benchmark encoding keys.
fn bench_encode_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_key");

    group.bench_function("u64", |b| {
        b.iter(|| black_box(black_box(42u64).encode().unwrap()));
    });

    group.bench_function("i64", |b| {
        b.iter(|| black_box(black_box(-42i64).encode().unwrap()));
    });

    group.bench_function("string", |b| {
        let key = "user:alice@example.com".to_string();
        b.iter(|| black_box(black_box(&key).encode().unwrap()));
    });

    group.bench_function("tuple_string_u64", |b| {
        let key = ("users".to_string(), 1_234_567u64);
        b.iter(|| black_box(black_box(&key).encode().unwrap()));
    });

    group.finish();
}

/// Benchmark decoding keys.
fn bench_decode_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_key");

    let bytes = 42u64.encode().unwrap();
    group.bench_function("u64", |b| {
        b.iter(|| black_box(u64::decode(black_box(&bytes)).unwrap()));
    });

    let bytes = ("users".to_string(), 1_234_567u64).encode().unwrap();
    group.bench_function("tuple_string_u64", |b| {
        b.iter(|| black_box(<(String, u64)>::decode(black_box(&bytes)).unwrap()));
    });

    group.finish();
}

/// Benchmark structured values through CBOR.
fn bench_cbor_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("cbor");

    let user = Cbor(sample_user());
    group.bench_function("encode_struct", |b| {
        b.iter(|| black_box(black_box(&user).encode().unwrap()));
    });

    let bytes = user.encode().unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("decode_struct", |b| {
        b.iter(|| black_box(Cbor::<User>::decode(black_box(&bytes)).unwrap()));
    });

    group.finish();
}

/// Benchmark raw byte values of increasing size.
fn bench_byte_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("bytes");

    for size in [64usize, 1024, 16384].iter() {
        let value = vec![0xABu8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &value, |b, value| {
            b.iter(|| black_box(black_box(value).encode().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_keys,
    bench_decode_keys,
    bench_cbor_values,
    bench_byte_values
);
criterion_main!(benches);
