//! Map and multimap operation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lmdbmap_bench::{random_data, shuffled_keys, BenchEnv};
use lmdbmap_core::{Map, Multimap};

/// Benchmark one insert per write transaction.
fn bench_single_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_insert");

    for size in [64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let bench_env = BenchEnv::new();
            let map: Map<u64, Vec<u8>> = Map::open(&bench_env.env, "bench").unwrap();
            let data = random_data(size);
            let mut next_key = 0u64;

            b.iter(|| {
                let mut txn = bench_env.env.begin_write().unwrap();
                map.insert(&mut txn, &next_key, black_box(&data)).unwrap();
                txn.commit().unwrap();
                next_key += 1;
            });
        });
    }
    group.finish();
}

/// Benchmark many puts in one write transaction.
fn bench_batch_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_put");

    for batch_size in [10u64, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let bench_env = BenchEnv::new();
                let map: Map<u64, Vec<u8>> = Map::open(&bench_env.env, "bench").unwrap();
                let keys = shuffled_keys(batch_size);
                let data = random_data(256);

                b.iter(|| {
                    let mut txn = bench_env.env.begin_write().unwrap();
                    for key in &keys {
                        map.put(&mut txn, key, black_box(&data)).unwrap();
                    }
                    txn.commit().unwrap();
                });
            },
        );
    }
    group.finish();
}

/// Populates a map with `count` entries of 256 bytes.
fn populated(count: u64) -> (BenchEnv, Map<u64, Vec<u8>>) {
    let bench_env = BenchEnv::new();
    let map: Map<u64, Vec<u8>> = Map::open(&bench_env.env, "bench").unwrap();
    let data = random_data(256);

    let mut txn = bench_env.env.begin_write().unwrap();
    for key in 0..count {
        map.put(&mut txn, &key, &data).unwrap();
    }
    txn.commit().unwrap();
    (bench_env, map)
}

/// Benchmark one get per read transaction.
fn bench_single_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_get");

    for count in [1_000u64, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let (bench_env, map) = populated(count);
            let keys = shuffled_keys(count);
            let mut i = 0;

            b.iter(|| {
                let txn = bench_env.env.begin_read().unwrap();
                let value = map.get(&txn, &keys[i % keys.len()]).unwrap();
                black_box(value);
                i += 1;
            });
        });
    }
    group.finish();
}

/// Benchmark many gets in one read transaction.
fn bench_batch_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_get");
    let (bench_env, map) = populated(10_000);

    for batch_size in [10u64, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let keys = shuffled_keys(batch_size);

                b.iter(|| {
                    let txn = bench_env.env.begin_read().unwrap();
                    for key in &keys {
                        black_box(map.get(&txn, key).unwrap());
                    }
                });
            },
        );
    }
    group.finish();
}

/// Benchmark full scans and bound seeks.
fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    let (bench_env, map) = populated(10_000);

    group.throughput(Throughput::Elements(10_000));
    group.bench_function("full_scan", |b| {
        b.iter(|| {
            let txn = bench_env.env.begin_read().unwrap();
            let count = map.begin(&txn).unwrap().count();
            black_box(count);
        });
    });
    group.finish();

    let mut group = c.benchmark_group("seek");
    let keys = shuffled_keys(10_000);
    let mut i = 0;
    group.bench_function("lower_bound", |b| {
        b.iter(|| {
            let txn = bench_env.env.begin_read().unwrap();
            let it = map.lower_bound(&txn, &keys[i % keys.len()]).unwrap();
            black_box(it.is_end());
            i += 1;
        });
    });
    group.finish();
}

/// Benchmark multimap inserts and per-key reads.
fn bench_multimap(c: &mut Criterion) {
    let mut group = c.benchmark_group("multimap");

    for values_per_key in [1u32, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("get", values_per_key),
            values_per_key,
            |b, &values_per_key| {
                let bench_env = BenchEnv::new();
                let multimap: Multimap<u32, u32> =
                    Multimap::open(&bench_env.env, "bench").unwrap();
                let mut txn = bench_env.env.begin_write().unwrap();
                for key in 0..100u32 {
                    for value in 0..values_per_key {
                        multimap.insert(&mut txn, &key, &value).unwrap();
                    }
                }
                txn.commit().unwrap();

                let mut key = 0u32;
                b.iter(|| {
                    let txn = bench_env.env.begin_read().unwrap();
                    black_box(multimap.get(&txn, &(key % 100)).unwrap());
                    key += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_insert,
    bench_batch_put,
    bench_single_get,
    bench_batch_get,
    bench_iteration,
    bench_multimap
);
criterion_main!(benches);
