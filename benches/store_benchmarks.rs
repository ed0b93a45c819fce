use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ods::{CompressionType, ObjectDataStructure, Tag};
use tempfile::TempDir;

fn roots(n: usize) -> Vec<Tag> {
    (0..n)
        .map(|i| {
            Tag::object(
                format!("entry{i}"),
                vec![Tag::int("id", i as i32), Tag::double("score", i as f64 * 0.5)],
            )
        })
        .collect()
}

fn bench_save_to_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_to_bytes");
    let data = roots(500);
    for compression in [CompressionType::None, CompressionType::Gzip, CompressionType::Zlib] {
        let store = ObjectDataStructure::new("unused.ods", compression);
        group.bench_with_input(
            BenchmarkId::from_parameter(compression),
            &data,
            |b, data| b.iter(|| black_box(store.save_to_bytes(data).unwrap())),
        );
    }
    group.finish();
}

fn bench_file_roundtrip(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let data = roots(500);
    let store = ObjectDataStructure::new(dir.path().join("bench.ods"), CompressionType::Gzip);
    c.bench_function("save+load gzip file", |b| {
        b.iter(|| {
            store.save(&data).unwrap();
            black_box(store.load().unwrap())
        })
    });
}

fn bench_get_key_path(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let store = ObjectDataStructure::new(dir.path().join("get.ods"), CompressionType::None);
    store.save(&roots(500)).unwrap();
    c.bench_function("get entry499.score", |b| {
        b.iter(|| black_box(store.get(black_box("entry499.score")).unwrap()))
    });
}

criterion_group!(benches, bench_save_to_bytes, bench_file_roundtrip, bench_get_key_path);
criterion_main!(benches);
