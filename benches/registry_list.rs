//! Registry listing benchmarks.
//!
//! Measures full scans over registries of increasing size, with metadata
//! already backfilled so no writes happen inside the measured loop.

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use model_registry::models::{ActivePointer, RegistryService};

fn populate(root: &Path, count: usize) {
    for i in 0..count {
        let dir = root.join(format!("model-{:04}", i));
        fs::create_dir_all(&dir).unwrap();
        let metadata = serde_json::json!({
            "id": format!("id-{}", i),
            "name": format!("model-{:04}", i),
            "user": "bench",
            "trainTime": "1m",
            "accuracy": 0.9,
            "version": "1.0",
            "trainDate": format!("2024-01-{:02}T00:00:00Z", i % 28 + 1),
        });
        fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
    }
    ActivePointer::new(root).write("model-0000").unwrap();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_list");

    for count in [10usize, 100, 500] {
        let root = tempfile::tempdir().unwrap();
        populate(root.path(), count);
        let service = RegistryService::new(root.path());

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::new("entries", count), |b| {
            b.iter(|| {
                let entries = service.list().unwrap();
                black_box(entries.len())
            })
        });
    }

    group.finish();
}

fn bench_first_listing_backfill(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_backfill");
    group.sample_size(20);

    group.bench_function("backfill_50", |b| {
        b.iter_with_setup(
            || {
                let root = tempfile::tempdir().unwrap();
                for i in 0..50 {
                    let dir = root.path().join(format!("m{}", i));
                    fs::create_dir_all(&dir).unwrap();
                    fs::write(dir.join("metadata.json"), r#"{"accuracy": 0.5}"#).unwrap();
                }
                root
            },
            |root| {
                let service = RegistryService::new(root.path());
                black_box(service.list().unwrap().len())
            },
        )
    });

    group.finish();
}

criterion_group!(benches, bench_list, bench_first_listing_backfill);
criterion_main!(benches);
