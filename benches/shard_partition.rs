//! Benchmark suite for shard-key derivation and catalog partitioning

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use refstore::shard::shard_key;
use std::collections::HashMap;

fn qualified_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("langchain_core.runnables.base.Runnable{i}"))
        .collect()
}

fn bench_shard_key(c: &mut Criterion) {
    let names = qualified_names(1);
    c.bench_function("shard_key", |b| {
        b.iter(|| black_box(shard_key(&names[0])))
    });
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for size in [100, 1000, 10000] {
        let names = qualified_names(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &names, |b, names| {
            b.iter(|| {
                let mut shards: HashMap<String, Vec<&String>> = HashMap::new();
                for name in names {
                    shards.entry(shard_key(name)).or_default().push(name);
                }
                black_box(shards.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shard_key, bench_partition);
criterion_main!(benches);
