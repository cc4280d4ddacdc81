//! Performance benchmarks for the chaos agent
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

use blackadder::chaos::inventory::exclusion_selector;
use blackadder::chaos::policies::{mark_for_termination, scaled_replicas};
use blackadder::chaos::{sentence, ResourceHandle};

/// Benchmark the per-pod termination draw over growing pools
fn bench_mark_for_termination(c: &mut Criterion) {
    let mut group = c.benchmark_group("mark_for_termination");

    for pool_size in [100, 1_000, 10_000].iter() {
        let pods: Vec<_> = (0..*pool_size)
            .map(|i| ResourceHandle::pod("bench", &format!("pod-{}", i)))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);

        group.throughput(Throughput::Elements(*pool_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pool_size), &pods, |b, pods| {
            b.iter(|| mark_for_termination(black_box(pods), 30, &mut rng).len())
        });
    }

    group.finish();
}

/// Benchmark field selector construction for large exclusion lists
fn bench_exclusion_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("exclusion_selector");

    for count in [1, 10, 100].iter() {
        let excluded: BTreeSet<String> = (0..*count).map(|i| format!("team-{}", i)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &excluded, |b, excluded| {
            b.iter(|| exclusion_selector(black_box(excluded)))
        });
    }

    group.finish();
}

fn bench_scaling_and_text(c: &mut Criterion) {
    c.bench_function("scaled_replicas", |b| {
        b.iter(|| (0..256).map(|r| scaled_replicas(black_box(r))).sum::<i32>())
    });

    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("placeholder_sentence", |b| b.iter(|| sentence(&mut rng)));
}

criterion_group!(
    benches,
    bench_mark_for_termination,
    bench_exclusion_selector,
    bench_scaling_and_text
);
criterion_main!(benches);
