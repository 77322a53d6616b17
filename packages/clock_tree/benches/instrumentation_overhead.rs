//! Benchmarks to measure the compute overhead of `clock_tree` itself.
//!
//! The tracked sections are empty, so the numbers show what just the
//! bookkeeping (directory lookup, stack discipline, stopwatch reads) costs
//! the instrumented code.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock_tree_overhead");

    // Baseline measurement - no tracking at all.
    group.bench_function("baseline_empty", |b| {
        b.iter(|| {
            black_box(());
        });
    });

    group.bench_function("start_stop_flat", |b| {
        b.iter(|| {
            clock_tree::start("bench_flat");
            black_box(());
            clock_tree::stop("bench_flat");
        });
    });

    group.bench_function("start_stop_nested_3_deep", |b| {
        b.iter(|| {
            clock_tree::start("bench_outer");
            clock_tree::start("bench_middle");
            clock_tree::start("bench_inner");
            black_box(());
            clock_tree::stop("bench_inner");
            clock_tree::stop("bench_middle");
            clock_tree::stop("bench_outer");
        });
    });

    group.bench_function("stop_all_after_unwind", |b| {
        b.iter(|| {
            clock_tree::start("bench_a");
            clock_tree::start("bench_b");
            clock_tree::start("bench_c");
            clock_tree::stop_all_after("bench_a", true);
        });
    });

    group.finish();

    // Discard the accumulated tracking state of the benchmark thread.
    drop(black_box(clock_tree::results_as_string()));
}
