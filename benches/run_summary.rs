//! Benchmarks for run summaries and completeness checks
//!
//! Tests performance of summarizing large sequence listings with gaps.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seqforge::check::{is_complete, missing, ObservedSet};
use seqforge::listing::limit_range;
use seqforge_common::paths::image_path;
use seqforge_common::runs::summarize;
use seqforge_common::{ArtifactKind, ExpectedRange, SequenceNumber};
use std::path::PathBuf;

/// Numbers `1..=len` with every `gap_every`-th number dropped.
fn numbers_with_gaps(len: u32, gap_every: u32) -> Vec<u32> {
    (1..=len).filter(|n| n % gap_every != 0).collect()
}

fn image_listing(len: u32, gap_every: u32) -> Vec<String> {
    numbers_with_gaps(len, gap_every)
        .into_iter()
        .map(|n| image_path(SequenceNumber(n)))
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for gap_every in [7u32, 97, 10_001] {
        let nums = numbers_with_gaps(10_000, gap_every);
        group.bench_with_input(BenchmarkId::new("gap_every", gap_every), &nums, |b, nums| {
            b.iter(|| summarize(black_box(nums.iter().copied())))
        });
    }

    let mut shuffled = numbers_with_gaps(10_000, 97);
    shuffled.reverse();
    group.bench_function("unsorted", |b| {
        b.iter(|| summarize(black_box(shuffled.iter().copied())))
    });

    group.finish();
}

fn bench_completeness(c: &mut Criterion) {
    let mut group = c.benchmark_group("completeness");
    let range = ExpectedRange::one_based(10_000).unwrap();

    let names = image_listing(10_000, 97);
    group.bench_function("collect_listing", |b| {
        b.iter(|| ObservedSet::collect(black_box(names.iter().map(String::as_str)), ArtifactKind::Image))
    });

    let observed = ObservedSet::collect(names.iter().map(String::as_str), ArtifactKind::Image);
    group.bench_function("is_complete", |b| {
        b.iter(|| is_complete(black_box(&observed), &range))
    });
    group.bench_function("missing", |b| b.iter(|| missing(black_box(&observed), &range)));

    group.finish();
}

fn bench_limit_range(c: &mut Criterion) {
    let paths: Vec<PathBuf> = image_listing(10_000, 97).into_iter().map(PathBuf::from).collect();

    c.bench_function("limit_range", |b| {
        b.iter(|| limit_range(black_box(paths.clone()), 2_500, 7_500))
    });
}

criterion_group!(benches, bench_summarize, bench_completeness, bench_limit_range);
criterion_main!(benches);
