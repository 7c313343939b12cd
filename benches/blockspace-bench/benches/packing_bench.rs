//! Block packing benchmarks.
//!
//! Measures:
//! - Usage recomputation over full blocks
//! - Bottleneck detection
//! - Admission control (accepted and rejected adds)

use {
    blockspace_bench::helpers::{fill_block, make_catalog},
    blockspace_resources::{packing, Batch, Catalog, TransactionTypeId},
    criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput},
};

fn bench_compute_usage(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing/compute_usage");

    for &(n_resources, n_types) in &[(5usize, 5usize), (16, 64), (64, 256)] {
        let catalog = make_catalog(n_resources, n_types, 1);
        let batch = fill_block(&catalog);
        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("resources_x_types", format!("{n_resources}x{n_types}")),
            &(catalog, batch),
            |b, (catalog, batch)| b.iter(|| packing::compute_usage(batch, catalog)),
        );
    }
    group.finish();
}

fn bench_find_bottleneck(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing/find_bottleneck");

    for &n_resources in &[5usize, 64] {
        let catalog = make_catalog(n_resources, 32, 2);
        let usage = packing::compute_usage(&fill_block(&catalog), &catalog).expect("known types");
        group.bench_with_input(
            BenchmarkId::new("resources", n_resources),
            &(catalog, usage),
            |b, (catalog, usage)| b.iter(|| packing::find_bottleneck(usage, catalog)),
        );
    }
    group.finish();
}

fn bench_try_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing/try_add");
    group.throughput(Throughput::Elements(1));

    let catalog = Catalog::reference();
    let transfer = TransactionTypeId::new("transfer");
    let half_full = packing::try_add(&Batch::new(), &transfer, 700, &catalog)
        .expect("known type")
        .batch;
    let full = packing::try_add(&half_full, &transfer, 728, &catalog)
        .expect("known type")
        .batch;

    group.bench_function("admitted", |b| {
        b.iter(|| packing::try_add(&half_full, &transfer, 1, &catalog))
    });
    group.bench_function("rejected", |b| {
        b.iter(|| packing::try_add(&full, &transfer, 1, &catalog))
    });
    group.bench_function("max_admissible", |b| {
        b.iter(|| packing::max_admissible(&half_full, &transfer, &catalog))
    });
    group.finish();
}

criterion_group!(benches, bench_compute_usage, bench_find_bottleneck, bench_try_add);
criterion_main!(benches);
