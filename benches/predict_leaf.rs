//! Leaf-index prediction benchmarks.
//!
//! Run with: `cargo bench --bench predict_leaf`

mod bench_utils;

use std::num::NonZeroUsize;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bench_utils::{generate_random_input, synthetic_lightgbm_model};
use lgbm_leaves::{GbdtModel, PredictConfig, Predictor, RowMatrix};

const NUM_FEATURES: usize = 32;

fn load_model(n_trees: usize, depth: u32) -> GbdtModel {
    let text = synthetic_lightgbm_model(n_trees, depth, NUM_FEATURES, 7);
    GbdtModel::from_lightgbm_str(&text).expect("synthetic model parses")
}

/// Leaf indices across batch sizes on a medium model.
fn bench_batch_sizes(c: &mut Criterion) {
    let model = load_model(100, 6);
    let predictor = model.predictor();

    let mut group = c.benchmark_group("predict_leaf/batch_size");
    for batch_size in [1, 100, 1_000, 10_000] {
        let matrix = RowMatrix::from_vec(
            generate_random_input(batch_size, NUM_FEATURES, 42),
            batch_size,
            NUM_FEATURES,
        );
        let rows = matrix.row_slices();

        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &rows, |b, rows| {
            b.iter(|| black_box(predictor.predict_leaf_indices(black_box(rows))));
        });
    }
    group.finish();
}

/// Leaf indices against raw score accumulation.
fn bench_output_kinds(c: &mut Criterion) {
    let model = load_model(100, 6);
    let predictor = model.predictor();
    let matrix = RowMatrix::from_vec(generate_random_input(1_000, NUM_FEATURES, 42), 1_000, NUM_FEATURES);
    let rows = matrix.row_slices();

    let mut group = c.benchmark_group("predict_leaf/output");
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("leaf_indices", |b| {
        b.iter(|| black_box(predictor.predict_leaf_indices(black_box(&rows))));
    });
    group.bench_function("raw", |b| {
        b.iter(|| black_box(predictor.predict_raw(black_box(&rows))));
    });
    group.finish();
}

/// Thread scaling on a large batch.
fn bench_threads(c: &mut Criterion) {
    let model = load_model(300, 8);
    let matrix = RowMatrix::from_vec(generate_random_input(10_000, NUM_FEATURES, 42), 10_000, NUM_FEATURES);
    let rows = matrix.row_slices();

    let mut group = c.benchmark_group("predict_leaf/threads");
    group.throughput(Throughput::Elements(10_000));
    for n_threads in [1, 2, 4, 8] {
        let config = PredictConfig::builder()
            .maybe_n_threads(NonZeroUsize::new(n_threads))
            .build()
            .expect("valid config");
        let predictor = Predictor::for_model(&model).with_config(config);
        group.bench_with_input(BenchmarkId::from_parameter(n_threads), &rows, |b, rows| {
            b.iter(|| black_box(predictor.predict_leaf_indices(black_box(rows))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch_sizes, bench_output_kinds, bench_threads);
criterion_main!(benches);
