//! Benchmarks for class-limit computation.
//! Run with: cargo bench --package beadqc --features bench --bench segmentation

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use super::{Histogram, SegmentationConfig, compute_limits};

/// Dim background around 300 with a sparse bright tail, spread over `bins`.
fn bead_like_histogram(bins: usize) -> Histogram {
    let mut counts = vec![0u64; bins];
    for (v, c) in counts.iter_mut().enumerate() {
        let background = (-((v as f64 - 300.0) / 40.0).powi(2)).exp() * 50_000.0;
        let tail = if v > 1000 { 3.0 } else { 0.0 };
        *c = (background + tail) as u64;
    }
    Histogram::from_counts(counts).expect("synthetic histogram is not empty")
}

pub fn benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");

    for bins in [256usize, 4096, 65536] {
        let histogram = bead_like_histogram(bins);
        for config in [
            SegmentationConfig::fluorescence(2),
            SegmentationConfig::transmission(4),
        ] {
            let id = format!("{bins}_bins_{}_classes_{:?}", config.classes, config.weighting);
            group.bench_function(BenchmarkId::new("compute_limits", id), |b| {
                b.iter(|| black_box(compute_limits(black_box(&histogram), black_box(&config))))
            });
        }
    }

    group.finish();
}
