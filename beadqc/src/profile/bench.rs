//! Benchmarks for profile fitting.
//! Run with: cargo bench --package beadqc --features bench --bench profile

use std::hint::black_box;

use common::Buffer3;
use criterion::{BenchmarkId, Criterion};

use super::{LMConfig, PsfConfig, fit_profile, profile_psf};
use crate::volume::{Axis, SampleType, Stack, VoxelCalibration};

fn gaussian_line(len: usize, sigma: f64) -> Vec<f32> {
    let center = len as f64 / 2.0;
    (0..len)
        .map(|i| {
            let dx = i as f64 - center;
            (100.0 + 2000.0 * (-dx * dx / (2.0 * sigma * sigma)).exp()) as f32
        })
        .collect()
}

fn bead_stack(size: usize, depth: usize) -> Stack {
    let c = size as f64 / 2.0;
    let cz = depth as f64 / 2.0;
    let data = Buffer3::from_fn(size, size, depth, |x, y, z| {
        let r2 = (x as f64 - c).powi(2) + (y as f64 - c).powi(2);
        let dz = z as f64 - cz;
        (100.0 + 2000.0 * (-r2 / 8.0 - dz * dz / 18.0).exp()) as f32
    });
    let calibration = VoxelCalibration::micrometers(0.1, 0.1, 0.3)
        .expect("benchmark calibration is valid");
    Stack::new(data, SampleType::U16, calibration).expect("benchmark stack is not empty")
}

pub fn benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile");
    let config = LMConfig::default();

    for len in [21usize, 41, 101] {
        let line = gaussian_line(len, len as f64 / 10.0);
        group.bench_function(BenchmarkId::new("fit_profile", len), |b| {
            b.iter(|| black_box(fit_profile(Axis::X, black_box(&line), 0.1, 1.0, &config)))
        });
    }

    let stack = bead_stack(31, 21);
    let psf_config = PsfConfig::default();
    group.bench_function("profile_psf_31x31x21", |b| {
        b.iter(|| black_box(profile_psf(black_box(&stack), &psf_config)))
    });

    group.finish();
}
