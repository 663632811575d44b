//! Synthetic bead images and stacks.

use common::{Buffer2, Buffer3};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::volume::{SampleType, Stack, Volume, VoxelCalibration};

/// Anisotropic 3D Gaussian bead, in voxel units.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBead {
    pub center: DVec3,
    pub sigma: DVec3,
    pub amplitude: f64,
}

impl GaussianBead {
    pub fn new(center: DVec3, sigma: DVec3, amplitude: f64) -> Self {
        Self {
            center,
            sigma,
            amplitude,
        }
    }

    fn value_at(&self, x: usize, y: usize, z: usize) -> f64 {
        let d = (DVec3::new(x as f64, y as f64, z as f64) - self.center) / self.sigma;
        self.amplitude * (-0.5 * d.length_squared()).exp()
    }
}

/// Render `beads` over a constant `background` and round to integer levels.
///
/// With `noise = Some((seed, spread))` every voxel gets uniform noise in
/// `[-spread, spread)` from a seeded generator.
pub fn bead_stack(
    (width, height, depth): (usize, usize, usize),
    beads: &[GaussianBead],
    background: f64,
    noise: Option<(u64, f64)>,
    calibration: VoxelCalibration,
) -> Stack {
    let mut rng = noise.map(|(seed, _)| StdRng::seed_from_u64(seed));
    let spread = noise.map_or(0.0, |(_, s)| s);

    let data = Buffer3::from_fn(width, height, depth, |x, y, z| {
        let mut v = background + beads.iter().map(|b| b.value_at(x, y, z)).sum::<f64>();
        if let Some(rng) = rng.as_mut() {
            v += rng.random_range(-spread..spread);
        }
        v.round().clamp(0.0, 65535.0) as f32
    });
    Stack::new(data, SampleType::U16, calibration).unwrap()
}

/// Uniform ellipsoid of `value` over `background`. Voxels with
/// `((p - center) / radii)^2 <= 1` are inside.
pub fn ellipsoid_stack(
    (width, height, depth): (usize, usize, usize),
    center: DVec3,
    radii: DVec3,
    value: f32,
    background: f32,
) -> Stack {
    let data = Buffer3::from_fn(width, height, depth, |x, y, z| {
        let d = (DVec3::new(x as f64, y as f64, z as f64) - center) / radii;
        if d.length_squared() <= 1.0 {
            value
        } else {
            background
        }
    });
    Stack::new(data, SampleType::U16, VoxelCalibration::default()).unwrap()
}

/// Filled disk of `value` over `background`.
pub fn disk(
    width: usize,
    height: usize,
    (cx, cy): (f64, f64),
    radius: f64,
    value: f32,
    background: f32,
) -> Buffer2<f32> {
    Buffer2::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f64 - cx, y as f64 - cy);
        if dx * dx + dy * dy <= radius * radius {
            value
        } else {
            background
        }
    })
}

/// Multi-channel volume with one stack per channel.
pub fn volume_from_stacks(stacks: &[Stack]) -> Volume {
    Volume::from_channels(stacks).unwrap()
}
