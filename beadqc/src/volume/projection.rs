//! Orthogonal projections of a 3D stack.

use common::{Buffer2, Buffer3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Image plane kept by a projection. The remaining axis is collapsed.
///
/// The vertical axis of `XZ` and `YZ` projections is depth, so the second
/// coordinate of a position found on them is a z index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    /// Collapse depth; output is `width x height`.
    XY,
    /// Collapse rows; output is `width x depth`.
    XZ,
    /// Collapse columns; output is `height x depth`.
    YZ,
}

/// Reduction applied along the collapsed axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMethod {
    #[default]
    Max,
    Min,
    Mean,
    Sum,
    Median,
    /// Sample standard deviation (n - 1 denominator).
    StdDev,
}

impl ProjectionMethod {
    fn reduce(self, ray: &mut [f32]) -> f32 {
        debug_assert!(!ray.is_empty());
        match self {
            ProjectionMethod::Max => ray.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            ProjectionMethod::Min => ray.iter().copied().fold(f32::INFINITY, f32::min),
            ProjectionMethod::Sum => ray.iter().map(|&v| v as f64).sum::<f64>() as f32,
            ProjectionMethod::Mean => {
                (ray.iter().map(|&v| v as f64).sum::<f64>() / ray.len() as f64) as f32
            }
            ProjectionMethod::Median => {
                ray.sort_unstable_by(f32::total_cmp);
                let mid = ray.len() / 2;
                if ray.len() % 2 == 1 {
                    ray[mid]
                } else {
                    (ray[mid - 1] + ray[mid]) * 0.5
                }
            }
            ProjectionMethod::StdDev => {
                let n = ray.len();
                if n < 2 {
                    return 0.0;
                }
                let mean = ray.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
                let var = ray
                    .iter()
                    .map(|&v| (v as f64 - mean) * (v as f64 - mean))
                    .sum::<f64>()
                    / (n - 1) as f64;
                var.sqrt() as f32
            }
        }
    }
}

/// Project `data` onto `plane` with `method`.
pub fn project(data: &Buffer3<f32>, plane: Plane, method: ProjectionMethod) -> Buffer2<f32> {
    let (w, h, d) = (data.width(), data.height(), data.depth());
    let (out_w, out_h, ray_len) = match plane {
        Plane::XY => (w, h, d),
        Plane::XZ => (w, d, h),
        Plane::YZ => (h, d, w),
    };

    let mut pixels = vec![0.0f32; out_w * out_h];
    if pixels.is_empty() || ray_len == 0 {
        return Buffer2::new(out_w, out_h, pixels);
    }
    pixels
        .par_chunks_mut(out_w)
        .enumerate()
        .for_each(|(row, chunk)| {
            let mut ray = Vec::with_capacity(ray_len);
            for (col, out) in chunk.iter_mut().enumerate() {
                ray.clear();
                match plane {
                    Plane::XY => ray.extend((0..d).map(|z| data[(col, row, z)])),
                    Plane::XZ => ray.extend((0..h).map(|y| data[(col, y, row)])),
                    Plane::YZ => ray.extend((0..w).map(|x| data[(x, col, row)])),
                }
                *out = method.reduce(&mut ray);
            }
        });

    Buffer2::new(out_w, out_h, pixels)
}
