//! Bead localization inside a single-bead stack.
//!
//! Two locators are provided:
//!
//! - [`max_voxel`]: the brightest voxel, used to anchor profile extraction.
//! - [`locate_centroid`]: sub-pixel center from segmentation and an
//!   area-preserving ellipse fit of the bright region, used for
//!   co-registration. Lateral coordinates come from the XY projection and
//!   depth from the XZ projection.

mod config;
mod ellipse;
mod error;
mod region;

#[cfg(test)]
mod tests;

pub use config::{Connectivity, LocalizationConfig};
pub use ellipse::Ellipse;
pub use error::LocalizationError;

use common::Buffer2;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::math::min_max;
use crate::segmentation::{Histogram, HistogramSegmenter};
use crate::volume::{Plane, SampleType, Stack};
use ellipse::fit_ellipse;
use region::{fill_holes, grow_region};

// ============================================================================
// Max voxel
// ============================================================================

/// Brightest voxel of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxVoxel {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub value: f32,
}

/// Locate the brightest voxel. Ties resolve to the first in scan order.
///
/// For stacks deeper than one plane the lateral position is the argmax of the
/// XY maximum projection and the depth is the brightest plane along that
/// column.
pub fn max_voxel(stack: &Stack) -> MaxVoxel {
    let data = stack.data();
    if stack.depth() == 1 {
        let plane = data.plane_buffer(0);
        let (x, y, value) = plane.argmax().unwrap_or((0, 0, data[(0, 0, 0)]));
        return MaxVoxel { x, y, z: 0, value };
    }

    let projection = stack.max_projection(Plane::XY);
    let (x, y, _) = projection.argmax().unwrap_or((0, 0, 0.0));

    let column = data.line_z(x, y);
    let mut z = 0;
    for (i, &v) in column.iter().enumerate() {
        if v > column[z] {
            z = i;
        }
    }

    MaxVoxel {
        x,
        y,
        z,
        value: column[z],
    }
}

// ============================================================================
// Centroid
// ============================================================================

/// Sub-voxel object center, in voxel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
    /// `None` for single-plane stacks.
    pub z: Option<f64>,
}

impl Centroid {
    #[inline]
    pub fn is_3d(&self) -> bool {
        self.z.is_some()
    }

    /// Position as a vector. A missing depth coordinate reads as zero.
    #[inline]
    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z.unwrap_or(0.0))
    }
}

/// Result of localizing the bright object of one projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocatedObject {
    /// Center in projection coordinates.
    pub center: DVec2,
    /// Ellipse fitted to the accepted region.
    pub ellipse: Ellipse,
    /// Region-growing rounds used, starting at 1.
    pub refinements: usize,
}

/// Rescale `image` linearly onto `0..=255`. A flat image maps to zero.
fn rescale_to_gray8(image: &Buffer2<f32>) -> Buffer2<f32> {
    match min_max(image.pixels()) {
        Some((lo, hi)) if hi > lo => {
            let scale = 255.0 / (hi - lo);
            image.map(|&v| ((v - lo) * scale).round().clamp(0.0, 255.0))
        }
        _ => image.map(|_| 0.0),
    }
}

fn center_of_mass(mask: &Buffer2<bool>) -> Option<DVec2> {
    let (sum, count) = mask
        .iter()
        .enumerate()
        .filter(|&(_, &on)| on)
        .fold((DVec2::ZERO, 0usize), |(sum, count), (idx, _)| {
            let (x, y) = mask.coords(idx);
            (sum + DVec2::new(x as f64, y as f64), count + 1)
        });
    (count > 0).then(|| sum / count as f64)
}

fn seed_pixel(pos: DVec2, width: usize, height: usize) -> (usize, usize) {
    let x = pos.x.round().clamp(0.0, (width - 1) as f64) as usize;
    let y = pos.y.round().clamp(0.0, (height - 1) as f64) as usize;
    (x, y)
}

/// Locate the bright object of a 2D image.
///
/// The image is rescaled to 8 bits and segmented; the brightest class forms
/// the object mask. Starting from the mask's center of mass, the region
/// containing the seed is grown, its holes filled and an ellipse fitted. An
/// ellipse whose minor axis is below the configured minimum is a speckle:
/// its region is removed from the mask and the seed moves to the center of
/// mass of what remains.
pub fn locate_in_image(
    image: &Buffer2<f32>,
    config: &LocalizationConfig,
) -> Result<LocatedObject, LocalizationError> {
    config.validate();

    let gray = rescale_to_gray8(image);
    let mut segmenter = HistogramSegmenter::new(Histogram::from_image(&gray, SampleType::U8)?);
    let classes = segmenter.calc_limits(&config.segmentation)?.class_count();
    let mut mask = segmenter.mask(&gray, classes - 1)?;

    let mut center = center_of_mass(&mask).ok_or(LocalizationError::EmptyMask)?;
    let mut minor_axis = 0.0;

    for round in 1..=config.max_refinements {
        let (sx, sy) = seed_pixel(center, mask.width(), mask.height());
        let region = grow_region(&mask, (sx, sy), config.connectivity)
            .ok_or(LocalizationError::SeedOutsideMask { x: sx, y: sy })?;
        let filled = fill_holes(&region, config.connectivity);
        let Some(ellipse) = fit_ellipse(&filled.pixels) else {
            break;
        };

        minor_axis = ellipse.minor;
        if ellipse.minor >= config.min_minor_axis {
            tracing::debug!(
                "Object at ({:.2}, {:.2}) after {} rounds, {} px, minor axis {:.2}",
                ellipse.center.x,
                ellipse.center.y,
                round,
                ellipse.area,
                ellipse.minor
            );
            return Ok(LocatedObject {
                center: ellipse.center,
                ellipse,
                refinements: round,
            });
        }

        for &(x, y) in &region.pixels {
            mask[(x, y)] = false;
        }
        match center_of_mass(&mask) {
            Some(next) => center = next,
            None => {
                return Err(LocalizationError::NotConverged {
                    rounds: round,
                    minor_axis,
                });
            }
        }
    }

    tracing::warn!(
        "Localization gave up after {} rounds, minor axis {:.3}",
        config.max_refinements,
        minor_axis
    );
    Err(LocalizationError::NotConverged {
        rounds: config.max_refinements,
        minor_axis,
    })
}

/// Locate the object on the maximum projection of `stack` onto `plane`.
///
/// Coordinates follow the projection axes: `(x, y)` for XY, `(x, z)` for XZ
/// and `(y, z)` for YZ.
pub fn locate_in_plane(
    stack: &Stack,
    plane: Plane,
    config: &LocalizationConfig,
) -> Result<LocatedObject, LocalizationError> {
    locate_in_image(&stack.max_projection(plane), config)
}

/// Sub-voxel centroid of the bead in `stack`.
pub fn locate_centroid(
    stack: &Stack,
    config: &LocalizationConfig,
) -> Result<Centroid, LocalizationError> {
    let lateral = locate_in_plane(stack, Plane::XY, config)?;
    let z = if stack.depth() > 1 {
        Some(locate_in_plane(stack, Plane::XZ, config)?.center.y)
    } else {
        None
    };

    Ok(Centroid {
        x: lateral.center.x,
        y: lateral.center.y,
        z,
    })
}
