//! Field illumination flatness.
//!
//! A uniformly fluorescent sample imaged through the full field shows how
//! evenly the field is lit. Every channel of one plane is reduced to the
//! position of its brightest pixel, its intensity center of mass and the
//! relative intensity at the corners and edge midpoints of the image.

mod error;

#[cfg(test)]
mod tests;

pub use error::IlluminationError;

use common::Buffer2;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::candidates::fov_window;
use crate::math::calibrated_distance;
use crate::volume::{Volume, VoxelCalibration};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IlluminationConfig {
    /// Time point to analyze.
    pub frame: usize,
    /// Z plane to analyze.
    pub plane: usize,
    /// Side of a central window to restrict the analysis to. The full field
    /// is used when unset.
    pub fov_size: Option<usize>,
}

impl IlluminationConfig {
    pub fn validate(&self) {
        if let Some(fov) = self.fov_size {
            assert!(fov >= 1, "fov_size must be at least 1");
        }
    }
}

// ============================================================================
// Landmarks
// ============================================================================

/// Reference pixels on the image border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopMiddle,
    BottomMiddle,
    LeftMiddle,
    RightMiddle,
}

impl Landmark {
    pub const ALL: [Landmark; 8] = [
        Landmark::TopLeft,
        Landmark::TopRight,
        Landmark::BottomLeft,
        Landmark::BottomRight,
        Landmark::TopMiddle,
        Landmark::BottomMiddle,
        Landmark::LeftMiddle,
        Landmark::RightMiddle,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Landmark::TopLeft | Landmark::TopRight | Landmark::BottomLeft | Landmark::BottomRight
        )
    }

    /// Pixel of this landmark on a `width x height` image. Edge midpoints
    /// sit at `width / 2` and `height / 2`.
    pub fn position(self, width: usize, height: usize) -> (usize, usize) {
        let (right, bottom) = (width - 1, height - 1);
        match self {
            Landmark::TopLeft => (0, 0),
            Landmark::TopRight => (right, 0),
            Landmark::BottomLeft => (0, bottom),
            Landmark::BottomRight => (right, bottom),
            Landmark::TopMiddle => (width / 2, 0),
            Landmark::BottomMiddle => (width / 2, bottom),
            Landmark::LeftMiddle => (0, height / 2),
            Landmark::RightMiddle => (right, height / 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkIntensity {
    pub landmark: Landmark,
    pub x: usize,
    pub y: usize,
    pub intensity: f32,
    /// `intensity` over the image maximum.
    pub relative: f64,
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IlluminationReport {
    /// Reference center `(width / 2, height / 2)`.
    pub image_center: DVec2,
    /// Intensity-weighted center of mass.
    pub intensity_center: DVec2,
    /// Distance from the image center to the center of mass, in micrometers.
    pub center_offset_um: f64,
    pub max_value: f32,
    /// Last pixel in scan order holding `max_value`.
    pub max_position: (usize, usize),
    /// Distance from the image center to the brightest pixel, in micrometers.
    pub max_offset_um: f64,
    pub landmarks: Vec<LandmarkIntensity>,
    /// Darkest corner relative to the maximum, at most 1.
    pub min_corner_relative: f64,
}

impl IlluminationReport {
    pub fn landmark(&self, landmark: Landmark) -> Option<&LandmarkIntensity> {
        self.landmarks.iter().find(|l| l.landmark == landmark)
    }
}

/// Distance between two pixel positions in the XY plane, in micrometers.
fn lateral_distance(a: DVec2, b: DVec2, calibration: &VoxelCalibration) -> f64 {
    calibrated_distance(a.extend(0.0), b.extend(0.0), calibration.voxel_size())
}

/// Measure illumination flatness of one image.
pub fn analyze_illumination(
    image: &Buffer2<f32>,
    calibration: &VoxelCalibration,
) -> Result<IlluminationReport, IlluminationError> {
    let (width, height) = (image.width(), image.height());

    let mut max_value = f32::NEG_INFINITY;
    let mut max_idx = 0;
    let mut total = 0.0f64;
    let mut weighted = DVec2::ZERO;
    for (idx, &value) in image.iter().enumerate() {
        if value >= max_value {
            max_value = value;
            max_idx = idx;
        }
        let (x, y) = image.coords(idx);
        total += value as f64;
        weighted += DVec2::new(x as f64, y as f64) * value as f64;
    }
    if image.is_empty() || max_value <= 0.0 || total <= 0.0 {
        return Err(IlluminationError::NoSignal);
    }

    let image_center = DVec2::new((width / 2) as f64, (height / 2) as f64);
    let intensity_center = weighted / total;
    let max_position = image.coords(max_idx);
    let max_pos = DVec2::new(max_position.0 as f64, max_position.1 as f64);

    let landmarks: Vec<LandmarkIntensity> = Landmark::ALL
        .iter()
        .map(|&landmark| {
            let (x, y) = landmark.position(width, height);
            let intensity = image[(x, y)];
            LandmarkIntensity {
                landmark,
                x,
                y,
                intensity,
                relative: intensity as f64 / max_value as f64,
            }
        })
        .collect();
    let min_corner_relative = landmarks
        .iter()
        .filter(|l| l.landmark.is_corner())
        .map(|l| l.relative)
        .fold(1.0, f64::min);

    let report = IlluminationReport {
        image_center,
        intensity_center,
        center_offset_um: lateral_distance(image_center, intensity_center, calibration),
        max_value,
        max_position,
        max_offset_um: lateral_distance(image_center, max_pos, calibration),
        landmarks,
        min_corner_relative,
    };

    tracing::debug!(
        "Illumination {}x{}: center of mass ({:.2}, {:.2}), {:.3} um off center, darkest corner {:.3}",
        width,
        height,
        report.intensity_center.x,
        report.intensity_center.y,
        report.center_offset_um,
        report.min_corner_relative
    );

    Ok(report)
}

/// Measure illumination flatness of every channel of one plane.
pub fn analyze_illumination_field(
    volume: &Volume,
    config: &IlluminationConfig,
) -> Result<Vec<IlluminationReport>, IlluminationError> {
    config.validate();

    let depth = volume.shape().depth;
    if config.plane >= depth {
        return Err(IlluminationError::PlaneOutOfRange {
            plane: config.plane,
            depth,
        });
    }

    let reports = volume
        .channel_stacks(config.frame)?
        .iter()
        .map(|stack| {
            let stack = match config.fov_size {
                Some(fov) => stack.crop(fov_window(stack.width(), stack.height(), fov))?,
                None => stack.clone(),
            };
            analyze_illumination(&stack.data().plane_buffer(config.plane), &stack.calibration())
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        "Field illumination of {} channels, darkest corner {:.3}",
        reports.len(),
        reports
            .iter()
            .map(|r| r.min_corner_relative)
            .fold(1.0, f64::min)
    );

    Ok(reports)
}
