//! Stage repositioning repeatability from tracked bead positions.
//!
//! A bead is imaged after repeatedly moving the stage away and back. The
//! first position of each track is the reference; the displacement is the
//! largest deviation from it along X and along Y.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::volume::VoxelCalibration;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageDisplacement {
    /// Largest `|x - x0|` and `|y - y0|`, in pixels.
    pub pixels: DVec2,
    /// Same deviations in micrometers.
    pub micrometers: DVec2,
}

impl StageDisplacement {
    /// Component-wise maximum of two displacements.
    pub fn max(self, other: Self) -> Self {
        Self {
            pixels: self.pixels.max(other.pixels),
            micrometers: self.micrometers.max(other.micrometers),
        }
    }
}

/// Largest deviation of `track` from its first position. `None` for an
/// empty track.
pub fn stage_displacement(
    track: &[DVec2],
    calibration: &VoxelCalibration,
) -> Option<StageDisplacement> {
    let (&origin, rest) = track.split_first()?;
    let pixels = rest
        .iter()
        .map(|&p| (p - origin).abs())
        .fold(DVec2::ZERO, DVec2::max);
    let scale = DVec2::new(calibration.pixel_width(), calibration.pixel_height());

    Some(StageDisplacement {
        pixels,
        micrometers: pixels * scale,
    })
}

/// Largest deviation over several tracks. Empty tracks are skipped and
/// `None` means no track had a position.
pub fn max_stage_displacement<'a>(
    tracks: impl IntoIterator<Item = &'a [DVec2]>,
    calibration: &VoxelCalibration,
) -> Option<StageDisplacement> {
    let result = tracks
        .into_iter()
        .filter_map(|track| stage_displacement(track, calibration))
        .reduce(StageDisplacement::max);

    if let Some(d) = result {
        tracing::debug!(
            "Stage displacement {:.3} x {:.3} um",
            d.micrometers.x,
            d.micrometers.y
        );
    }
    result
}
