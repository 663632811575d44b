//! Cross-channel registration of a single bead.
//!
//! Every channel of a bead crop is localized independently; each pair of
//! channels is then compared by the shift between their centroids, the
//! physical distance of that shift and the resolution-limited reference
//! distance along the same direction.

mod error;


pub use error::CoregistrationError;

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::localization::{Centroid, LocalizationConfig, locate_centroid};
use crate::math::calibrated_distance;
use crate::optics::ResolutionVector;
use crate::volume::{Stack, VoxelCalibration, validate_matching_stacks};

/// Comparison of two channel centroids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelPair {
    pub first: usize,
    pub second: usize,
    /// `second - first`, in voxels.
    pub shift: DVec3,
    /// Length of `shift` in voxels.
    pub pixel_distance: f64,
    /// Length of `shift` in micrometers.
    pub calibrated_distance: f64,
    /// Resolution limit along the shift direction, in micrometers.
    pub reference_distance: f64,
}

impl ChannelPair {
    /// The shift is not larger than the resolution limit along its direction.
    pub fn within_resolution(&self) -> bool {
        self.calibrated_distance <= self.reference_distance
    }

    /// Distance relative to the reference distance.
    pub fn ratio(&self) -> f64 {
        self.calibrated_distance / self.reference_distance
    }
}

/// Resolution-limited distance along the direction of `shift_um`.
///
/// `theta` is the polar angle from the optical axis and `phi` the azimuth
/// in the XY plane; the result is the length of
/// `(r_x sinθ cosφ, r_y sinθ sinφ, r_z cosθ)`. A zero shift uses `θ = 0`
/// and a purely axial shift uses `φ = π/2`.
pub fn reference_distance(shift_um: DVec3, resolution: ResolutionVector) -> f64 {
    let lateral = shift_um.x.hypot(shift_um.y);
    let total = shift_um.length();

    let theta = if total != 0.0 {
        (shift_um.z / total).clamp(-1.0, 1.0).acos()
    } else {
        0.0
    };
    let phi = if lateral != 0.0 {
        (shift_um.x / lateral).clamp(-1.0, 1.0).acos()
    } else {
        FRAC_PI_2
    };

    let r = resolution.0;
    DVec3::new(
        r.x * theta.sin() * phi.cos(),
        r.y * theta.sin() * phi.sin(),
        r.z * theta.cos(),
    )
    .length()
}

/// Compare every pair `(i, j)`, `i < j`, of `centroids`.
///
/// `resolutions[i]` belongs to channel `i`; a pair is judged against the
/// component-wise maximum of its two vectors.
pub fn analyze_pairs(
    centroids: &[Centroid],
    calibration: &VoxelCalibration,
    resolutions: &[ResolutionVector],
) -> Result<Vec<ChannelPair>, CoregistrationError> {
    if centroids.len() < 2 {
        return Err(CoregistrationError::TooFewChannels {
            count: centroids.len(),
        });
    }
    if resolutions.len() != centroids.len() {
        return Err(CoregistrationError::ResolutionCountMismatch {
            channels: centroids.len(),
            resolutions: resolutions.len(),
        });
    }
    let is_3d = centroids[0].is_3d();
    if centroids.iter().any(|c| c.is_3d() != is_3d) {
        return Err(CoregistrationError::MixedDimensionality);
    }

    let voxel_size = calibration.voxel_size();
    let mut pairs = Vec::with_capacity(centroids.len() * (centroids.len() - 1) / 2);
    for first in 0..centroids.len() {
        for second in first + 1..centroids.len() {
            let a = centroids[first].position();
            let b = centroids[second].position();
            let shift = b - a;
            let resolution = resolutions[first].max(resolutions[second]);

            pairs.push(ChannelPair {
                first,
                second,
                shift,
                pixel_distance: shift.length(),
                calibrated_distance: calibrated_distance(a, b, voxel_size),
                reference_distance: reference_distance(shift * voxel_size, resolution),
            });
        }
    }
    Ok(pairs)
}

/// Centroids and pairwise comparisons of one multi-channel bead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoregistrationReport {
    pub centroids: Vec<Centroid>,
    /// Theoretical resolution of every channel, in voxels.
    pub resolutions_px: Vec<DVec3>,
    pub pairs: Vec<ChannelPair>,
}

/// Localize the bead in every channel stack and compare all channel pairs.
///
/// The stacks must share dimensions and sample type; the calibration of the
/// first stack applies to all.
pub fn coregister_stacks(
    stacks: &[Stack],
    resolutions: &[ResolutionVector],
    config: &LocalizationConfig,
) -> Result<CoregistrationReport, CoregistrationError> {
    if stacks.len() < 2 {
        return Err(CoregistrationError::TooFewChannels {
            count: stacks.len(),
        });
    }
    validate_matching_stacks(stacks)?;

    let centroids = stacks
        .iter()
        .enumerate()
        .map(|(channel, stack)| {
            locate_centroid(stack, config)
                .map_err(|source| CoregistrationError::Localization { channel, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let calibration = stacks[0].calibration();
    let pairs = analyze_pairs(&centroids, &calibration, resolutions)?;

    for pair in &pairs {
        tracing::debug!(
            "Channels {}-{}: {:.4} um (reference {:.4} um)",
            pair.first,
            pair.second,
            pair.calibrated_distance,
            pair.reference_distance
        );
    }

    Ok(CoregistrationReport {
        resolutions_px: resolutions
            .iter()
            .map(|r| r.in_pixels(&calibration))
            .collect(),
        centroids,
        pairs,
    })
}
