//! Axis profiles through a bead and their Gaussian fits.
//!
//! Each profile is sampled at physical coordinates `i * spacing` and fitted
//! with a Gaussian on a constant pedestal by Levenberg-Marquardt. The FWHM of
//! the fit, scaled by a per-axis correction factor, is the measured
//! resolution along that axis.

mod error;
mod gaussian;
mod linear_solver;
mod lm_optimizer;

#[cfg(test)]
mod tests;

#[cfg(feature = "bench")]
pub mod bench;

pub use error::ProfileError;
pub use gaussian::GaussianParams;
pub use lm_optimizer::{LMConfig, LMStatus};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::localization::{MaxVoxel, max_voxel};
use crate::math::r_squared;
use crate::volume::{Axis, Stack};
use gaussian::PedestalGaussian;
use lm_optimizer::{LMModel, optimize};

// ============================================================================
// Single profile
// ============================================================================

/// One axis profile with its fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedProfile {
    pub axis: Axis,
    /// Physical sample coordinates.
    pub coordinates: Vec<f64>,
    pub raw: Vec<f64>,
    /// Model evaluated at `coordinates`.
    pub fitted: Vec<f64>,
    pub params: GaussianParams,
    pub r_squared: f64,
    /// Corrected FWHM, in the unit of the spacing.
    pub fwhm: f64,
    pub iterations: usize,
}

/// Fit the pedestal Gaussian to `samples` spaced `spacing` apart.
///
/// Seeds: baseline at the minimum sample, peak and center at the first
/// maximum sample, width at twice the spacing.
pub fn fit_profile(
    axis: Axis,
    samples: &[f32],
    spacing: f64,
    correction: f64,
    config: &LMConfig,
) -> Result<FittedProfile, ProfileError> {
    config.validate();
    assert!(
        spacing.is_finite() && spacing > 0.0,
        "spacing must be positive, got {spacing}"
    );

    if samples.len() < 4 {
        return Err(ProfileError::TooFewSamples {
            axis,
            len: samples.len(),
        });
    }

    let coordinates: Vec<f64> = (0..samples.len()).map(|i| i as f64 * spacing).collect();
    let raw: Vec<f64> = samples.iter().map(|&v| v as f64).collect();

    let mut seed = [raw[0], raw[0], coordinates[0], 2.0 * spacing];
    for (&x, &v) in coordinates.iter().zip(&raw) {
        seed[0] = seed[0].min(v);
        if v > seed[1] {
            seed[1] = v;
            seed[2] = x;
        }
    }

    let model = PedestalGaussian {
        min_width: spacing * 1e-6,
    };
    let result = optimize(&model, &coordinates, &raw, seed, config);
    let params = GaussianParams::from_array(result.params);

    if !params.is_finite() || !result.chi2.is_finite() {
        return Err(ProfileError::NonFinite { axis });
    }
    if !result.is_success() {
        tracing::warn!(
            "{:?} profile fit failed after {} iterations: {:?}",
            axis,
            result.iterations,
            result.status
        );
        return Err(ProfileError::FitDiverged {
            axis,
            iterations: result.iterations,
            status: result.status,
        });
    }

    let fitted: Vec<f64> = coordinates
        .iter()
        .map(|&x| model.evaluate(x, &result.params))
        .collect();
    let r_squared = r_squared(&raw, &fitted);
    let fwhm = params.fwhm() * correction;

    tracing::debug!(
        "{:?} profile: center {:.4}, FWHM {:.4}, R2 {:.4}, {} iterations",
        axis,
        params.center,
        fwhm,
        r_squared,
        result.iterations
    );

    Ok(FittedProfile {
        axis,
        coordinates,
        raw,
        fitted,
        params,
        r_squared,
        fwhm,
        iterations: result.iterations,
    })
}

// ============================================================================
// Bead PSF
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsfConfig {
    /// Multiplier applied to each axis FWHM.
    pub correction: DVec3,
    pub fit: LMConfig,
}

impl Default for PsfConfig {
    fn default() -> Self {
        Self {
            correction: DVec3::ONE,
            fit: LMConfig::default(),
        }
    }
}

impl PsfConfig {
    pub fn validate(&self) {
        assert!(
            self.correction.is_finite() && self.correction.min_element() > 0.0,
            "correction factors must be positive, got {}",
            self.correction
        );
        self.fit.validate();
    }
}

/// Measured PSF of one bead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsfProfile {
    /// Voxel the three profiles pass through.
    pub peak: MaxVoxel,
    pub x: FittedProfile,
    pub y: FittedProfile,
    pub z: FittedProfile,
    /// Corrected FWHM per axis, in micrometers.
    pub fwhm: DVec3,
    pub r_squared: DVec3,
}

impl PsfProfile {
    pub fn profile(&self, axis: Axis) -> &FittedProfile {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Fit X, Y and Z profiles through the brightest voxel of `stack`.
pub fn profile_psf(stack: &Stack, config: &PsfConfig) -> Result<PsfProfile, ProfileError> {
    config.validate();
    if stack.depth() < 2 {
        return Err(ProfileError::SinglePlane);
    }

    let peak = max_voxel(stack);
    let data = stack.data();
    let calibration = stack.calibration();

    let fit_axis = |axis: Axis, line: Vec<f32>, correction: f64| {
        fit_profile(
            axis,
            &line,
            calibration.spacing(axis),
            correction,
            &config.fit,
        )
    };
    let x = fit_axis(Axis::X, data.line_x(peak.y, peak.z), config.correction.x)?;
    let y = fit_axis(Axis::Y, data.line_y(peak.x, peak.z), config.correction.y)?;
    let z = fit_axis(Axis::Z, data.line_z(peak.x, peak.y), config.correction.z)?;

    Ok(PsfProfile {
        peak,
        fwhm: DVec3::new(x.fwhm, y.fwhm, z.fwhm),
        r_squared: DVec3::new(x.r_squared, y.r_squared, z.r_squared),
        x,
        y,
        z,
    })
}
