//! Theoretical diffraction-limited resolution of a microscope setup.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::volume::VoxelCalibration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MicroscopeType {
    #[default]
    Widefield,
    Confocal,
}

impl fmt::Display for MicroscopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicroscopeType::Widefield => write!(f, "WideField"),
            MicroscopeType::Confocal => write!(f, "Confocal"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OpticsError {
    #[error("Emission wavelength must be positive, got {0} nm")]
    InvalidWavelength(f64),

    #[error("Numerical aperture must be positive, got {0}")]
    InvalidNumericalAperture(f64),
}

/// Acquisition optics of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticalSetup {
    pub microscope: MicroscopeType,
    pub emission_wavelength_nm: f64,
    pub numerical_aperture: f64,
    /// Pinhole diameter in Airy units. Only meaningful for confocal setups
    /// and not used by the resolution formulas.
    pub pinhole_airy_units: Option<f64>,
}

impl Default for OpticalSetup {
    fn default() -> Self {
        Self {
            microscope: MicroscopeType::Widefield,
            emission_wavelength_nm: 500.0,
            numerical_aperture: 1.4,
            pinhole_airy_units: None,
        }
    }
}

impl OpticalSetup {
    pub fn widefield(emission_wavelength_nm: f64, numerical_aperture: f64) -> Self {
        Self {
            microscope: MicroscopeType::Widefield,
            emission_wavelength_nm,
            numerical_aperture,
            pinhole_airy_units: None,
        }
    }

    pub fn confocal(
        emission_wavelength_nm: f64,
        numerical_aperture: f64,
        pinhole_airy_units: f64,
    ) -> Self {
        Self {
            microscope: MicroscopeType::Confocal,
            emission_wavelength_nm,
            numerical_aperture,
            pinhole_airy_units: Some(pinhole_airy_units),
        }
    }

    pub fn resolution(&self) -> Result<ResolutionVector, OpticsError> {
        theoretical_resolution(
            self.microscope,
            self.emission_wavelength_nm,
            self.numerical_aperture,
        )
    }
}

/// Lateral X, lateral Y and axial Z resolution in micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionVector(pub DVec3);

impl ResolutionVector {
    #[inline]
    pub fn lateral(&self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn axial(&self) -> f64 {
        self.0.z
    }

    /// Resolution expressed in voxels of `calibration`.
    pub fn in_pixels(&self, calibration: &VoxelCalibration) -> DVec3 {
        self.0 / calibration.voxel_size()
    }

    /// Component-wise maximum, the resolution limit shared by two channels.
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

/// Rayleigh-type resolution limits for `microscope` at the given emission
/// wavelength (nm) and numerical aperture. The result is in micrometers.
///
/// | mode       | lateral      | axial          |
/// |------------|--------------|----------------|
/// | widefield  | 0.61·λ/NA    | 2·λ/NA²        |
/// | confocal   | 0.4·λ/NA     | 1.4·λ/NA²      |
pub fn theoretical_resolution(
    microscope: MicroscopeType,
    emission_wavelength_nm: f64,
    numerical_aperture: f64,
) -> Result<ResolutionVector, OpticsError> {
    if !(emission_wavelength_nm.is_finite() && emission_wavelength_nm > 0.0) {
        return Err(OpticsError::InvalidWavelength(emission_wavelength_nm));
    }
    if !(numerical_aperture.is_finite() && numerical_aperture > 0.0) {
        return Err(OpticsError::InvalidNumericalAperture(numerical_aperture));
    }

    let wavelength_um = emission_wavelength_nm / 1000.0;
    let (lateral_factor, axial_factor) = match microscope {
        MicroscopeType::Widefield => (0.61, 2.0),
        MicroscopeType::Confocal => (0.4, 1.4),
    };
    let lateral = lateral_factor * wavelength_um / numerical_aperture;
    let axial = axial_factor * wavelength_um / (numerical_aperture * numerical_aperture);

    Ok(ResolutionVector(DVec3::new(lateral, lateral, axial)))
}
