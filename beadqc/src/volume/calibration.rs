//! Physical voxel size with unit normalization.
//!
//! Every physical quantity downstream of this module is expressed in
//! micrometers. Nanometer calibrations are converted on construction.

use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{Axis, VolumeError};

/// Length unit attached to a voxel calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    Micrometer,
    Nanometer,
}

impl LengthUnit {
    #[inline]
    pub fn to_micrometers(self, value: f64) -> f64 {
        match self {
            LengthUnit::Micrometer => value,
            LengthUnit::Nanometer => value / 1000.0,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "micron" | "microns" | "um" | "µm" | "μm" | "micrometer" | "micrometers" => {
                Ok(LengthUnit::Micrometer)
            }
            "nm" | "nanometer" | "nanometers" => Ok(LengthUnit::Nanometer),
            _ => Err(VolumeError::UnknownUnit(s.to_string())),
        }
    }
}

/// Physical size of one voxel along X, Y and Z, in micrometers.
///
/// Deserialization goes through [`VoxelCalibration::micrometers`], so every
/// size is positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CalibrationRepr")]
pub struct VoxelCalibration {
    voxel_size: DVec3,
}

#[derive(Deserialize)]
struct CalibrationRepr {
    voxel_size: DVec3,
}

impl TryFrom<CalibrationRepr> for VoxelCalibration {
    type Error = VolumeError;

    fn try_from(repr: CalibrationRepr) -> Result<Self, Self::Error> {
        let size = repr.voxel_size;
        Self::micrometers(size.x, size.y, size.z)
    }
}

impl Default for VoxelCalibration {
    fn default() -> Self {
        Self {
            voxel_size: DVec3::ONE,
        }
    }
}

impl VoxelCalibration {
    /// Build a calibration from sizes expressed in `unit`.
    pub fn new(
        pixel_width: f64,
        pixel_height: f64,
        voxel_depth: f64,
        unit: LengthUnit,
    ) -> Result<Self, VolumeError> {
        for (axis, value) in [
            (Axis::X, pixel_width),
            (Axis::Y, pixel_height),
            (Axis::Z, voxel_depth),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(VolumeError::InvalidVoxelSize { axis, value });
            }
        }

        Ok(Self {
            voxel_size: DVec3::new(
                unit.to_micrometers(pixel_width),
                unit.to_micrometers(pixel_height),
                unit.to_micrometers(voxel_depth),
            ),
        })
    }

    pub fn micrometers(
        pixel_width: f64,
        pixel_height: f64,
        voxel_depth: f64,
    ) -> Result<Self, VolumeError> {
        Self::new(pixel_width, pixel_height, voxel_depth, LengthUnit::Micrometer)
    }

    /// Build a calibration from a free-form unit string such as `"nm"` or `"micron"`.
    pub fn with_unit_str(
        pixel_width: f64,
        pixel_height: f64,
        voxel_depth: f64,
        unit: &str,
    ) -> Result<Self, VolumeError> {
        Self::new(pixel_width, pixel_height, voxel_depth, unit.parse()?)
    }

    #[inline]
    pub fn voxel_size(&self) -> DVec3 {
        self.voxel_size
    }

    #[inline]
    pub fn pixel_width(&self) -> f64 {
        self.voxel_size.x
    }

    #[inline]
    pub fn pixel_height(&self) -> f64 {
        self.voxel_size.y
    }

    #[inline]
    pub fn voxel_depth(&self) -> f64 {
        self.voxel_size.z
    }

    /// Sample spacing along `axis`.
    #[inline]
    pub fn spacing(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.voxel_size.x,
            Axis::Y => self.voxel_size.y,
            Axis::Z => self.voxel_size.z,
        }
    }
}
