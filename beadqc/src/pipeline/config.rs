//! Configuration for whole-field bead analysis.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::candidates::{MaximaConfig, SelectionConfig};
use crate::localization::LocalizationConfig;
use crate::optics::OpticalSetup;
use crate::profile::PsfConfig;

/// Side of the central analysis window.
pub const DEFAULT_FOV_SIZE: usize = 300;

/// Settings shared by both field analyses: where to look for beads and how
/// large a crop each bead gets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeadSearchConfig {
    /// Time point to analyze.
    pub frame: usize,
    /// Side of the central window searched for beads.
    pub fov_size: usize,
    pub maxima: MaximaConfig,
    pub selection: SelectionConfig,
    /// Nominal bead diameter in micrometers.
    pub bead_size_um: f64,
    /// Lower bound on the side of a bead crop, in pixels.
    pub min_crop_size: usize,
}

impl Default for BeadSearchConfig {
    fn default() -> Self {
        Self {
            frame: 0,
            fov_size: DEFAULT_FOV_SIZE,
            maxima: MaximaConfig::default(),
            selection: SelectionConfig::default(),
            bead_size_um: 1.0,
            min_crop_size: 20,
        }
    }
}

impl BeadSearchConfig {
    pub fn validate(&self) {
        assert!(self.fov_size >= 1, "fov_size must be at least 1");
        assert!(
            self.bead_size_um.is_finite() && self.bead_size_um > 0.0,
            "bead_size_um must be positive, got {}",
            self.bead_size_um
        );
        assert!(self.min_crop_size >= 1, "min_crop_size must be at least 1");
        self.maxima.validate();
        self.selection.validate();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsfFieldConfig {
    /// Channel holding the beads.
    pub channel: usize,
    pub search: BeadSearchConfig,
    pub psf: PsfConfig,
    /// When set, the theoretical resolution is reported next to the
    /// measurements.
    pub optics: Option<OpticalSetup>,
}

impl Default for PsfFieldConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            search: BeadSearchConfig::default(),
            psf: PsfConfig {
                correction: DVec3::splat(1.186),
                ..Default::default()
            },
            optics: None,
        }
    }
}

impl PsfFieldConfig {
    pub fn validate(&self) {
        self.search.validate();
        self.psf.validate();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoregFieldConfig {
    /// Channel whose projection is searched for beads.
    pub detection_channel: usize,
    pub search: BeadSearchConfig,
    pub localization: LocalizationConfig,
    /// Optics per channel. Empty means the default setup for every channel.
    pub optics: Vec<OpticalSetup>,
}

impl Default for CoregFieldConfig {
    fn default() -> Self {
        Self {
            detection_channel: 0,
            search: BeadSearchConfig {
                min_crop_size: 35,
                ..Default::default()
            },
            localization: LocalizationConfig::default(),
            optics: Vec::new(),
        }
    }
}

impl CoregFieldConfig {
    pub fn validate(&self) {
        self.search.validate();
        self.localization.validate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        PsfFieldConfig::default().validate();
        CoregFieldConfig::default().validate();
    }

    #[test]
    fn test_crop_minimums_differ() {
        assert_eq!(PsfFieldConfig::default().search.min_crop_size, 20);
        assert_eq!(CoregFieldConfig::default().search.min_crop_size, 35);
    }

    #[test]
    #[should_panic(expected = "bead_size_um must be positive")]
    fn test_bead_size_checked() {
        let mut config = PsfFieldConfig::default();
        config.search.bead_size_um = 0.0;
        config.validate();
    }

    #[test]
    fn test_json_overrides() {
        let config: CoregFieldConfig = serde_json::from_str(
            r#"{
                "detection_channel": 1,
                "search": { "bead_size_um": 0.2, "selection": { "count": 5 } },
                "optics": [
                    { "microscope": "Confocal", "emission_wavelength_nm": 520.0 },
                    { "emission_wavelength_nm": 650.0 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.detection_channel, 1);
        assert_eq!(config.search.selection.count, 5);
        assert_eq!(config.search.selection.min_separation, 15.0);
        assert_eq!(config.search.fov_size, DEFAULT_FOV_SIZE);
        // Nested defaults come from the nested type, not the parent.
        assert_eq!(config.search.min_crop_size, 20);
        assert_eq!(config.optics.len(), 2);
        assert_eq!(config.optics[1].numerical_aperture, 1.4);
    }
}
