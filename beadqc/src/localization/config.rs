//! Configuration for centroid localization.

use serde::{Deserialize, Serialize};

use crate::segmentation::{SegmentationConfig, Weighting};

/// Pixel connectivity used when growing the object region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Only horizontal and vertical neighbors.
    Four,
    /// Diagonal neighbors too.
    #[default]
    Eight,
}

impl Connectivity {
    pub(crate) fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }

    /// Connectivity of the background that pairs with this foreground
    /// connectivity without paradoxes.
    pub(crate) fn complement(self) -> Self {
        match self {
            Connectivity::Four => Connectivity::Eight,
            Connectivity::Eight => Connectivity::Four,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Minor axis (pixels) the fitted ellipse must reach before its center is
    /// accepted. Smaller regions are treated as noise speckles.
    pub min_minor_axis: f64,
    /// Budget of region-growing rounds.
    pub max_refinements: usize,
    /// Segmentation applied to the 8-bit rescaled projection. The brightest
    /// class becomes the object mask.
    pub segmentation: SegmentationConfig,
    pub connectivity: Connectivity,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            min_minor_axis: 2.0,
            max_refinements: 20,
            segmentation: SegmentationConfig {
                classes: 2,
                max_iterations: 100,
                tolerance: 0.0,
                weighting: Weighting::Log,
            },
            connectivity: Connectivity::Eight,
        }
    }
}

impl LocalizationConfig {
    pub fn validate(&self) {
        assert!(
            self.min_minor_axis.is_finite() && self.min_minor_axis >= 0.0,
            "min_minor_axis must be finite and non-negative, got {}",
            self.min_minor_axis
        );
        assert!(
            self.max_refinements >= 1,
            "max_refinements must be at least 1"
        );
        assert!(
            self.segmentation.classes >= 2,
            "segmentation needs at least 2 classes to separate object from background, got {}",
            self.segmentation.classes
        );
        self.segmentation.validate();
    }
}
