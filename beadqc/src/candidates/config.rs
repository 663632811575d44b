//! Configuration for bead candidate detection and selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaximaConfig {
    /// A maximum is kept only if it stands more than this above the saddle
    /// towards any higher maximum.
    pub noise_tolerance: f32,
    /// Pixels at or below this value are never maxima.
    pub threshold: Option<f32>,
    /// Drop maxima whose tolerance region touches the image border.
    pub exclude_edges: bool,
}

impl Default for MaximaConfig {
    fn default() -> Self {
        Self {
            noise_tolerance: 100.0,
            threshold: None,
            exclude_edges: true,
        }
    }
}

impl MaximaConfig {
    pub fn validate(&self) {
        assert!(
            self.noise_tolerance.is_finite() && self.noise_tolerance >= 0.0,
            "noise_tolerance must be finite and non-negative, got {}",
            self.noise_tolerance
        );
        if let Some(threshold) = self.threshold {
            assert!(!threshold.is_nan(), "threshold must not be NaN");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of beads to keep.
    pub count: usize,
    /// Accepted beads are strictly farther apart than this, in pixels.
    pub min_separation: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            count: 3,
            min_separation: 15.0,
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) {
        assert!(
            self.min_separation.is_finite() && self.min_separation >= 0.0,
            "min_separation must be finite and non-negative, got {}",
            self.min_separation
        );
    }
}
