//! Configuration for the iterative class-limit solver.

use serde::{Deserialize, Serialize};

/// How histogram counts weigh an intensity value when computing class means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weighting {
    /// Weight is the raw occurrence count.
    #[default]
    Linear,
    /// Weight is `ln(count)`; empty bins weigh zero.
    /// Favors sparse bright pixels, as found in fluorescence images.
    Log,
}

impl Weighting {
    #[inline]
    pub fn weight(self, count: u64) -> f64 {
        match self {
            Weighting::Linear => count as f64,
            Weighting::Log => {
                if count == 0 {
                    0.0
                } else {
                    (count as f64).ln()
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Number of intensity classes.
    pub classes: usize,
    /// Iteration budget for the limit update loop.
    pub max_iterations: usize,
    /// Stop once the summed limit displacement of one iteration is at or below this.
    pub tolerance: f64,
    pub weighting: Weighting,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            classes: 2,
            max_iterations: 1000,
            tolerance: 0.0,
            weighting: Weighting::Linear,
        }
    }
}

impl SegmentationConfig {
    /// Log-weighted preset for emission images.
    pub fn fluorescence(classes: usize) -> Self {
        Self {
            classes,
            weighting: Weighting::Log,
            ..Self::default()
        }
    }

    /// Linear-weighted preset for transmitted-light images.
    pub fn transmission(classes: usize) -> Self {
        Self {
            classes,
            weighting: Weighting::Linear,
            ..Self::default()
        }
    }

    pub fn validate(&self) {
        assert!(self.classes >= 1, "classes must be at least 1");
        assert!(
            self.max_iterations >= 1,
            "max_iterations must be at least 1"
        );
        assert!(
            self.tolerance.is_finite() && self.tolerance >= 0.0,
            "tolerance must be finite and non-negative, got {}",
            self.tolerance
        );
    }
}
