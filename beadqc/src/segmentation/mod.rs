//! Adaptive multi-class histogram segmentation.
//!
//! Splits the observed intensity range of a histogram into `N` contiguous
//! classes by iterating two steps until the class limits stop moving:
//!
//! 1. Weighted mean intensity of every class (count or log-count weights).
//! 2. Every interior limit moves to the floor of the midpoint between the
//!    means of the two classes it separates.
//!
//! Class `i` covers `[limits[i], limits[i + 1])`; the top class is closed
//! and also holds `limits[N]`, the brightest observed value.

mod config;
mod error;
mod histogram;


#[cfg(feature = "bench")]
pub mod bench;

pub use config::{SegmentationConfig, Weighting};
pub use error::SegmentationError;
pub use histogram::Histogram;

use std::ops::Range;

use common::Buffer2;
use serde::{Deserialize, Serialize};

use crate::volume::Stack;

// ============================================================================
// Class limits
// ============================================================================

/// How the limit update loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Convergence {
    /// Displacement fell to the tolerance after `iterations` updates.
    Converged { iterations: usize },
    /// The iteration budget ran out with `displacement` still above tolerance.
    BudgetExhausted { iterations: usize, displacement: f64 },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Convergence::Converged { iterations }
            | Convergence::BudgetExhausted { iterations, .. } => iterations,
        }
    }
}

/// `N + 1` non-decreasing breakpoints, `limits[0]` = observed minimum and
/// `limits[N]` = observed maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLimits {
    limits: Vec<usize>,
    convergence: Convergence,
}

impl ClassLimits {
    #[inline]
    pub fn limits(&self) -> &[usize] {
        &self.limits
    }

    #[inline]
    pub fn class_count(&self) -> usize {
        self.limits.len() - 1
    }

    #[inline]
    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    /// Intensities belonging to `class`.
    pub fn value_range(&self, class: usize) -> Range<usize> {
        let lo = self.limits[class];
        let hi = self.limits[class + 1];
        if class + 1 == self.class_count() {
            lo..hi + 1
        } else {
            lo..hi
        }
    }

    /// Class holding `value`. Values below the observed minimum fall in the
    /// first class and values above the maximum in the last.
    pub fn class_of(&self, value: f64) -> usize {
        let interior = &self.limits[1..self.class_count()];
        interior.partition_point(|&limit| limit as f64 <= value)
    }
}

/// Run the limit update loop on `histogram`.
pub fn compute_limits(
    histogram: &Histogram,
    config: &SegmentationConfig,
) -> Result<ClassLimits, SegmentationError> {
    config.validate();
    let n = config.classes;
    let (min, max) = (histogram.min(), histogram.max());

    let step = (max - min) / n;
    let mut limits: Vec<usize> = (0..=n).map(|i| min + i * step).collect();
    limits[n] = max;

    let mut means = vec![0.0f64; n];
    let mut iterations = 0;
    let mut displacement;
    loop {
        for (class, mean) in means.iter_mut().enumerate() {
            let lo = limits[class];
            let hi = if class + 1 == n {
                limits[class + 1] + 1
            } else {
                limits[class + 1]
            };

            let (sum, weight) = (lo..hi).fold((0.0, 0.0), |(sum, weight), v| {
                let w = config.weighting.weight(histogram.count(v));
                (sum + v as f64 * w, weight + w)
            });
            if weight == 0.0 {
                return Err(SegmentationError::DegenerateClass {
                    class,
                    iteration: iterations,
                });
            }
            *mean = sum / weight;
        }

        displacement = 0.0;
        for i in 1..n {
            let updated = ((means[i - 1] + means[i]) / 2.0).floor() as usize;
            displacement += (updated as f64 - limits[i] as f64).abs();
            limits[i] = updated;
        }
        iterations += 1;

        if displacement <= config.tolerance || iterations >= config.max_iterations {
            break;
        }
    }

    let convergence = if displacement <= config.tolerance {
        Convergence::Converged { iterations }
    } else {
        tracing::warn!(
            "Class limits did not settle within {} iterations, displacement {}",
            iterations,
            displacement
        );
        Convergence::BudgetExhausted {
            iterations,
            displacement,
        }
    };

    Ok(ClassLimits {
        limits,
        convergence,
    })
}

// ============================================================================
// Segmenter
// ============================================================================

/// Histogram plus the class limits fitted to it.
///
/// Statistics queries fail with [`SegmentationError::NotFitted`] until
/// [`HistogramSegmenter::calc_limits`] has succeeded.
#[derive(Debug, Clone)]
pub struct HistogramSegmenter {
    histogram: Histogram,
    limits: Option<ClassLimits>,
}

impl HistogramSegmenter {
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            limits: None,
        }
    }

    pub fn from_stack(stack: &Stack) -> Result<Self, SegmentationError> {
        Ok(Self::new(Histogram::from_stack(stack)?))
    }

    #[inline]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Fit class limits. A failed fit leaves the segmenter unfitted.
    pub fn calc_limits(
        &mut self,
        config: &SegmentationConfig,
    ) -> Result<&ClassLimits, SegmentationError> {
        self.limits = None;
        let limits = compute_limits(&self.histogram, config)?;
        tracing::debug!(
            "Segmented [{}, {}] into {} classes: {:?} ({:?})",
            self.histogram.min(),
            self.histogram.max(),
            config.classes,
            limits.limits(),
            limits.convergence()
        );
        Ok(self.limits.insert(limits))
    }

    pub fn limits(&self) -> Result<&ClassLimits, SegmentationError> {
        self.limits.as_ref().ok_or(SegmentationError::NotFitted)
    }

    fn checked_range(&self, class: usize) -> Result<Range<usize>, SegmentationError> {
        let limits = self.limits()?;
        if class >= limits.class_count() {
            return Err(SegmentationError::ClassOutOfRange {
                class,
                classes: limits.class_count(),
            });
        }
        Ok(limits.value_range(class))
    }

    fn class_bins(
        &self,
        class: usize,
    ) -> Result<impl Iterator<Item = (usize, u64)> + '_, SegmentationError> {
        let range = self.checked_range(class)?;
        Ok(range.map(|v| (v, self.histogram.count(v))))
    }

    // ------------------------------------------------------------------------
    // Per-class statistics
    // ------------------------------------------------------------------------

    /// Number of samples in `class`.
    pub fn count(&self, class: usize) -> Result<u64, SegmentationError> {
        Ok(self.class_bins(class)?.map(|(_, c)| c).sum())
    }

    /// Count-weighted mean intensity of `class`.
    pub fn mean(&self, class: usize) -> Result<f64, SegmentationError> {
        let (sum, count) = self
            .class_bins(class)?
            .fold((0.0, 0u64), |(sum, count), (v, c)| {
                (sum + v as f64 * c as f64, count + c)
            });
        if count == 0 {
            return Err(SegmentationError::EmptyClass { class });
        }
        Ok(sum / count as f64)
    }

    /// First intensity at which the cumulative count of `class` reaches half
    /// its total.
    pub fn median(&self, class: usize) -> Result<usize, SegmentationError> {
        let half = self.count(class)? as f64 / 2.0;
        if half == 0.0 {
            return Err(SegmentationError::EmptyClass { class });
        }
        let mut cumulative = 0u64;
        for (v, c) in self.class_bins(class)? {
            cumulative += c;
            if c > 0 && cumulative as f64 >= half {
                return Ok(v);
            }
        }
        Err(SegmentationError::EmptyClass { class })
    }

    /// Sum of `value * count` over `class`.
    pub fn integrated(&self, class: usize) -> Result<u64, SegmentationError> {
        Ok(self
            .class_bins(class)?
            .map(|(v, c)| v as u64 * c)
            .sum())
    }

    fn all<T>(
        &self,
        query: impl Fn(&Self, usize) -> Result<T, SegmentationError>,
    ) -> Result<Vec<T>, SegmentationError> {
        let classes = self.limits()?.class_count();
        (0..classes).map(|class| query(self, class)).collect()
    }

    pub fn counts(&self) -> Result<Vec<u64>, SegmentationError> {
        self.all(Self::count)
    }

    pub fn means(&self) -> Result<Vec<f64>, SegmentationError> {
        self.all(Self::mean)
    }

    pub fn medians(&self) -> Result<Vec<usize>, SegmentationError> {
        self.all(Self::median)
    }

    pub fn integrated_all(&self) -> Result<Vec<u64>, SegmentationError> {
        self.all(Self::integrated)
    }

    // ------------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------------

    pub fn classify(&self, value: f32) -> Result<usize, SegmentationError> {
        Ok(self.limits()?.class_of(value as f64))
    }

    /// Class index of every pixel.
    pub fn label(&self, image: &Buffer2<f32>) -> Result<Buffer2<usize>, SegmentationError> {
        let limits = self.limits()?;
        Ok(image.map(|&v| limits.class_of(v as f64)))
    }

    /// Pixels belonging to `class` or any brighter class.
    pub fn mask(
        &self,
        image: &Buffer2<f32>,
        class: usize,
    ) -> Result<Buffer2<bool>, SegmentationError> {
        let threshold = self.checked_range(class)?.start as f32;
        Ok(image.map(|&v| v >= threshold))
    }
}
