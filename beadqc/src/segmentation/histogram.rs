use common::Buffer2;
use serde::Serialize;

use super::SegmentationError;
use crate::volume::{SampleType, Stack};

/// Per-intensity occurrence counts of an 8- or 16-bit image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    counts: Vec<u64>,
    min: usize,
    max: usize,
    total: u64,
}

impl Histogram {
    pub fn from_counts(counts: Vec<u64>) -> Result<Self, SegmentationError> {
        let min = counts
            .iter()
            .position(|&c| c > 0)
            .ok_or(SegmentationError::EmptyHistogram)?;
        let max = counts
            .iter()
            .rposition(|&c| c > 0)
            .ok_or(SegmentationError::EmptyHistogram)?;
        let total = counts.iter().sum();

        Ok(Self {
            counts,
            min,
            max,
            total,
        })
    }

    /// Count samples into `2^bit_depth` bins. Out-of-range samples are clipped
    /// into the extreme bins.
    pub fn from_samples(
        samples: &[f32],
        sample_type: SampleType,
    ) -> Result<Self, SegmentationError> {
        let bins = sample_type
            .histogram_bins()
            .ok_or(SegmentationError::UnsupportedSampleType(sample_type))?;

        let top = (bins - 1) as f32;
        let mut counts = vec![0u64; bins];
        for &v in samples {
            // NaN saturates to bin 0 through the cast.
            counts[v.round().clamp(0.0, top) as usize] += 1;
        }
        Self::from_counts(counts)
    }

    pub fn from_stack(stack: &Stack) -> Result<Self, SegmentationError> {
        Self::from_samples(stack.data().voxels(), stack.sample_type())
    }

    pub fn from_image(
        image: &Buffer2<f32>,
        sample_type: SampleType,
    ) -> Result<Self, SegmentationError> {
        Self::from_samples(image.pixels(), sample_type)
    }

    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[inline]
    pub fn count(&self, value: usize) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Smallest occupied intensity.
    #[inline]
    pub fn min(&self) -> usize {
        self.min
    }

    /// Largest occupied intensity.
    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
