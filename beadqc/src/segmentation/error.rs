//! Error types for histogram segmentation.

use thiserror::Error;

use crate::volume::SampleType;

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("Histogram requires 8- or 16-bit integer samples, got {0:?}")]
    UnsupportedSampleType(SampleType),

    #[error("Histogram has no samples")]
    EmptyHistogram,

    #[error("Class limits have not been computed")]
    NotFitted,

    #[error("Class {class} out of range for {classes} classes")]
    ClassOutOfRange { class: usize, classes: usize },

    #[error("Class {class} has zero total weight at iteration {iteration}")]
    DegenerateClass { class: usize, iteration: usize },

    #[error("Class {class} contains no samples")]
    EmptyClass { class: usize },
}
