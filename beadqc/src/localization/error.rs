use thiserror::Error;

use crate::segmentation::SegmentationError;

#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("Segmented mask has no foreground pixels")]
    EmptyMask,

    #[error("No foreground pixel at or right of seed ({x}, {y})")]
    SeedOutsideMask { x: usize, y: usize },

    #[error("Localization did not converge after {rounds} rounds, last minor axis {minor_axis:.3}")]
    NotConverged { rounds: usize, minor_axis: f64 },
}
