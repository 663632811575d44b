//! Error types for volume construction and access.

use thiserror::Error;

use super::{Axis, CropWindow, SampleType, VolumeShape};

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("Volume dimensions must be non-zero, got {shape:?}")]
    EmptyShape { shape: VolumeShape },

    #[error("Sample count mismatch: shape {shape:?} needs {expected} samples, got {actual}")]
    SampleCountMismatch {
        shape: VolumeShape,
        expected: usize,
        actual: usize,
    },

    #[error("Channel {channel} out of range, volume has {channels} channels")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("Frame {frame} out of range, volume has {frames} frames")]
    FrameOutOfRange { frame: usize, frames: usize },

    #[error("Stack {index} does not match the first stack: expected {expected:?}, got {actual:?}")]
    StackMismatch {
        index: usize,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Stack {index} sample type {actual:?} does not match {expected:?}")]
    SampleTypeMismatch {
        index: usize,
        expected: SampleType,
        actual: SampleType,
    },

    #[error("No stacks provided")]
    NoStacks,

    #[error("Crop window {window:?} exceeds stack bounds {width}x{height}")]
    CropOutOfBounds {
        window: CropWindow,
        width: usize,
        height: usize,
    },

    #[error("Unknown length unit '{0}'")]
    UnknownUnit(String),

    #[error("Voxel size along {axis:?} must be positive and finite, got {value}")]
    InvalidVoxelSize { axis: Axis, value: f64 },
}
