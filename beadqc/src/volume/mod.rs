//! Intensity volumes, single-channel stacks and their calibration.
//!
//! A [`Volume`] holds up to five axes (X, Y, Z, channel, frame) of samples
//! stored as `f32` together with the bit depth they came from. Analysis
//! stages work on a [`Stack`]: one channel of one frame, owned and immutable.

mod calibration;
mod error;
mod projection;
mod window;


pub use calibration::{LengthUnit, VoxelCalibration};
pub use error::VolumeError;
pub use projection::{Plane, ProjectionMethod, project};
pub use window::CropWindow;

use common::{Buffer2, Buffer3};
use serde::{Deserialize, Serialize};

// ============================================================================
// Axes and sample types
// ============================================================================

/// Spatial axis of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Storage type the samples were decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    U8,
    U16,
    F32,
}

impl SampleType {
    pub fn bit_depth(self) -> u32 {
        match self {
            SampleType::U8 => 8,
            SampleType::U16 => 16,
            SampleType::F32 => 32,
        }
    }

    /// Number of histogram bins for integer types. Float samples have no
    /// natural binning.
    pub fn histogram_bins(self) -> Option<usize> {
        match self {
            SampleType::U8 => Some(1 << 8),
            SampleType::U16 => Some(1 << 16),
            SampleType::F32 => None,
        }
    }
}

// ============================================================================
// Volume
// ============================================================================

/// Extent of a volume along each of its five axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeShape {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub channels: usize,
    pub frames: usize,
}

impl VolumeShape {
    /// Single-channel, single-frame shape.
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            channels: 1,
            frames: 1,
        }
    }

    pub const fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub const fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    #[inline]
    pub const fn stack_len(&self) -> usize {
        self.width * self.height * self.depth
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.stack_len() * self.channels * self.frames
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Multi-dimensional intensity volume.
///
/// Samples are laid out with X fastest, then Y, Z, channel and frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    shape: VolumeShape,
    sample_type: SampleType,
    calibration: VoxelCalibration,
    samples: Vec<f32>,
}

impl Volume {
    pub fn new(
        shape: VolumeShape,
        sample_type: SampleType,
        calibration: VoxelCalibration,
        samples: Vec<f32>,
    ) -> Result<Self, VolumeError> {
        if shape.is_empty() {
            return Err(VolumeError::EmptyShape { shape });
        }
        if samples.len() != shape.len() {
            return Err(VolumeError::SampleCountMismatch {
                shape,
                expected: shape.len(),
                actual: samples.len(),
            });
        }

        Ok(Self {
            shape,
            sample_type,
            calibration,
            samples,
        })
    }

    /// Interleave single-channel stacks into one single-frame volume.
    ///
    /// All stacks must share dimensions and sample type; the calibration of
    /// the first stack is kept.
    pub fn from_channels(stacks: &[Stack]) -> Result<Self, VolumeError> {
        let first = stacks.first().ok_or(VolumeError::NoStacks)?;
        validate_matching_stacks(stacks)?;

        let shape = VolumeShape::new(first.width(), first.height(), first.depth())
            .with_channels(stacks.len());
        let mut samples = Vec::with_capacity(shape.len());
        for stack in stacks {
            samples.extend_from_slice(stack.data().voxels());
        }

        Self::new(shape, first.sample_type(), first.calibration(), samples)
    }

    #[inline]
    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    #[inline]
    pub fn calibration(&self) -> VoxelCalibration {
        self.calibration
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.shape.channels
    }

    /// Extract one channel of one frame as an owned stack.
    pub fn stack(&self, channel: usize, frame: usize) -> Result<Stack, VolumeError> {
        if channel >= self.shape.channels {
            return Err(VolumeError::ChannelOutOfRange {
                channel,
                channels: self.shape.channels,
            });
        }
        if frame >= self.shape.frames {
            return Err(VolumeError::FrameOutOfRange {
                frame,
                frames: self.shape.frames,
            });
        }

        let len = self.shape.stack_len();
        let start = (frame * self.shape.channels + channel) * len;
        let data = Buffer3::new(
            self.shape.width,
            self.shape.height,
            self.shape.depth,
            self.samples[start..start + len].to_vec(),
        );
        Ok(Stack {
            data,
            sample_type: self.sample_type,
            calibration: self.calibration,
        })
    }

    /// Every channel of `frame`, in channel order.
    pub fn channel_stacks(&self, frame: usize) -> Result<Vec<Stack>, VolumeError> {
        (0..self.shape.channels)
            .map(|channel| self.stack(channel, frame))
            .collect()
    }
}

// ============================================================================
// Stack
// ============================================================================

/// Single-channel 3D stack with its calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    data: Buffer3<f32>,
    sample_type: SampleType,
    calibration: VoxelCalibration,
}

impl Stack {
    pub fn new(
        data: Buffer3<f32>,
        sample_type: SampleType,
        calibration: VoxelCalibration,
    ) -> Result<Self, VolumeError> {
        if data.is_empty() {
            return Err(VolumeError::EmptyShape {
                shape: VolumeShape::new(data.width(), data.height(), data.depth()),
            });
        }
        Ok(Self {
            data,
            sample_type,
            calibration,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.height()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.data.depth()
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width(), self.height(), self.depth())
    }

    #[inline]
    pub fn data(&self) -> &Buffer3<f32> {
        &self.data
    }

    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    #[inline]
    pub fn calibration(&self) -> VoxelCalibration {
        self.calibration
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[(x, y, z)]
    }

    /// Owned copy of `window`, keeping every z-plane.
    pub fn crop(&self, window: CropWindow) -> Result<Stack, VolumeError> {
        if window.width == 0 || window.height == 0 || !window.fits(self.width(), self.height()) {
            return Err(VolumeError::CropOutOfBounds {
                window,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(Stack {
            data: self.data.crop(
                (window.x, window.y, 0),
                (window.width, window.height, self.depth()),
            ),
            sample_type: self.sample_type,
            calibration: self.calibration,
        })
    }

    pub fn project(&self, plane: Plane, method: ProjectionMethod) -> Buffer2<f32> {
        project(&self.data, plane, method)
    }

    /// Maximum-intensity projection onto `plane`.
    pub fn max_projection(&self, plane: Plane) -> Buffer2<f32> {
        project(&self.data, plane, ProjectionMethod::Max)
    }
}

/// Check that every stack has the dimensions and sample type of the first.
pub fn validate_matching_stacks(stacks: &[Stack]) -> Result<(), VolumeError> {
    let Some(first) = stacks.first() else {
        return Err(VolumeError::NoStacks);
    };

    for (index, stack) in stacks.iter().enumerate().skip(1) {
        if stack.dimensions() != first.dimensions() {
            return Err(VolumeError::StackMismatch {
                index,
                expected: first.dimensions(),
                actual: stack.dimensions(),
            });
        }
        if stack.sample_type() != first.sample_type() {
            return Err(VolumeError::SampleTypeMismatch {
                index,
                expected: first.sample_type(),
                actual: stack.sample_type(),
            });
        }
    }
    Ok(())
}
