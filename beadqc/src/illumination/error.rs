use thiserror::Error;

use crate::volume::VolumeError;

#[derive(Debug, Error)]
pub enum IlluminationError {
    #[error("Image has no positive intensity")]
    NoSignal,

    #[error("Plane {plane} out of range, stack depth is {depth}")]
    PlaneOutOfRange { plane: usize, depth: usize },

    #[error(transparent)]
    Volume(#[from] VolumeError),
}
