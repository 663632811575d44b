use thiserror::Error;

use crate::optics::OpticsError;
use crate::volume::VolumeError;

/// Failures that stop a whole field analysis. Per-bead failures are
/// reported in the bead results instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Volume error: {0}")]
    Volume(#[from] VolumeError),

    #[error("Invalid optics: {0}")]
    Optics(#[from] OpticsError),

    #[error("Co-registration needs at least 2 channels, volume has {channels}")]
    TooFewChannels { channels: usize },

    #[error("Got {optics} optical setups for {channels} channels")]
    OpticsCountMismatch { channels: usize, optics: usize },
}
