use thiserror::Error;

use crate::localization::LocalizationError;
use crate::volume::VolumeError;

#[derive(Debug, Error)]
pub enum CoregistrationError {
    #[error("Co-registration needs at least 2 channels, got {count}")]
    TooFewChannels { count: usize },

    #[error("Got {resolutions} resolution vectors for {channels} channels")]
    ResolutionCountMismatch { channels: usize, resolutions: usize },

    #[error("Centroids mix 2D and 3D positions")]
    MixedDimensionality,

    #[error("Channel stacks do not match: {0}")]
    Volume(#[from] VolumeError),

    #[error("Localization failed in channel {channel}: {source}")]
    Localization {
        channel: usize,
        #[source]
        source: LocalizationError,
    },
}
