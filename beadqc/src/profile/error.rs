use thiserror::Error;

use super::lm_optimizer::LMStatus;
use crate::volume::Axis;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{axis:?} profile has {len} samples, at least 4 are needed")]
    TooFewSamples { axis: Axis, len: usize },

    #[error("{axis:?} profile fit did not converge after {iterations} iterations ({status:?})")]
    FitDiverged {
        axis: Axis,
        iterations: usize,
        status: LMStatus,
    },

    #[error("{axis:?} profile fit produced non-finite parameters")]
    NonFinite { axis: Axis },

    #[error("Stack has a single plane, an axial profile needs depth > 1")]
    SinglePlane,
}
