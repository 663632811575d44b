//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use beadqc::prelude::*;
//! ```

// Volume model
pub use crate::{Stack, Volume, VoxelCalibration};

// Field analyses - main API
pub use crate::{
    CoregFieldConfig, CoregFieldReport, IlluminationConfig, IlluminationReport, PipelineError,
    PsfFieldConfig, PsfFieldReport, analyze_coregistration_field, analyze_illumination_field,
    analyze_psf_field,
};

// Single-bead measurements
pub use crate::{
    CoregistrationReport, LocalizationConfig, PsfConfig, PsfProfile, coregister_stacks,
    profile_psf,
};

// Optics
pub use crate::{MicroscopeType, OpticalSetup, ResolutionVector};
