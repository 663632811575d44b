//! Beadqc - Bead-based microscope quality control.
//!
//! This library measures optical performance from images of sub-resolution
//! fluorescent beads:
//! - Point spread function width along X, Y and Z
//! - Channel co-registration (chromatic shift) against the theoretical resolution
//! - Bead detection and selection on a field of view
//! - Field illumination flatness and stage repositioning repeatability
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use beadqc::{PsfFieldConfig, analyze_psf_field};
//!
//! let report = analyze_psf_field(&volume, &PsfFieldConfig::default())?;
//! for psf in report.measured() {
//!     println!("FWHM {:.3} {:.3} {:.3} um", psf.fwhm.x, psf.fwhm.y, psf.fwhm.z);
//! }
//! ```

pub(crate) mod candidates;
pub(crate) mod coregistration;
pub(crate) mod illumination;
pub(crate) mod localization;
pub(crate) mod math;
pub mod optics;
pub(crate) mod pipeline;
pub(crate) mod profile;
pub(crate) mod segmentation;
pub(crate) mod stage;
pub mod volume;

#[cfg(test)]
pub mod testing;

pub mod prelude;

// ============================================================================
// Volume model
// ============================================================================

pub use volume::{
    Axis, CropWindow, LengthUnit, Plane, ProjectionMethod, SampleType, Stack, Volume,
    VolumeError, VolumeShape, VoxelCalibration,
};

// ============================================================================
// Numeric helpers
// ============================================================================

pub use math::{FloatExt, SIGMA_TO_FWHM, calibrated_distance, r_squared, sigma_to_fwhm};

// ============================================================================
// Segmentation
// ============================================================================

pub use segmentation::{
    ClassLimits, Convergence, Histogram, HistogramSegmenter, SegmentationConfig,
    SegmentationError, Weighting, compute_limits,
};

// ============================================================================
// Localization
// ============================================================================

pub use localization::{
    Centroid, Connectivity, Ellipse, LocalizationConfig, LocalizationError, LocatedObject,
    MaxVoxel, locate_centroid, locate_in_image, locate_in_plane, max_voxel,
};

// ============================================================================
// Candidate selection
// ============================================================================

pub use candidates::{
    Candidate, MaximaConfig, SelectionConfig, crop_size, crop_window, find_maxima, fov_window,
    select_beads,
};

// ============================================================================
// Profile fitting
// ============================================================================

pub use profile::{
    FittedProfile, GaussianParams, LMConfig, LMStatus, ProfileError, PsfConfig, PsfProfile,
    fit_profile, profile_psf,
};

// ============================================================================
// Optics
// ============================================================================

pub use optics::{
    MicroscopeType, OpticalSetup, OpticsError, ResolutionVector, theoretical_resolution,
};

// ============================================================================
// Co-registration
// ============================================================================

pub use coregistration::{
    ChannelPair, CoregistrationError, CoregistrationReport, analyze_pairs, coregister_stacks,
    reference_distance,
};

// ============================================================================
// Field pipelines
// ============================================================================

pub use pipeline::{
    BeadCoregistration, BeadPsf, BeadSearchConfig, BeadSite, CoregFieldConfig, CoregFieldReport,
    DEFAULT_FOV_SIZE, PipelineError, PsfFieldConfig, PsfFieldReport,
    analyze_coregistration_field, analyze_psf_field,
};

// ============================================================================
// Illumination and stage
// ============================================================================

pub use illumination::{
    IlluminationConfig, IlluminationError, IlluminationReport, Landmark, LandmarkIntensity,
    analyze_illumination, analyze_illumination_field,
};
pub use stage::{StageDisplacement, max_stage_displacement, stage_displacement};

#[cfg(feature = "bench")]
pub mod bench {
    pub use crate::profile::bench as profile;
    pub use crate::segmentation::bench as segmentation;
}
