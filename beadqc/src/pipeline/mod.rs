//! Whole-field bead analyses.
//!
//! Both analyses share the same front end: crop the central field of view,
//! max-project the detection channel, find prominent maxima and keep the
//! brightest well-separated ones. Each selected bead then gets a square crop
//! through the full depth, and the crops are analyzed in parallel:
//!
//! - [`analyze_psf_field`] fits X, Y and Z profiles of every bead.
//! - [`analyze_coregistration_field`] localizes every bead in every channel
//!   and compares the channel centroids.
//!
//! A failing bead never fails the field; its error is kept in its result.

mod config;
mod error;


pub use config::{BeadSearchConfig, CoregFieldConfig, DEFAULT_FOV_SIZE, PsfFieldConfig};
pub use error::PipelineError;

use std::fmt::Display;

use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::candidates::{Candidate, crop_size, crop_window, find_maxima, fov_window, select_beads};
use crate::coregistration::{CoregistrationError, CoregistrationReport, coregister_stacks};
use crate::optics::{OpticalSetup, ResolutionVector};
use crate::profile::{ProfileError, PsfProfile, profile_psf};
use crate::volume::{CropWindow, Plane, Stack, Volume, VolumeError};

// ============================================================================
// Results
// ============================================================================

/// Serialize a per-bead outcome as `{"ok": ...}` or `{"error": "message"}`.
fn serialize_outcome<T, E, S>(outcome: &Result<T, E>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    E: Display,
    S: Serializer,
{
    #[derive(Serialize)]
    #[serde(rename_all = "snake_case")]
    enum Outcome<'a, T> {
        Ok(&'a T),
        Error(String),
    }

    match outcome {
        Ok(value) => Outcome::Ok(value).serialize(serializer),
        Err(err) => Outcome::<T>::Error(err.to_string()).serialize(serializer),
    }
}

/// Selected bead, in full-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeadSite {
    pub index: usize,
    pub candidate: Candidate,
    /// Crop analyzed for this bead.
    pub window: CropWindow,
}

#[derive(Debug, Serialize)]
pub struct BeadPsf {
    pub site: BeadSite,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: Result<PsfProfile, ProfileError>,
}

#[derive(Debug, Serialize)]
pub struct PsfFieldReport {
    /// Field-of-view window searched for beads.
    pub fov: CropWindow,
    /// Maxima found before selection.
    pub candidates_found: usize,
    pub theoretical: Option<ResolutionVector>,
    pub beads: Vec<BeadPsf>,
}

impl PsfFieldReport {
    /// Profiles of the beads that were measured successfully.
    pub fn measured(&self) -> impl Iterator<Item = &PsfProfile> + '_ {
        self.beads.iter().filter_map(|b| b.outcome.as_ref().ok())
    }
}

#[derive(Debug, Serialize)]
pub struct BeadCoregistration {
    pub site: BeadSite,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: Result<CoregistrationReport, CoregistrationError>,
}

#[derive(Debug, Serialize)]
pub struct CoregFieldReport {
    pub fov: CropWindow,
    pub candidates_found: usize,
    /// Theoretical resolution per channel.
    pub resolutions: Vec<ResolutionVector>,
    pub beads: Vec<BeadCoregistration>,
}

impl CoregFieldReport {
    pub fn measured(&self) -> impl Iterator<Item = &CoregistrationReport> + '_ {
        self.beads.iter().filter_map(|b| b.outcome.as_ref().ok())
    }
}

// ============================================================================
// Bead search
// ============================================================================

struct SelectedBeads {
    fov: CropWindow,
    candidates_found: usize,
    sites: Vec<BeadSite>,
}

/// Find beads on the central window of `detection` and place a crop window
/// around each. Windows are relative to the field-of-view crop.
fn search_beads(
    detection: &Stack,
    config: &BeadSearchConfig,
) -> Result<(SelectedBeads, Vec<CropWindow>), VolumeError> {
    let fov = fov_window(detection.width(), detection.height(), config.fov_size);
    let fov_stack = detection.crop(fov)?;
    let projection = fov_stack.max_projection(Plane::XY);

    let candidates = find_maxima(&projection, &config.maxima);
    let selected = select_beads(&candidates, &config.selection);

    let size = crop_size(
        config.bead_size_um,
        detection.calibration().pixel_height(),
        config.min_crop_size,
    );

    let mut sites = Vec::with_capacity(selected.len());
    let mut local_windows = Vec::with_capacity(selected.len());
    for (index, bead) in selected.into_iter().enumerate() {
        let local = crop_window((bead.x, bead.y), size, fov.width, fov.height);
        local_windows.push(local);
        sites.push(BeadSite {
            index,
            candidate: Candidate::new(bead.x + fov.x, bead.y + fov.y, bead.intensity),
            window: CropWindow::new(local.x + fov.x, local.y + fov.y, local.width, local.height),
        });
    }

    tracing::info!(
        "Selected {} of {} candidates in {}x{} field, crop size {}",
        sites.len(),
        candidates.len(),
        fov.width,
        fov.height,
        size
    );

    Ok((
        SelectedBeads {
            fov,
            candidates_found: candidates.len(),
            sites,
        },
        local_windows,
    ))
}

// ============================================================================
// PSF field
// ============================================================================

/// Measure the PSF of the selected beads of one channel.
pub fn analyze_psf_field(
    volume: &Volume,
    config: &PsfFieldConfig,
) -> Result<PsfFieldReport, PipelineError> {
    config.validate();

    let theoretical = config.optics.map(|o| o.resolution()).transpose()?;
    let stack = volume.stack(config.channel, config.search.frame)?;
    let (selected, local_windows) = search_beads(&stack, &config.search)?;

    let fov_stack = stack.crop(selected.fov)?;
    let crops = local_windows
        .iter()
        .map(|&w| fov_stack.crop(w))
        .collect::<Result<Vec<_>, _>>()?;

    let beads: Vec<BeadPsf> = selected
        .sites
        .par_iter()
        .zip(crops.par_iter())
        .map(|(&site, crop)| {
            let outcome = profile_psf(crop, &config.psf);
            if let Err(err) = &outcome {
                tracing::warn!("Bead {} PSF failed: {}", site.index, err);
            }
            BeadPsf { site, outcome }
        })
        .collect();

    Ok(PsfFieldReport {
        fov: selected.fov,
        candidates_found: selected.candidates_found,
        theoretical,
        beads,
    })
}

// ============================================================================
// Co-registration field
// ============================================================================

/// Measure channel co-registration on the selected beads.
pub fn analyze_coregistration_field(
    volume: &Volume,
    config: &CoregFieldConfig,
) -> Result<CoregFieldReport, PipelineError> {
    config.validate();

    let channels = volume.channels();
    if channels < 2 {
        return Err(PipelineError::TooFewChannels { channels });
    }
    let optics = if config.optics.is_empty() {
        vec![OpticalSetup::default(); channels]
    } else if config.optics.len() == channels {
        config.optics.clone()
    } else {
        return Err(PipelineError::OpticsCountMismatch {
            channels,
            optics: config.optics.len(),
        });
    };
    let resolutions = optics
        .iter()
        .map(OpticalSetup::resolution)
        .collect::<Result<Vec<_>, _>>()?;

    let stacks = volume.channel_stacks(config.search.frame)?;
    let detection = stacks
        .get(config.detection_channel)
        .ok_or(VolumeError::ChannelOutOfRange {
            channel: config.detection_channel,
            channels,
        })?;
    let (selected, local_windows) = search_beads(detection, &config.search)?;

    let fov_stacks = stacks
        .iter()
        .map(|s| s.crop(selected.fov))
        .collect::<Result<Vec<_>, _>>()?;
    let crops = local_windows
        .iter()
        .map(|&w| {
            fov_stacks
                .iter()
                .map(|s| s.crop(w))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let beads: Vec<BeadCoregistration> = selected
        .sites
        .par_iter()
        .zip(crops.par_iter())
        .map(|(&site, channel_crops)| {
            let outcome = coregister_stacks(channel_crops, &resolutions, &config.localization);
            if let Err(err) = &outcome {
                tracing::warn!("Bead {} co-registration failed: {}", site.index, err);
            }
            BeadCoregistration { site, outcome }
        })
        .collect();

    Ok(CoregFieldReport {
        fov: selected.fov,
        candidates_found: selected.candidates_found,
        resolutions,
        beads,
    })
}
