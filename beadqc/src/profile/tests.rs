use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::math::SIGMA_TO_FWHM;
use crate::testing::init_tracing;
use crate::testing::synthetic::{GaussianBead, bead_stack};
use crate::volume::VoxelCalibration;

fn gaussian_samples(params: [f64; 4], len: usize, spacing: f64, noise: Option<u64>) -> Vec<f32> {
    let model = GaussianParams::from_array(params);
    let mut rng = noise.map(StdRng::seed_from_u64);
    (0..len)
        .map(|i| {
            let mut v = model.evaluate(i as f64 * spacing);
            if let Some(rng) = rng.as_mut() {
                v += rng.random_range(-5.0..5.0);
            }
            v as f32
        })
        .collect()
}

fn within(actual: f64, expected: f64, rel: f64) -> bool {
    (actual - expected).abs() <= rel * expected.abs()
}

// ============================================================================
// Single profile
// ============================================================================

#[test]
fn test_round_trip_with_noise() {
    init_tracing();
    let samples = gaussian_samples([10.0, 1000.0, 25.0, 3.0], 50, 1.0, Some(7));
    let profile = fit_profile(Axis::X, &samples, 1.0, 1.0, &LMConfig::default()).unwrap();

    let p = profile.params;
    assert!(within(p.baseline, 10.0, 0.05), "baseline {}", p.baseline);
    assert!(within(p.peak, 1000.0, 0.05), "peak {}", p.peak);
    assert!(within(p.center, 25.0, 0.05), "center {}", p.center);
    assert!(within(p.width, 3.0, 0.05), "width {}", p.width);
    assert!(within(profile.fwhm, 3.0 * SIGMA_TO_FWHM, 0.05));
    assert!((profile.fwhm - 7.06).abs() < 0.2);
    assert!(profile.r_squared > 0.99);
}

#[test]
fn test_physical_spacing_scales_fwhm() {
    // Same samples on a 0.2 um grid: every length scales by 0.2.
    let samples = gaussian_samples([10.0, 1000.0, 25.0, 3.0], 50, 1.0, None);
    let profile = fit_profile(Axis::Z, &samples, 0.2, 1.0, &LMConfig::default()).unwrap();
    assert!((profile.params.center - 5.0).abs() < 1e-3);
    assert!((profile.params.width - 0.6).abs() < 1e-3);
    assert!((profile.fwhm - 0.6 * SIGMA_TO_FWHM).abs() < 1e-3);
    assert_eq!(profile.coordinates[10], 2.0);
}

#[test]
fn test_correction_factor() {
    let samples = gaussian_samples([0.0, 500.0, 10.0, 2.0], 21, 1.0, None);
    let plain = fit_profile(Axis::Y, &samples, 1.0, 1.0, &LMConfig::default()).unwrap();
    let corrected = fit_profile(Axis::Y, &samples, 1.0, 1.186, &LMConfig::default()).unwrap();
    assert!((corrected.fwhm - 1.186 * plain.fwhm).abs() < 1e-9);
    assert_eq!(corrected.r_squared, plain.r_squared);
}

#[test]
fn test_profile_arrays_are_parallel() {
    let samples = gaussian_samples([10.0, 300.0, 8.0, 1.5], 17, 0.5, Some(3));
    let profile = fit_profile(Axis::X, &samples, 0.5, 1.0, &LMConfig::default()).unwrap();
    assert_eq!(profile.coordinates.len(), 17);
    assert_eq!(profile.raw.len(), 17);
    assert_eq!(profile.fitted.len(), 17);
    assert_eq!(profile.raw[3], samples[3] as f64);
}

#[test]
fn test_too_few_samples() {
    let err = fit_profile(Axis::Z, &[1.0, 5.0, 2.0], 1.0, 1.0, &LMConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ProfileError::TooFewSamples {
            axis: Axis::Z,
            len: 3
        }
    ));
}

#[test]
fn test_flat_profile_fails() {
    let err = fit_profile(Axis::X, &[7.0; 12], 1.0, 1.0, &LMConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ProfileError::FitDiverged {
            status: LMStatus::Singular,
            ..
        }
    ));
}

#[test]
fn test_budget_exhaustion_is_an_error() {
    let samples = gaussian_samples([10.0, 1000.0, 25.0, 3.0], 50, 1.0, Some(11));
    let config = LMConfig {
        max_iterations: 1,
        ..Default::default()
    };
    let err = fit_profile(Axis::X, &samples, 1.0, 1.0, &config).unwrap_err();
    assert!(matches!(
        err,
        ProfileError::FitDiverged {
            iterations: 1,
            status: LMStatus::BudgetExhausted,
            ..
        }
    ));
}

// ============================================================================
// Bead PSF
// ============================================================================

#[test]
fn test_psf_of_synthetic_bead() {
    let calibration = VoxelCalibration::micrometers(0.1, 0.1, 0.3).unwrap();
    let bead = GaussianBead::new(
        DVec3::new(16.0, 15.0, 10.0),
        DVec3::new(2.0, 2.5, 3.0),
        5000.0,
    );
    let stack = bead_stack((33, 31, 21), &[bead], 200.0, None, calibration);

    let psf = profile_psf(&stack, &PsfConfig::default()).unwrap();
    assert_eq!((psf.peak.x, psf.peak.y, psf.peak.z), (16, 15, 10));

    let expected = DVec3::new(0.2, 0.25, 0.9) * SIGMA_TO_FWHM;
    for axis in Axis::ALL {
        let i = axis as usize;
        assert!(
            within(psf.fwhm[i], expected[i], 0.01),
            "{axis:?}: {} vs {}",
            psf.fwhm[i],
            expected[i]
        );
        assert!(psf.r_squared[i] > 0.999);
        assert_eq!(psf.profile(axis).axis, axis);
    }
    assert!((psf.z.params.center - 3.0).abs() < 0.01);
}

#[test]
fn test_psf_applies_per_axis_correction() {
    let bead = GaussianBead::new(DVec3::new(10.0, 10.0, 6.0), DVec3::splat(2.0), 3000.0);
    let stack = bead_stack((21, 21, 13), &[bead], 100.0, None, VoxelCalibration::default());

    let plain = profile_psf(&stack, &PsfConfig::default()).unwrap();
    let config = PsfConfig {
        correction: DVec3::new(1.0, 2.0, 0.5),
        ..Default::default()
    };
    let corrected = profile_psf(&stack, &config).unwrap();
    assert!((corrected.fwhm - plain.fwhm * config.correction).length() < 1e-9);
}

#[test]
fn test_psf_needs_depth() {
    let bead = GaussianBead::new(DVec3::new(8.0, 8.0, 0.0), DVec3::splat(2.0), 1000.0);
    let stack = bead_stack((17, 17, 1), &[bead], 0.0, None, VoxelCalibration::default());
    assert!(matches!(
        profile_psf(&stack, &PsfConfig::default()),
        Err(ProfileError::SinglePlane)
    ));
}
