//! Numeric helpers shared by the measurement stages.

mod bbox;

pub use bbox::Aabb;
pub use common::FloatExt;

use glam::DVec3;

/// Ratio between the FWHM of a Gaussian and its standard deviation: 2·√(2·ln 2).
pub const SIGMA_TO_FWHM: f64 = 2.354_820_045_030_949;

/// FWHM of a Gaussian with standard deviation `sigma`. Sign of `sigma` is ignored.
#[inline]
pub fn sigma_to_fwhm(sigma: f64) -> f64 {
    sigma.abs() * SIGMA_TO_FWHM
}

/// Smallest and largest finite value of a slice, or `None` if there are none.
pub fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Euclidean distance between two voxel positions after scaling each axis
/// by its physical voxel size.
#[inline]
pub fn calibrated_distance(a: DVec3, b: DVec3, voxel_size: DVec3) -> f64 {
    ((b - a) * voxel_size).length()
}

/// Coefficient of determination of `fitted` against `observed`.
///
/// A constant observation is explained perfectly only by a perfect fit,
/// so it yields 1 for zero residuals and 0 otherwise.
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    debug_assert_eq!(observed.len(), fitted.len());
    if observed.is_empty() {
        return 0.0;
    }

    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let (ss_res, ss_tot) = observed
        .iter()
        .zip(fitted)
        .fold((0.0, 0.0), |(res, tot), (&o, &f)| {
            (res + (o - f) * (o - f), tot + (o - mean) * (o - mean))
        });

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigma_to_fwhm() {
        assert!((sigma_to_fwhm(3.0) - 7.064_460_135).abs() < 1e-6);
        assert_eq!(sigma_to_fwhm(-1.0), SIGMA_TO_FWHM);
        assert_eq!(sigma_to_fwhm(3.0).round_to(2), 7.06);
        assert_eq!(sigma_to_fwhm(-0.25).round_to(3), 0.589);
    }

    #[test]
    fn test_min_max_skips_non_finite() {
        assert_eq!(min_max(&[3.0, f32::NAN, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[f32::NAN]), None);
    }

    #[test]
    fn test_calibrated_distance_anisotropic() {
        let a = DVec3::new(1.0, 1.0, 1.0);
        let b = DVec3::new(4.0, 1.0, 3.0);
        let d = calibrated_distance(a, b, DVec3::new(0.1, 0.1, 0.2));
        assert!((d - 0.5).abs() < 1e-12);
        assert_eq!(calibrated_distance(b, a, DVec3::ONE), (b - a).length());
    }

    #[test]
    fn test_r_squared_perfect_and_mean_fit() {
        let observed = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r_squared(&observed, &observed), 1.0);
        assert!(r_squared(&observed, &[2.5; 4]).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_constant_observation() {
        assert_eq!(r_squared(&[5.0; 3], &[5.0; 3]), 1.0);
        assert_eq!(r_squared(&[5.0; 3], &[4.0; 3]), 0.0);
    }
}
