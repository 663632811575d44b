//! Gaussian on a constant pedestal:
//! `y = a + (b - a) * exp(-(x - c)^2 / (2 d^2))`.

use serde::{Deserialize, Serialize};

use super::lm_optimizer::LMModel;
use crate::math::sigma_to_fwhm;

/// Fitted parameters of the pedestal Gaussian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    /// `a`: background level.
    pub baseline: f64,
    /// `b`: value at the center.
    pub peak: f64,
    /// `c`: center coordinate.
    pub center: f64,
    /// `d`: standard deviation.
    pub width: f64,
}

impl GaussianParams {
    pub(crate) fn from_array([a, b, c, d]: [f64; 4]) -> Self {
        Self {
            baseline: a,
            peak: b,
            center: c,
            width: d,
        }
    }

    pub(crate) fn to_array(self) -> [f64; 4] {
        [self.baseline, self.peak, self.center, self.width]
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        PedestalGaussian::default().evaluate(x, &self.to_array())
    }

    /// Full width at half maximum, `2·sqrt(2·ln 2)·|d|`.
    pub fn fwhm(&self) -> f64 {
        sigma_to_fwhm(self.width)
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|p| p.is_finite())
    }
}

/// L-M model of the pedestal Gaussian. Parameters are `[a, b, c, d]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PedestalGaussian {
    /// Smallest width the optimizer may step to.
    pub min_width: f64,
}

impl Default for PedestalGaussian {
    fn default() -> Self {
        Self { min_width: 1e-9 }
    }
}

impl LMModel<4> for PedestalGaussian {
    #[inline]
    fn evaluate(&self, x: f64, params: &[f64; 4]) -> f64 {
        let [a, b, c, d] = *params;
        let dx = x - c;
        a + (b - a) * (-dx * dx / (2.0 * d * d)).exp()
    }

    #[inline]
    fn jacobian_row(&self, x: f64, params: &[f64; 4]) -> [f64; 4] {
        let [a, b, c, d] = *params;
        let dx = x - c;
        let e = (-dx * dx / (2.0 * d * d)).exp();
        let amp = (b - a) * e;
        [
            1.0 - e,
            e,
            amp * dx / (d * d),
            amp * dx * dx / (d * d * d),
        ]
    }

    #[inline]
    fn constrain(&self, params: &mut [f64; 4]) {
        params[3] = params[3].abs().max(self.min_width);
    }
}
