//! Levenberg-Marquardt optimizer for 1D curve fitting.
//!
//! Generic over the parameter count so the same loop serves any small
//! model. Uses f64 throughout.

use serde::{Deserialize, Serialize};

use super::linear_solver::solve;

/// Configuration for Levenberg-Marquardt optimization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LMConfig {
    /// Maximum iterations.
    pub max_iterations: usize,
    /// Convergence threshold on every parameter change, relative to
    /// `max(|param|, 1)`.
    pub convergence_threshold: f64,
    /// Initial damping parameter.
    pub initial_lambda: f64,
    /// Factor to increase lambda on failed step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on successful step.
    pub lambda_down: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            convergence_threshold: 1e-8,
            initial_lambda: 0.001,
            lambda_up: 10.0,
            lambda_down: 0.1,
        }
    }
}

impl LMConfig {
    pub fn validate(&self) {
        assert!(self.max_iterations >= 1, "max_iterations must be at least 1");
        assert!(
            self.convergence_threshold > 0.0,
            "convergence_threshold must be positive, got {}",
            self.convergence_threshold
        );
        assert!(
            self.initial_lambda > 0.0,
            "initial_lambda must be positive, got {}",
            self.initial_lambda
        );
        assert!(
            self.lambda_up > 1.0 && self.lambda_down > 0.0 && self.lambda_down < 1.0,
            "lambda_up must exceed 1 and lambda_down must lie in (0, 1)"
        );
    }
}

/// Lambda above which no damped step is expected to improve the fit.
const LAMBDA_LIMIT: f64 = 1e10;

/// How an optimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LMStatus {
    /// The last accepted step was below the convergence threshold.
    Converged,
    /// Damping grew past its limit without finding a better point, so the
    /// current parameters are a minimum to working precision.
    Stalled,
    /// The iteration budget ran out.
    BudgetExhausted,
    /// The damped normal equations could not be solved.
    Singular,
}

/// Result of L-M optimization.
#[derive(Debug, Clone, Copy)]
pub struct LMResult<const N: usize> {
    pub params: [f64; N],
    pub chi2: f64,
    pub status: LMStatus,
    pub iterations: usize,
}

impl<const N: usize> LMResult<N> {
    /// Converged or stalled at a minimum.
    pub fn is_success(&self) -> bool {
        matches!(self.status, LMStatus::Converged | LMStatus::Stalled)
    }
}

/// Trait for models that can be fit with L-M optimization.
pub trait LMModel<const N: usize> {
    /// Evaluate the model at a point.
    fn evaluate(&self, x: f64, params: &[f64; N]) -> f64;

    /// Compute partial derivatives at a point.
    fn jacobian_row(&self, x: f64, params: &[f64; N]) -> [f64; N];

    /// Apply parameter constraints after an update.
    fn constrain(&self, params: &mut [f64; N]);
}

/// Fit `model` to the samples `(data_x[i], data_y[i])` starting at
/// `initial_params`.
pub fn optimize<const N: usize, M: LMModel<N>>(
    model: &M,
    data_x: &[f64],
    data_y: &[f64],
    initial_params: [f64; N],
    config: &LMConfig,
) -> LMResult<N> {
    debug_assert_eq!(data_x.len(), data_y.len());

    let mut params = initial_params;
    let mut lambda = config.initial_lambda;
    let mut prev_chi2 = compute_chi2(model, data_x, data_y, &params);
    let mut status = LMStatus::BudgetExhausted;
    let mut iterations = 0;

    let n = data_x.len();
    let mut jacobian = Vec::with_capacity(n);
    let mut residuals = Vec::with_capacity(n);

    for iter in 0..config.max_iterations {
        iterations = iter + 1;

        fill_jacobian_residuals(model, data_x, data_y, &params, &mut jacobian, &mut residuals);
        let (hessian, gradient) = compute_hessian_gradient(&jacobian, &residuals);

        let mut damped_hessian = hessian;
        for (i, row) in damped_hessian.iter_mut().enumerate() {
            row[i] *= 1.0 + lambda;
        }

        let Some(delta) = solve(&damped_hessian, &gradient) else {
            status = LMStatus::Singular;
            break;
        };

        let mut new_params = params;
        for (p, d) in new_params.iter_mut().zip(delta.iter()) {
            *p += d;
        }
        model.constrain(&mut new_params);

        let new_chi2 = compute_chi2(model, data_x, data_y, &new_params);

        if new_chi2 < prev_chi2 {
            let small_step = delta
                .iter()
                .zip(params.iter())
                .all(|(d, p)| d.abs() < config.convergence_threshold * p.abs().max(1.0));

            params = new_params;
            lambda *= config.lambda_down;
            prev_chi2 = new_chi2;

            if small_step {
                status = LMStatus::Converged;
                break;
            }
        } else {
            lambda *= config.lambda_up;
            if lambda > LAMBDA_LIMIT {
                status = LMStatus::Stalled;
                break;
            }
        }
    }

    LMResult {
        params,
        chi2: prev_chi2,
        status,
        iterations,
    }
}

fn compute_chi2<const N: usize, M: LMModel<N>>(
    model: &M,
    data_x: &[f64],
    data_y: &[f64],
    params: &[f64; N],
) -> f64 {
    data_x
        .iter()
        .zip(data_y.iter())
        .map(|(&x, &y)| {
            let residual = y - model.evaluate(x, params);
            residual * residual
        })
        .sum()
}

/// Fill jacobian and residuals buffers, reusing existing allocations.
fn fill_jacobian_residuals<const N: usize, M: LMModel<N>>(
    model: &M,
    data_x: &[f64],
    data_y: &[f64],
    params: &[f64; N],
    jacobian: &mut Vec<[f64; N]>,
    residuals: &mut Vec<f64>,
) {
    jacobian.clear();
    residuals.clear();

    for (&x, &y) in data_x.iter().zip(data_y.iter()) {
        jacobian.push(model.jacobian_row(x, params));
        residuals.push(y - model.evaluate(x, params));
    }
}

/// Compute Hessian (J^T J) and gradient (J^T r) for N-parameter model.
/// Exploits symmetry: only computes upper triangle, then mirrors.
#[allow(clippy::needless_range_loop)]
pub fn compute_hessian_gradient<const N: usize>(
    jacobian: &[[f64; N]],
    residuals: &[f64],
) -> ([[f64; N]; N], [f64; N]) {
    let mut hessian = [[0.0f64; N]; N];
    let mut gradient = [0.0f64; N];

    for (row, &r) in jacobian.iter().zip(residuals.iter()) {
        for i in 0..N {
            gradient[i] += row[i] * r;
            for j in i..N {
                hessian[i][j] += row[i] * row[j];
            }
        }
    }

    for i in 1..N {
        for j in 0..i {
            hessian[i][j] = hessian[j][i];
        }
    }

    (hessian, gradient)
}
