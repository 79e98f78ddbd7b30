use nalgebra::{SMatrix, SVector};

use super::{FitError, check_lengths};

/// A curve `f(x; p)` with `N` parameters and an analytic gradient.
pub trait CurveModel<const N: usize> {
    /// Evaluates the curve at `x`.
    fn value(&self, x: f64, params: &[f64; N]) -> f64;

    /// Returns the partial derivatives `∂f/∂p` at `x`.
    fn gradient(&self, x: f64, params: &[f64; N]) -> [f64; N];
}

/// Solver configuration for [`levenberg_marquardt`].
#[derive(Debug, Clone, Copy)]
pub struct LmConfig {
    /// Maximum number of iterations.
    pub max_iters: usize,

    /// Starting value of the damping factor.
    pub initial_damping: f64,

    /// Upper bound on the damping factor.
    ///
    /// When no step can reduce the residual before damping reaches this bound,
    /// the current parameters are taken as the minimum.
    pub max_damping: f64,

    /// Converged when an accepted step reduces the SSR by less than this
    /// fraction of the SSR.
    pub ssr_rel_tol: f64,

    /// Converged when every parameter moves by less than this fraction of
    /// its magnitude.
    pub step_rel_tol: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iters: 200,
            initial_damping: 1e-3,
            max_damping: 1e12,
            ssr_rel_tol: 1e-12,
            step_rel_tol: 1e-10,
        }
    }
}

/// Result of a nonlinear least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit<const N: usize> {
    /// Best-fit parameters.
    pub params: [f64; N],

    /// Parameter covariance, `s²(JᵀJ)⁻¹` with `s² = SSR / (n - N)`.
    pub covariance: SMatrix<f64, N, N>,

    /// One standard deviation uncertainty of each parameter.
    pub std_errors: [f64; N],

    /// Sum of squared residuals at the solution.
    pub ssr: f64,

    /// Iteration count performed by the solver.
    pub iters: usize,
}

/// Fits `model` to the samples `(x, y)` starting from `p0`.
///
/// # Errors
///
/// Returns [`FitError`] if the samples are inconsistent or too few, the
/// model is not finite at `p0`, the normal matrix is singular at the
/// solution, or the iteration limit is reached.
pub fn levenberg_marquardt<M, const N: usize>(
    model: &M,
    x: &[f64],
    y: &[f64],
    p0: [f64; N],
    config: &LmConfig,
) -> Result<CurveFit<N>, FitError>
where
    M: CurveModel<N>,
{
    check_lengths(x, y)?;
    if x.len() <= N {
        return Err(FitError::TooFewPoints {
            needed: N + 1,
            found: x.len(),
        });
    }

    let mut params = p0;
    let mut ssr = sum_squares(model, x, y, &params)?;
    let mut damping = config.initial_damping;
    let mut converged = false;
    let mut iters = 0;

    while iters < config.max_iters {
        iters += 1;

        let (normal, rhs) = normal_equations(model, x, y, &params);
        let mut damped = normal;
        for j in 0..N {
            damped[(j, j)] += damping * normal[(j, j)].max(f64::MIN_POSITIVE);
        }

        let Some(step) = damped.cholesky().map(|c| c.solve(&rhs)) else {
            damping *= 10.0;
            if damping > config.max_damping {
                return Err(FitError::Singular);
            }
            continue;
        };

        let mut trial = params;
        for (p, dp) in trial.iter_mut().zip(step.iter()) {
            *p += dp;
        }
        let trial_ssr = sum_squares(model, x, y, &trial).unwrap_or(f64::INFINITY);

        if trial_ssr < ssr {
            let improvement = ssr - trial_ssr;
            let small_step = params
                .iter()
                .zip(step.iter())
                .all(|(p, dp)| dp.abs() <= config.step_rel_tol * (p.abs() + config.step_rel_tol));

            params = trial;
            ssr = trial_ssr;
            damping = (damping / 10.0).max(f64::EPSILON);

            if improvement <= config.ssr_rel_tol * ssr || small_step {
                converged = true;
                break;
            }
        } else {
            damping *= 10.0;
            if damping > config.max_damping {
                converged = true;
                break;
            }
        }
    }

    if !converged {
        return Err(FitError::NotConverged { iters, ssr });
    }

    let (normal, _) = normal_equations(model, x, y, &params);
    let inverse = normal.cholesky().ok_or(FitError::Singular)?.inverse();

    #[allow(clippy::cast_precision_loss)]
    let dof = (x.len() - N) as f64;
    let covariance = inverse * (ssr / dof);
    let std_errors = std::array::from_fn(|j| covariance[(j, j)].sqrt());

    tracing::debug!(iters, ssr, ?params, "levenberg-marquardt converged");

    Ok(CurveFit {
        params,
        covariance,
        std_errors,
        ssr,
        iters,
    })
}

fn sum_squares<M, const N: usize>(
    model: &M,
    x: &[f64],
    y: &[f64],
    params: &[f64; N],
) -> Result<f64, FitError>
where
    M: CurveModel<N>,
{
    x.iter().zip(y).try_fold(0.0, |acc, (&xi, &yi)| {
        let fi = model.value(xi, params);
        if fi.is_finite() {
            Ok(acc + (yi - fi).powi(2))
        } else {
            Err(FitError::NonFinite { x: xi })
        }
    })
}

/// Builds `JᵀJ` and `Jᵀr` for residuals `r = y - f(x; p)`.
fn normal_equations<M, const N: usize>(
    model: &M,
    x: &[f64],
    y: &[f64],
    params: &[f64; N],
) -> (SMatrix<f64, N, N>, SVector<f64, N>)
where
    M: CurveModel<N>,
{
    let mut normal = SMatrix::<f64, N, N>::zeros();
    let mut rhs = SVector::<f64, N>::zeros();

    for (&xi, &yi) in x.iter().zip(y) {
        let residual = yi - model.value(xi, params);
        let grad = SVector::<f64, N>::from(model.gradient(xi, params));
        normal += grad * grad.transpose();
        rhs += grad * residual;
    }

    (normal, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    /// `y = a + b·x`
    struct Line;

    impl CurveModel<2> for Line {
        fn value(&self, x: f64, [a, b]: &[f64; 2]) -> f64 {
            a + b * x
        }

        fn gradient(&self, x: f64, _params: &[f64; 2]) -> [f64; 2] {
            [1.0, x]
        }
    }

    /// `y = a·exp(-b·x)`
    struct Decay;

    impl CurveModel<2> for Decay {
        fn value(&self, x: f64, [a, b]: &[f64; 2]) -> f64 {
            a * (-b * x).exp()
        }

        fn gradient(&self, x: f64, [a, b]: &[f64; 2]) -> [f64; 2] {
            let e = (-b * x).exp();
            [e, -a * x * e]
        }
    }

    #[test]
    fn line_matches_ordinary_least_squares() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.1, 2.9, 5.2, 6.8, 9.1];

        let fit = levenberg_marquardt(&Line, &x, &y, [0.0, 0.0], &LmConfig::default()).unwrap();

        // Closed-form OLS for the same data.
        let n = 5.0;
        let sx: f64 = x.iter().sum();
        let sy: f64 = y.iter().sum();
        let sxx: f64 = x.iter().map(|v| v * v).sum();
        let sxy: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();
        let b = (n * sxy - sx * sy) / (n * sxx - sx * sx);
        let a = (sy - b * sx) / n;
        assert_relative_eq!(fit.params[0], a, epsilon = 1e-9);
        assert_relative_eq!(fit.params[1], b, epsilon = 1e-9);

        let ssr: f64 = x
            .iter()
            .zip(&y)
            .map(|(xi, yi)| (yi - a - b * xi).powi(2))
            .sum();
        let s2 = ssr / (n - 2.0);
        let var_b = s2 * n / (n * sxx - sx * sx);
        assert_relative_eq!(fit.std_errors[1], var_b.sqrt(), max_relative = 1e-6);
    }

    #[test]
    fn recovers_exponential_decay() {
        let x: Vec<f64> = (0..20).map(|i| f64::from(i) * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 3.0 * (-0.7 * xi).exp()).collect();

        let fit = levenberg_marquardt(&Decay, &x, &y, [1.0, 0.1], &LmConfig::default()).unwrap();

        assert_relative_eq!(fit.params[0], 3.0, epsilon = 1e-8);
        assert_relative_eq!(fit.params[1], 0.7, epsilon = 1e-8);
        assert!(fit.ssr < 1e-16);
    }

    #[test]
    fn rejects_bad_samples() {
        let config = LmConfig::default();
        assert_eq!(
            levenberg_marquardt(&Line, &[1.0, 2.0], &[1.0], [0.0, 0.0], &config),
            Err(FitError::LengthMismatch { x: 2, y: 1 })
        );
        assert_eq!(
            levenberg_marquardt(&Line, &[1.0, 2.0], &[1.0, 2.0], [0.0, 0.0], &config),
            Err(FitError::TooFewPoints {
                needed: 3,
                found: 2
            })
        );
    }

    #[test]
    fn iteration_limit() {
        let x: Vec<f64> = (0..20).map(|i| f64::from(i) * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 3.0 * (-0.7 * xi).exp()).collect();
        let config = LmConfig {
            max_iters: 1,
            ..LmConfig::default()
        };

        let err = levenberg_marquardt(&Decay, &x, &y, [1.0, 0.1], &config).unwrap_err();
        assert!(matches!(err, FitError::NotConverged { iters: 1, .. }));
    }
}
