use super::{FitError, check_lengths};

/// Result of fitting `y = m·x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalFit {
    /// Best-fit slope.
    pub slope: f64,

    /// One standard deviation uncertainty of the slope.
    pub std_error: f64,

    /// Weighted sum of squared residuals (plain SSR when unweighted).
    pub chi_squared: f64,
}

impl ProportionalFit {
    /// Evaluates the fitted line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x
    }
}

/// Fits a line through the origin.
///
/// With `sigma`, each point is weighted by `1/σ²` and the slope uncertainty
/// is absolute: `σ_m = 1 / sqrt(Σ x²/σ²)`.
/// Without `sigma`, the fit is unweighted and the uncertainty is estimated
/// from the residual variance, which needs at least two points.
///
/// # Errors
///
/// Returns [`FitError`] if lengths differ, there are too few points, a sigma
/// is not positive, or every `x` is zero.
///
/// # Example
///
/// ```
/// use physlab::support::fit::proportional;
///
/// let fit = proportional(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0], None).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// ```
pub fn proportional(x: &[f64], y: &[f64], sigma: Option<&[f64]>) -> Result<ProportionalFit, FitError> {
    check_lengths(x, y)?;

    let weights = match sigma {
        Some(sigma) => {
            check_lengths(x, sigma)?;
            sigma
                .iter()
                .enumerate()
                .map(|(index, &s)| {
                    if s > 0.0 {
                        Ok(1.0 / (s * s))
                    } else {
                        Err(FitError::NonPositiveSigma { index, sigma: s })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        None => vec![1.0; x.len()],
    };

    let needed = if sigma.is_some() { 1 } else { 2 };
    if x.len() < needed {
        return Err(FitError::TooFewPoints {
            needed,
            found: x.len(),
        });
    }

    let sxx: f64 = x.iter().zip(&weights).map(|(xi, w)| w * xi * xi).sum();
    let sxy: f64 = x
        .iter()
        .zip(y)
        .zip(&weights)
        .map(|((xi, yi), w)| w * xi * yi)
        .sum();
    if sxx == 0.0 {
        return Err(FitError::Singular);
    }

    let slope = sxy / sxx;
    let chi_squared: f64 = x
        .iter()
        .zip(y)
        .zip(&weights)
        .map(|((xi, yi), w)| w * (yi - slope * xi).powi(2))
        .sum();

    let std_error = if sigma.is_some() {
        (1.0 / sxx).sqrt()
    } else {
        #[allow(clippy::cast_precision_loss)]
        let dof = (x.len() - 1) as f64;
        (chi_squared / dof / sxx).sqrt()
    };

    Ok(ProportionalFit {
        slope,
        std_error,
        chi_squared,
    })
}
