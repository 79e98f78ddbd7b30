use uom::si::{f64::Frequency, frequency::hertz};

use crate::support::fit::{CurveModel, LmConfig, levenberg_marquardt};

use super::{GainCurve, NoiseError};

/// A Gaussian gain profile, `G(f) = a·exp(-(f-μ)²/(2σ²))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    /// Peak gain `a`.
    pub amplitude: f64,

    /// Center frequency `μ`.
    pub center: Frequency,

    /// Width `σ`.
    pub width: Frequency,
}

impl Gaussian {
    fn from_params([amplitude, center, width]: [f64; 3]) -> Self {
        Self {
            amplitude,
            center: Frequency::new::<hertz>(center),
            width: Frequency::new::<hertz>(width),
        }
    }

    /// Parameters as `[a, μ, σ]` in hertz.
    #[must_use]
    pub fn params(&self) -> [f64; 3] {
        [
            self.amplitude,
            self.center.get::<hertz>(),
            self.width.get::<hertz>(),
        ]
    }

    /// Gain at `frequency`.
    #[must_use]
    pub fn gain(&self, frequency: Frequency) -> f64 {
        GaussianCurve.value(frequency.get::<hertz>(), &self.params())
    }
}

/// Best-fit Gaussian gain with one standard deviation uncertainties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainFit {
    pub curve: Gaussian,
    pub uncertainty: Gaussian,

    /// Sum of squared gain residuals.
    pub ssr: f64,
}

struct GaussianCurve;

impl CurveModel<3> for GaussianCurve {
    fn value(&self, f: f64, &[a, mu, sigma]: &[f64; 3]) -> f64 {
        a * (-(f - mu).powi(2) / (2.0 * sigma * sigma)).exp()
    }

    fn gradient(&self, f: f64, &[a, mu, sigma]: &[f64; 3]) -> [f64; 3] {
        let d = f - mu;
        let e = (-d * d / (2.0 * sigma * sigma)).exp();
        [
            e,
            a * e * d / (sigma * sigma),
            a * e * d * d / sigma.powi(3),
        ]
    }
}

impl GainCurve {
    /// Fits a Gaussian to the gain curve, starting from
    /// [`GainCurve::initial_guess`].
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::DegenerateGain`] if there is no starting point and
    /// [`NoiseError::Fit`] if the fit fails.
    pub fn fit(&self, config: &LmConfig) -> Result<GainFit, NoiseError> {
        let p0 = self.initial_guess()?;
        let fit = levenberg_marquardt(&GaussianCurve, self.frequency(), self.gain(), p0, config)?;

        // σ enters squared, so a negative width is the same curve.
        let [a, mu, sigma] = fit.params;
        let curve = Gaussian::from_params([a, mu, sigma.abs()]);
        let uncertainty = Gaussian::from_params(fit.std_errors);

        tracing::debug!(
            amplitude = a,
            center = mu,
            width = sigma.abs(),
            iters = fit.iters,
            "fitted gain curve"
        );

        Ok(GainFit {
            curve,
            uncertainty,
            ssr: fit.ssr,
        })
    }
}
