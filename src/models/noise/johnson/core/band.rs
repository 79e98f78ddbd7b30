use std::f64::consts::PI;

use uom::si::{
    capacitance::farad,
    electrical_resistance::ohm,
    f64::{ElectricalResistance, Frequency},
    frequency::hertz,
};

use crate::support::quadrature::{QuadConfig, integrate};

use super::{GainFit, Gaussian, NoiseConfig, NoiseError};

/// Samples used to estimate the integrand scale for the error tolerance.
const SCALE_SAMPLES: u32 = 64;

/// Band gain `B(R)` with its propagated uncertainty, in hertz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandGain {
    pub value: f64,
    pub std_error: f64,
}

/// `G(f)² / (1 + (2πfCR)²)` and its partial derivatives.
#[derive(Debug, Clone, Copy)]
struct Integrand {
    a: f64,
    mu: f64,
    sigma: f64,
    c: f64,
    r: f64,
}

impl Integrand {
    fn new(curve: &Gaussian, config: &NoiseConfig, resistance: f64) -> Self {
        let [a, mu, sigma] = curve.params();
        Self {
            a,
            mu,
            sigma,
            c: config.capacitance.get::<farad>(),
            r: resistance,
        }
    }

    /// `exp(-(f-μ)²/σ²)`, the squared Gaussian shape.
    fn shape(&self, f: f64) -> f64 {
        (-(f - self.mu).powi(2) / (self.sigma * self.sigma)).exp()
    }

    fn roll_off(&self, f: f64) -> f64 {
        1.0 + (2.0 * PI * f * self.c * self.r).powi(2)
    }

    fn value(&self, f: f64) -> f64 {
        self.a * self.a * self.shape(f) / self.roll_off(f)
    }

    fn d_amplitude(&self, f: f64) -> f64 {
        2.0 * self.a * self.shape(f) / self.roll_off(f)
    }

    fn d_center(&self, f: f64) -> f64 {
        2.0 * self.a * self.a * (f - self.mu) * self.shape(f)
            / (self.sigma * self.sigma * self.roll_off(f))
    }

    fn d_width(&self, f: f64) -> f64 {
        2.0 * self.a * self.a * (f - self.mu).powi(2) * self.shape(f)
            / (self.sigma.powi(3) * self.roll_off(f))
    }

    fn d_capacitance(&self, f: f64) -> f64 {
        -8.0 * PI * PI * self.c * self.r * self.r * f * f * self.a * self.a * self.shape(f)
            / self.roll_off(f).powi(2)
    }

    fn d_resistance(&self, f: f64) -> f64 {
        -8.0 * PI * PI * self.c * self.c * self.r * f * f * self.a * self.a * self.shape(f)
            / self.roll_off(f).powi(2)
    }
}

/// Integrates over the band with an absolute tolerance scaled to the size of
/// the integrand, so that integrals that nearly cancel still terminate.
fn integrate_band(
    f: impl Fn(f64) -> f64,
    lo: f64,
    hi: f64,
    config: &QuadConfig,
) -> Result<f64, NoiseError> {
    let peak = (0..=SCALE_SAMPLES)
        .map(|i| f(lo + (hi - lo) * f64::from(i) / f64::from(SCALE_SAMPLES)).abs())
        .fold(0.0, f64::max);
    let scaled = QuadConfig {
        abs_tol: config.abs_tol.max(config.rel_tol * peak * (hi - lo)),
        ..*config
    };
    Ok(integrate(f, lo, hi, &scaled)?.value)
}

fn band_limits(config: &NoiseConfig) -> (f64, f64) {
    (
        config.band_low.get::<hertz>(),
        config.band_high.get::<hertz>(),
    )
}

/// Band gain `B(R) = ∫ G(f)² / (1 + (2πfCR)²) df` over the configured band.
///
/// # Errors
///
/// Returns [`NoiseError::Quadrature`] if the integral fails.
pub fn band_gain_value(
    curve: &Gaussian,
    resistance: ElectricalResistance,
    config: &NoiseConfig,
) -> Result<f64, NoiseError> {
    let integrand = Integrand::new(curve, config, resistance.get::<ohm>());
    let (lo, hi) = band_limits(config);
    integrate_band(|f| integrand.value(f), lo, hi, &config.quadrature)
}

/// Band gain for a resistor, with the uncertainty of the Gaussian
/// parameters, the capacitance and the resistance propagated through the
/// integrals of the partial derivatives.
///
/// # Errors
///
/// Returns [`NoiseError::Quadrature`] if an integral fails.
pub fn band_gain(
    fit: &GainFit,
    resistance: ElectricalResistance,
    resistance_sigma: ElectricalResistance,
    config: &NoiseConfig,
) -> Result<BandGain, NoiseError> {
    let integrand = Integrand::new(&fit.curve, config, resistance.get::<ohm>());
    let (lo, hi) = band_limits(config);
    let quad = &config.quadrature;

    let value = integrate_band(|f| integrand.value(f), lo, hi, quad)?;

    let [sigma_a, sigma_mu, sigma_sigma] = fit.uncertainty.params();
    let terms = [
        (integrate_band(|f| integrand.d_amplitude(f), lo, hi, quad)?, sigma_a),
        (integrate_band(|f| integrand.d_center(f), lo, hi, quad)?, sigma_mu),
        (integrate_band(|f| integrand.d_width(f), lo, hi, quad)?, sigma_sigma),
        (
            integrate_band(|f| integrand.d_capacitance(f), lo, hi, quad)?,
            config.capacitance_sigma.get::<farad>(),
        ),
        (
            integrate_band(|f| integrand.d_resistance(f), lo, hi, quad)?,
            resistance_sigma.get::<ohm>(),
        ),
    ];
    let std_error = terms
        .iter()
        .map(|(partial, sigma)| (partial * sigma).powi(2))
        .sum::<f64>()
        .sqrt();

    tracing::debug!(resistance = integrand.r, value, std_error, "integrated band gain");
    Ok(BandGain { value, std_error })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{capacitance::picofarad, f64::Capacitance};

    use crate::models::noise::johnson::core::test_support::lab_gaussian;

    fn fit_with(uncertainty: [f64; 3]) -> GainFit {
        let [amplitude, center, width] = uncertainty;
        GainFit {
            curve: lab_gaussian(),
            uncertainty: Gaussian {
                amplitude,
                center: Frequency::new::<hertz>(center),
                width: Frequency::new::<hertz>(width),
            },
            ssr: 0.0,
        }
    }

    fn ohms(value: f64) -> ElectricalResistance {
        ElectricalResistance::new::<ohm>(value)
    }

    #[test]
    fn wide_band_at_zero_resistance_is_closed_form() {
        // ±10σ around the center holds the whole Gaussian.
        let config = NoiseConfig {
            band_low: Frequency::new::<hertz>(6_500.0 - 15_000.0),
            band_high: Frequency::new::<hertz>(6_500.0 + 15_000.0),
            ..NoiseConfig::default()
        };
        let value = band_gain_value(&lab_gaussian(), ohms(0.0), &config).unwrap();

        // ∫ a²·exp(-(f-μ)²/σ²) df = a²·σ·√π
        assert_relative_eq!(value, 500.0_f64.powi(2) * 1_500.0 * PI.sqrt(), max_relative = 1e-6);
    }

    #[test]
    fn resistance_rolls_off_the_band() {
        let config = NoiseConfig::default();
        let curve = lab_gaussian();
        let values: Vec<f64> = [0.0, 1e4, 1e5, 1e6, 1e7]
            .iter()
            .map(|&r| band_gain_value(&curve, ohms(r), &config).unwrap())
            .collect();

        assert!(values.windows(2).all(|pair| pair[1] < pair[0]));
        assert_relative_eq!(values[1], values[0], max_relative = 1e-3);
    }

    #[test]
    fn amplitude_uncertainty_propagates_linearly() {
        let config = NoiseConfig {
            capacitance_sigma: Capacitance::new::<picofarad>(0.0),
            ..NoiseConfig::default()
        };
        let band = band_gain(&fit_with([2.0, 0.0, 0.0]), ohms(1e5), ohms(0.0), &config).unwrap();

        // B ∝ a², so σ_B = 2·B·σ_a/a.
        assert_relative_eq!(band.std_error, 2.0 * band.value * 2.0 / 500.0, max_relative = 1e-9);
    }

    #[test]
    fn every_source_adds_uncertainty() {
        let config = NoiseConfig::default();
        let r = ohms(1e5);

        let capacitance_only = band_gain(&fit_with([0.0; 3]), r, ohms(0.0), &config).unwrap();
        let all = band_gain(&fit_with([1.0, 10.0, 10.0]), r, ohms(1e3), &config).unwrap();

        assert!(capacitance_only.std_error > 0.0);
        assert!(all.std_error > capacitance_only.std_error);
        assert_relative_eq!(all.value, capacitance_only.value);
    }

    #[test]
    fn partial_derivatives_match_finite_differences() {
        let config = NoiseConfig::default();
        let base = Integrand::new(&lab_gaussian(), &config, 2e5);
        let f = 8_000.0;
        let central = |plus: Integrand, minus: Integrand, h: f64| {
            (plus.value(f) - minus.value(f)) / (2.0 * h)
        };

        let h = 1e-3;
        let d_a = central(
            Integrand { a: base.a + h, ..base },
            Integrand { a: base.a - h, ..base },
            h,
        );
        assert_relative_eq!(base.d_amplitude(f), d_a, max_relative = 1e-6);

        let d_mu = central(
            Integrand { mu: base.mu + h, ..base },
            Integrand { mu: base.mu - h, ..base },
            h,
        );
        assert_relative_eq!(base.d_center(f), d_mu, max_relative = 1e-6);

        let d_sigma = central(
            Integrand { sigma: base.sigma + h, ..base },
            Integrand { sigma: base.sigma - h, ..base },
            h,
        );
        assert_relative_eq!(base.d_width(f), d_sigma, max_relative = 1e-6);

        let hc = 1e-16;
        let d_c = central(
            Integrand { c: base.c + hc, ..base },
            Integrand { c: base.c - hc, ..base },
            hc,
        );
        assert_relative_eq!(base.d_capacitance(f), d_c, max_relative = 1e-5);

        let d_r = central(
            Integrand { r: base.r + 1.0, ..base },
            Integrand { r: base.r - 1.0, ..base },
            1.0,
        );
        assert_relative_eq!(base.d_resistance(f), d_r, max_relative = 1e-5);
    }
}
