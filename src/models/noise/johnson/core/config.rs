use twine_solvers::equation::bisection;
use uom::si::{
    capacitance::picofarad,
    f64::{Capacitance, Frequency, ThermodynamicTemperature},
    frequency::hertz,
    thermodynamic_temperature::kelvin,
};

use crate::support::{fit::LmConfig, quadrature::QuadConfig};

/// Settings for the Johnson noise reduction.
///
/// The defaults describe the lab setup: a 3–10 kHz measurement band, a
/// 6.01 ± 0.05 pF input capacitance, and baths at 298 K and 77 K.
#[derive(Debug, Clone, Copy)]
pub struct NoiseConfig {
    /// Lower edge of the integration band.
    pub band_low: Frequency,

    /// Upper edge of the integration band.
    pub band_high: Frequency,

    /// Input capacitance in parallel with the resistor.
    pub capacitance: Capacitance,

    /// One standard deviation uncertainty of the capacitance.
    pub capacitance_sigma: Capacitance,

    /// Room temperature bath.
    pub room_temperature: ThermodynamicTemperature,

    /// Liquid nitrogen bath.
    pub ln2_temperature: ThermodynamicTemperature,

    /// Gaussian gain fit settings.
    pub lm: LmConfig,

    /// Band gain integration settings.
    pub quadrature: QuadConfig,

    /// Roll-off resistance search settings.
    pub roll_off: RollOffConfig,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            band_low: Frequency::new::<hertz>(3_000.0),
            band_high: Frequency::new::<hertz>(10_000.0),
            capacitance: Capacitance::new::<picofarad>(6.01),
            capacitance_sigma: Capacitance::new::<picofarad>(0.05),
            room_temperature: ThermodynamicTemperature::new::<kelvin>(298.0),
            ln2_temperature: ThermodynamicTemperature::new::<kelvin>(77.0),
            lm: LmConfig::default(),
            quadrature: QuadConfig::default(),
            roll_off: RollOffConfig::default(),
        }
    }
}

/// Search settings for the band gain roll-off resistance.
#[derive(Debug, Clone, Copy)]
pub struct RollOffConfig {
    /// Band gain at the roll-off resistance as a fraction of its value at
    /// zero resistance.
    pub fraction: f64,

    /// Maximum iteration count for the bisection solve.
    pub max_iters: usize,

    /// Relative tolerance on the resistance.
    pub resistance_rel_tol: f64,

    /// Maximum number of times the upper bracket is doubled.
    pub max_doublings: usize,
}

impl Default for RollOffConfig {
    fn default() -> Self {
        Self {
            fraction: 0.5,
            max_iters: 200,
            resistance_rel_tol: 1e-12,
            max_doublings: 64,
        }
    }
}

impl RollOffConfig {
    /// Converts this configuration into a bisection solver configuration.
    pub(super) fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: 0.0,
            x_rel_tol: self.resistance_rel_tol,
            residual_tol: 0.0,
        }
    }
}
