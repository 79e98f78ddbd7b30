//! Boltzmann's constant from thermal noise in resistors.
//!
//! A resistor at temperature `T` shows a noise power `V² ∝ k_B·T·R·B(R)`
//! through an amplifier of band gain `B(R)`. The reduction here follows the
//! lab procedure:
//!
//! 1. Average three amplifier sweeps and three background sweeps, and divide
//!    them to get the gain curve.
//! 2. Fit a Gaussian to the gain.
//! 3. Integrate the squared gain, rolled off by the input capacitance, over
//!    the measurement band for each resistor, propagating the fit,
//!    capacitance and resistance uncertainties.
//! 4. Fit `V²/(2·k_B·B)` against `R` for the bath temperature, and
//!    `V²/(2·B)` against `R·T` for the Boltzmann constant.
//!
//! [`JohnsonNoiseModel`] is the [`twine_core::Model`] adapter for the whole
//! procedure.

mod core;

pub use self::core::{
    BandGain, BathAnalysis, BoltzmannFit, GainCurve, GainFit, Gaussian, NoiseConfig, NoiseError,
    NoiseTable, RollOffConfig, Sweep, TemperatureFit, analyze_bath, band_gain, band_gain_value,
    roll_off_resistance,
};

use twine_core::Model;
use uom::si::f64::ElectricalResistance;

/// Measurements for one lab session.
#[derive(Debug, Clone)]
pub struct NoiseData {
    pub amplifier: Vec<Sweep>,
    pub background: Vec<Sweep>,
    pub room: NoiseTable,
    pub ln2: NoiseTable,
}

/// Results of a full reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseAnalysis {
    pub gain: GainCurve,
    pub fit: GainFit,
    pub room: BathAnalysis,
    pub ln2: BathAnalysis,

    /// Resistance at which the band gain falls to the configured fraction.
    pub roll_off: ElectricalResistance,
}

/// Reduces a session of Johnson noise measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct JohnsonNoiseModel {
    pub config: NoiseConfig,
}

impl Model for JohnsonNoiseModel {
    type Input = NoiseData;
    type Output = NoiseAnalysis;
    type Error = NoiseError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let config = &self.config;
        let gain = GainCurve::from_sweeps(&input.amplifier, &input.background)?;
        let fit = gain.fit(&config.lm)?;

        let room = analyze_bath(&fit, &input.room, config.room_temperature, config)?;
        let ln2 = analyze_bath(&fit, &input.ln2, config.ln2_temperature, config)?;
        let roll_off = roll_off_resistance(&fit.curve, config)?;

        Ok(NoiseAnalysis {
            gain,
            fit,
            room,
            ln2,
            roll_off,
        })
    }
}
