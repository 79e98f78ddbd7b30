//! Johnson noise data reduction.
//!
//! The amplifier gain is measured by sweeping a known signal with and
//! without the preamplifier. A Gaussian fit to that gain curve gives the
//! band gain `B(R)` of each resistor, which turns the measured noise power
//! `V²` into a temperature or, at a known temperature, into `k_B`.

mod band;
mod bath;
mod config;
mod error;
mod gaussian;
mod roll_off;
mod sweep;

#[cfg(test)]
mod test_support;

pub use band::{BandGain, band_gain, band_gain_value};
pub use bath::{BathAnalysis, BoltzmannFit, NoiseTable, TemperatureFit, analyze_bath};
pub use config::{NoiseConfig, RollOffConfig};
pub use error::NoiseError;
pub use gaussian::{GainFit, Gaussian};
pub use roll_off::roll_off_resistance;
pub use sweep::{GainCurve, Sweep};
