use std::path::Path;

use uom::si::{
    electrical_resistance::ohm,
    f64::{ElectricalResistance, HeatCapacity, TemperatureInterval, ThermodynamicTemperature},
    heat_capacity::joule_per_kelvin,
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    constraint::{NonNegative, StrictlyPositive},
    fit::{ProportionalFit, proportional},
    table::Table,
    units::boltzmann_constant,
};

use super::{BandGain, GainFit, NoiseConfig, NoiseError, band_gain};

/// Noise power measured across a set of resistors in one bath.
///
/// Rows are `R, V²[, σ_V²[, σ_R]]`; missing uncertainty columns are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseTable {
    resistance: Vec<f64>,
    v2: Vec<f64>,
    v2_sigma: Vec<f64>,
    resistance_sigma: Vec<f64>,
}

impl NoiseTable {
    /// Builds a table from columns in ohms and V².
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::LengthMismatch`] if the columns differ in length
    /// and [`NoiseError::InvalidInput`] if a resistance or noise power is not
    /// positive or an uncertainty is negative.
    pub fn new(
        resistance: Vec<f64>,
        v2: Vec<f64>,
        v2_sigma: Vec<f64>,
        resistance_sigma: Vec<f64>,
    ) -> Result<Self, NoiseError> {
        for column in [&v2, &v2_sigma, &resistance_sigma] {
            if column.len() != resistance.len() {
                return Err(NoiseError::LengthMismatch {
                    expected: resistance.len(),
                    found: column.len(),
                });
            }
        }
        for (&r, &v) in resistance.iter().zip(&v2) {
            StrictlyPositive::new(r).map_err(NoiseError::invalid("resistance"))?;
            StrictlyPositive::new(v).map_err(NoiseError::invalid("noise power"))?;
        }
        for &s in v2_sigma.iter().chain(&resistance_sigma) {
            NonNegative::new(s).map_err(NoiseError::invalid("uncertainty"))?;
        }

        Ok(Self {
            resistance,
            v2,
            v2_sigma,
            resistance_sigma,
        })
    }

    /// Reads a noise table from its columns.
    ///
    /// # Errors
    ///
    /// Returns a [`NoiseError`] if the table lacks the first two columns or
    /// holds invalid values.
    pub fn from_table(table: &Table) -> Result<Self, NoiseError> {
        Self::new(
            table.column(0)?,
            table.column(1)?,
            table.column_or_zeros(2),
            table.column_or_zeros(3),
        )
    }

    /// Reads a noise table file.
    ///
    /// # Errors
    ///
    /// Returns a [`NoiseError`] if the file cannot be read or is invalid.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, NoiseError> {
        Self::from_table(&Table::read(path, 0)?)
    }

    /// Resistances, Ω.
    #[must_use]
    pub fn resistance(&self) -> &[f64] {
        &self.resistance
    }

    /// Mean square noise voltages, V².
    #[must_use]
    pub fn v2(&self) -> &[f64] {
        &self.v2
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resistance.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resistance.is_empty()
    }
}

/// Temperature from the slope of `V²/(2·k_B·B)` against `R`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureFit {
    pub temperature: ThermodynamicTemperature,
    pub std_error: TemperatureInterval,

    /// Whether the points were weighted by their propagated uncertainty.
    pub weighted: bool,
}

/// Boltzmann constant from the slope of `V²/(2·B)` against `R·T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltzmannFit {
    pub constant: HeatCapacity,
    pub std_error: HeatCapacity,

    /// Ratio of the fitted constant to the exact SI value.
    pub ratio: f64,

    /// Whether the points were weighted by their propagated uncertainty.
    pub weighted: bool,
}

/// Everything derived from one bath.
#[derive(Debug, Clone, PartialEq)]
pub struct BathAnalysis {
    /// Band gain for each resistor, in table order.
    pub band_gains: Vec<BandGain>,
    pub temperature: TemperatureFit,
    pub boltzmann: BoltzmannFit,
}

/// Reduces one bath: band gains per resistor, then the temperature and
/// Boltzmann constant fits.
///
/// `reference` is the bath temperature assumed by the Boltzmann fit.
///
/// # Errors
///
/// Returns a [`NoiseError`] if a band gain integral or a fit fails.
pub fn analyze_bath(
    fit: &GainFit,
    table: &NoiseTable,
    reference: ThermodynamicTemperature,
    config: &NoiseConfig,
) -> Result<BathAnalysis, NoiseError> {
    let band_gains = table
        .resistance
        .iter()
        .zip(&table.resistance_sigma)
        .map(|(&r, &sigma_r)| {
            band_gain(
                fit,
                ElectricalResistance::new::<ohm>(r),
                ElectricalResistance::new::<ohm>(sigma_r),
                config,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let k_b = boltzmann_constant().get::<joule_per_kelvin>();
    let t_ref = reference.get::<kelvin>();

    // Relative uncertainties of V² and B, shared by both fits.
    let rel_v2: Vec<f64> = table.v2_sigma.iter().zip(&table.v2).map(|(s, v)| s / v).collect();
    let rel_band: Vec<f64> = band_gains.iter().map(|b| b.std_error / b.value).collect();

    let y_temperature: Vec<f64> = table
        .v2
        .iter()
        .zip(&band_gains)
        .map(|(v, b)| v / (2.0 * k_b * b.value))
        .collect();
    let sigma_temperature: Vec<f64> = y_temperature
        .iter()
        .zip(rel_v2.iter().zip(&rel_band))
        .map(|(y, (rv, rb))| y * rv.hypot(*rb))
        .collect();
    let (temperature, temperature_weighted) =
        weighted_or_plain(&table.resistance, &y_temperature, &sigma_temperature)?;

    let x_boltzmann: Vec<f64> = table.resistance.iter().map(|r| r * t_ref).collect();
    let y_boltzmann: Vec<f64> = y_temperature.iter().map(|y| y * k_b).collect();
    let sigma_boltzmann: Vec<f64> = y_boltzmann
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let rel_r = table.resistance_sigma[i] / table.resistance[i];
            y * (rel_v2[i].powi(2) + rel_band[i].powi(2) + rel_r.powi(2)).sqrt()
        })
        .collect();
    let (boltzmann, boltzmann_weighted) =
        weighted_or_plain(&x_boltzmann, &y_boltzmann, &sigma_boltzmann)?;

    tracing::info!(
        reference = t_ref,
        temperature = temperature.slope,
        boltzmann = boltzmann.slope,
        ratio = boltzmann.slope / k_b,
        "reduced bath"
    );

    Ok(BathAnalysis {
        band_gains,
        temperature: TemperatureFit {
            temperature: ThermodynamicTemperature::new::<kelvin>(temperature.slope),
            std_error: TemperatureInterval::new::<delta_kelvin>(temperature.std_error),
            weighted: temperature_weighted,
        },
        boltzmann: BoltzmannFit {
            constant: HeatCapacity::new::<joule_per_kelvin>(boltzmann.slope),
            std_error: HeatCapacity::new::<joule_per_kelvin>(boltzmann.std_error),
            ratio: boltzmann.slope / k_b,
            weighted: boltzmann_weighted,
        },
    })
}

/// Weighted fit when every propagated sigma is positive, unweighted otherwise.
fn weighted_or_plain(
    x: &[f64],
    y: &[f64],
    sigma: &[f64],
) -> Result<(ProportionalFit, bool), NoiseError> {
    if sigma.iter().all(|s| *s > 0.0 && s.is_finite()) {
        Ok((proportional(x, y, Some(sigma))?, true))
    } else {
        tracing::debug!("uncertainties incomplete, fitting unweighted");
        Ok((proportional(x, y, None)?, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn optional_uncertainty_columns() {
        let table = Table::parse("1e3, 1e-9\n1e4, 1e-8\n", 0).unwrap();
        let noise = NoiseTable::from_table(&table).unwrap();
        assert_eq!(noise.len(), 2);
        assert_eq!(noise.v2_sigma, vec![0.0, 0.0]);
        assert_eq!(noise.resistance_sigma, vec![0.0, 0.0]);

        let table = Table::parse("1e3, 1e-9, 2e-11, 12\n", 0).unwrap();
        let noise = NoiseTable::from_table(&table).unwrap();
        assert_eq!(noise.resistance_sigma, vec![12.0]);
    }

    #[test]
    fn rejects_invalid_rows() {
        let err = NoiseTable::new(vec![0.0], vec![1e-9], vec![0.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, NoiseError::InvalidInput { field: "resistance", .. }));

        let err = NoiseTable::new(vec![1e3], vec![1e-9], vec![-1.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, NoiseError::InvalidInput { field: "uncertainty", .. }));

        let err = NoiseTable::new(vec![1e3, 1e4], vec![1e-9], vec![], vec![]).unwrap_err();
        assert!(matches!(err, NoiseError::LengthMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn plain_fit_without_uncertainties() {
        let (fit, weighted) = weighted_or_plain(&[1.0, 2.0], &[3.0, 6.0], &[0.0, 0.1]).unwrap();
        assert!(!weighted);
        assert_relative_eq!(fit.slope, 3.0);
    }
}
