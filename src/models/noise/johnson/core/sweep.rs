use std::path::Path;

use crate::support::table::Table;

use super::NoiseError;

/// Relative tolerance when comparing frequency grids of different sweeps.
const FREQUENCY_REL_TOL: f64 = 1e-9;

/// A spectrum analyzer sweep: RMS voltage against frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    frequency: Vec<f64>,
    vrms: Vec<f64>,
}

impl Sweep {
    /// Pairs frequencies (Hz) with RMS voltages (V).
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::LengthMismatch`] if the columns differ in length.
    pub fn new(frequency: Vec<f64>, vrms: Vec<f64>) -> Result<Self, NoiseError> {
        if frequency.len() != vrms.len() {
            return Err(NoiseError::LengthMismatch {
                expected: frequency.len(),
                found: vrms.len(),
            });
        }
        Ok(Self { frequency, vrms })
    }

    /// Takes the first two columns of `table` as frequency and voltage.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::Table`] if the table has fewer than two columns.
    pub fn from_table(table: &Table) -> Result<Self, NoiseError> {
        Self::new(table.column(0)?, table.column(1)?)
    }

    /// Reads a sweep file of `frequency, Vrms` rows.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::Table`] if the file cannot be read or parsed.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, NoiseError> {
        Self::from_table(&Table::read(path, 0)?)
    }

    #[must_use]
    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    #[must_use]
    pub fn vrms(&self) -> &[f64] {
        &self.vrms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Pointwise mean of sweeps taken on the same frequency grid.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::NoSweeps`] for an empty slice and
    /// [`NoiseError::FrequencyMismatch`] or [`NoiseError::LengthMismatch`]
    /// if the grids differ.
    pub fn average(sweeps: &[Sweep]) -> Result<Self, NoiseError> {
        let (first, rest) = sweeps.split_first().ok_or(NoiseError::NoSweeps)?;
        for (offset, sweep) in rest.iter().enumerate() {
            first.check_grid(sweep, offset + 1)?;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = sweeps.len() as f64;
        let vrms = (0..first.len())
            .map(|i| sweeps.iter().map(|s| s.vrms[i]).sum::<f64>() / count)
            .collect();

        Ok(Self {
            frequency: first.frequency.clone(),
            vrms,
        })
    }

    fn check_grid(&self, other: &Sweep, sweep: usize) -> Result<(), NoiseError> {
        if other.len() != self.len() {
            return Err(NoiseError::LengthMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        let mismatch = self
            .frequency
            .iter()
            .zip(&other.frequency)
            .position(|(a, b)| (a - b).abs() > FREQUENCY_REL_TOL * a.abs().max(b.abs()));
        match mismatch {
            Some(index) => Err(NoiseError::FrequencyMismatch { sweep, index }),
            None => Ok(()),
        }
    }
}

/// Amplifier gain against frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct GainCurve {
    frequency: Vec<f64>,
    gain: Vec<f64>,
}

impl GainCurve {
    /// Pairs frequencies (Hz) with gains.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::LengthMismatch`] if the columns differ in length.
    pub fn new(frequency: Vec<f64>, gain: Vec<f64>) -> Result<Self, NoiseError> {
        if frequency.len() != gain.len() {
            return Err(NoiseError::LengthMismatch {
                expected: frequency.len(),
                found: gain.len(),
            });
        }
        Ok(Self { frequency, gain })
    }

    /// Gain of the averaged amplifier sweeps over the averaged background
    /// sweeps, `G(f) = V̄_amp / V̄_bkg`.
    ///
    /// # Errors
    ///
    /// Returns a [`NoiseError`] if the sweeps do not share a frequency grid
    /// or the background voltage is zero somewhere. A grid mismatch between
    /// the two groups is reported against the first background sweep,
    /// numbered after the amplifier sweeps.
    pub fn from_sweeps(amplifier: &[Sweep], background: &[Sweep]) -> Result<Self, NoiseError> {
        let amp_mean = Sweep::average(amplifier)?;
        let bkg_mean = Sweep::average(background)?;
        amp_mean.check_grid(&bkg_mean, amplifier.len())?;

        let gain = amp_mean
            .vrms
            .iter()
            .zip(&bkg_mean.vrms)
            .zip(&amp_mean.frequency)
            .map(|((amp, bkg), &frequency)| {
                if *bkg == 0.0 {
                    Err(NoiseError::ZeroBackground { frequency })
                } else {
                    Ok(amp / bkg)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(points = gain.len(), "computed gain curve");
        Ok(Self {
            frequency: amp_mean.frequency,
            gain,
        })
    }

    /// Frequencies, Hz.
    #[must_use]
    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    /// Dimensionless gain at each frequency.
    #[must_use]
    pub fn gain(&self) -> &[f64] {
        &self.gain
    }

    /// Moment estimates for a Gaussian fit: `[max G, ΣfG/ΣG, sqrt(ΣG(f-μ)²/ΣG)]`.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::DegenerateGain`] if the gain sums to zero or less.
    pub fn initial_guess(&self) -> Result<[f64; 3], NoiseError> {
        let total: f64 = self.gain.iter().sum();
        if self.gain.is_empty() || total <= 0.0 {
            return Err(NoiseError::DegenerateGain);
        }

        let amplitude = self.gain.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let center = self
            .frequency
            .iter()
            .zip(&self.gain)
            .map(|(&f, &gain)| gain * f)
            .sum::<f64>()
            / total;
        let variance = self
            .frequency
            .iter()
            .zip(&self.gain)
            .map(|(&f, &gain)| gain * (f - center).powi(2))
            .sum::<f64>()
            / total;

        Ok([amplitude, center, variance.sqrt()])
    }
}
