//! Resistance at which the band gain falls to a fraction of its open value.

use std::convert::Infallible;

use twine_core::{EquationProblem, Model};
use twine_solvers::equation::bisection;
use uom::si::{
    capacitance::farad, electrical_resistance::ohm, f64::ElectricalResistance, frequency::hertz,
};

use super::{Gaussian, NoiseConfig, NoiseError, band_gain_value};

/// Band gain as a function of resistance.
struct BandGainModel<'a> {
    curve: &'a Gaussian,
    config: &'a NoiseConfig,
}

/// A resistance and its band gain, Hz.
#[derive(Debug, Clone, Copy)]
struct BandPoint {
    resistance: ElectricalResistance,
    band_gain: f64,
}

impl Model for BandGainModel<'_> {
    type Input = ElectricalResistance;
    type Output = BandPoint;
    type Error = NoiseError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        Ok(BandPoint {
            resistance: *input,
            band_gain: band_gain_value(self.curve, *input, self.config)?,
        })
    }
}

/// Residual `B(R) - target`.
struct RollOffProblem {
    target: f64,
}

impl EquationProblem<1> for RollOffProblem {
    type Input = ElectricalResistance;
    type Output = BandPoint;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(ElectricalResistance::new::<ohm>(x[0]))
    }

    fn residuals(&self, _input: &Self::Input, output: &Self::Output) -> Result<[f64; 1], Self::Error> {
        Ok([output.band_gain - self.target])
    }
}

/// Finds the resistance where the band gain equals `fraction` of its
/// zero-resistance value.
///
/// The upper bracket starts at the RC corner of the band's top frequency,
/// `1/(2π·f_hi·C)`, and doubles until the band gain is below the target.
///
/// # Errors
///
/// Returns [`NoiseError::RollOffNotBracketed`] if the fraction is outside
/// `(0, 1)` or no bracket is found, and [`NoiseError::MaxIters`] if
/// bisection does not converge.
pub fn roll_off_resistance(
    curve: &Gaussian,
    config: &NoiseConfig,
) -> Result<ElectricalResistance, NoiseError> {
    let settings = &config.roll_off;
    let fraction = settings.fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(NoiseError::RollOffNotBracketed { fraction });
    }

    let model = BandGainModel { curve, config };
    let open = model.call(&ElectricalResistance::new::<ohm>(0.0))?.band_gain;
    let problem = RollOffProblem {
        target: fraction * open,
    };

    let corner = 1.0
        / (2.0
            * std::f64::consts::PI
            * config.band_high.get::<hertz>()
            * config.capacitance.get::<farad>());
    let mut upper = corner;
    let mut doublings = 0;
    while model.call(&ElectricalResistance::new::<ohm>(upper))?.band_gain > problem.target {
        if doublings == settings.max_doublings {
            return Err(NoiseError::RollOffNotBracketed { fraction });
        }
        upper *= 2.0;
        doublings += 1;
    }

    let solution = bisection::solve(
        &model,
        &problem,
        [0.0, upper],
        &settings.bisection(),
        |event: &bisection::Event<'_, _, _>| {
            // A failed integral is treated as lying past the root.
            if event.result().is_err() {
                return Some(bisection::Action::assume_positive());
            }
            None
        },
    )?;

    if solution.status != bisection::Status::Converged {
        return Err(NoiseError::MaxIters {
            residual: solution.residual,
            iters: solution.iters,
        });
    }

    let resistance = solution.snapshot.output.resistance;
    tracing::debug!(
        fraction,
        resistance = resistance.get::<ohm>(),
        iters = solution.iters,
        "found roll-off resistance"
    );
    Ok(resistance)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::noise::johnson::core::{RollOffConfig, test_support::lab_gaussian};

    #[test]
    fn band_gain_halves_at_the_root() {
        let config = NoiseConfig::default();
        let curve = lab_gaussian();

        let r = roll_off_resistance(&curve, &config).unwrap();
        let open = band_gain_value(&curve, ElectricalResistance::new::<ohm>(0.0), &config).unwrap();
        let at_root = band_gain_value(&curve, r, &config).unwrap();

        assert_relative_eq!(at_root / open, 0.5, max_relative = 1e-6);
        assert!(r.get::<ohm>() > 1e6);
    }

    #[test]
    fn deeper_fraction_needs_more_resistance() {
        let half = roll_off_resistance(&lab_gaussian(), &NoiseConfig::default()).unwrap();
        let tenth = roll_off_resistance(
            &lab_gaussian(),
            &NoiseConfig {
                roll_off: RollOffConfig {
                    fraction: 0.1,
                    ..RollOffConfig::default()
                },
                ..NoiseConfig::default()
            },
        )
        .unwrap();

        assert!(tenth > half);
    }

    #[test]
    fn rejects_fractions_outside_the_unit_interval() {
        let config = NoiseConfig {
            roll_off: RollOffConfig {
                fraction: 1.5,
                ..RollOffConfig::default()
            },
            ..NoiseConfig::default()
        };
        assert!(matches!(
            roll_off_resistance(&lab_gaussian(), &config),
            Err(NoiseError::RollOffNotBracketed { fraction }) if fraction == 1.5
        ));
    }
}
