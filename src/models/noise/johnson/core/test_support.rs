use uom::si::{f64::Frequency, frequency::hertz};

use super::{GainCurve, Gaussian, Sweep};

/// The gain profile used across the noise tests.
pub(super) fn lab_gaussian() -> Gaussian {
    Gaussian {
        amplitude: 500.0,
        center: Frequency::new::<hertz>(6_500.0),
        width: Frequency::new::<hertz>(1_500.0),
    }
}

/// A 1–20 kHz sweep pair whose gain is exactly `truth`.
pub(super) fn synthetic_sweeps(truth: &Gaussian) -> (Sweep, Sweep) {
    let frequency: Vec<f64> = (10..=200).map(|i| 100.0 * f64::from(i)).collect();
    let background = vec![1e-6; frequency.len()];
    let amplifier = frequency
        .iter()
        .map(|&f| 1e-6 * truth.gain(Frequency::new::<hertz>(f)))
        .collect();

    (
        Sweep::new(frequency.clone(), amplifier).unwrap(),
        Sweep::new(frequency, background).unwrap(),
    )
}

pub(super) fn synthetic_curve(truth: &Gaussian) -> GainCurve {
    let (amplifier, background) = synthetic_sweeps(truth);
    GainCurve::from_sweeps(&[amplifier], &[background]).unwrap()
}
