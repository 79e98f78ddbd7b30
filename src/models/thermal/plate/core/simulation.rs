use ndarray::Array2;

use super::{HeatError, HeatSystem, ObjectMask, stencil::step_into};

/// A plate advanced one step at a time.
///
/// This is the interactive mode: the caller decides how many steps to take
/// between looks at the field.
#[derive(Debug, Clone)]
pub struct Simulation {
    field: Array2<f64>,
    scratch: Array2<f64>,
    weights: Array2<f64>,
    elapsed: usize,
}

impl Simulation {
    /// Sets up the initial field of `system` with `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`HeatError::GridMismatch`] if the mask does not match the grid.
    pub fn new(system: &HeatSystem, mask: &ObjectMask) -> Result<Self, HeatError> {
        system.check_mask(mask)?;
        let field = system.initial_field(mask);
        Ok(Self {
            scratch: field.clone(),
            weights: system.weights(mask),
            field,
            elapsed: 0,
        })
    }

    /// Advances the field by `steps` time steps.
    pub fn advance(&mut self, steps: usize) {
        for _ in 0..steps {
            step_into(&self.field, &mut self.scratch, &self.weights);
            std::mem::swap(&mut self.field, &mut self.scratch);
        }
        self.elapsed += steps;
    }

    /// The current temperature field, K.
    #[must_use]
    pub fn field(&self) -> &Array2<f64> {
        &self.field
    }

    /// Steps taken since the initial state.
    #[must_use]
    pub fn elapsed(&self) -> usize {
        self.elapsed
    }
}

/// Snapshots of the field recorded during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Frames {
    frames: Vec<Array2<f64>>,
    rate: usize,
}

impl Frames {
    /// Number of recorded frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frame was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame `index`, if recorded.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Array2<f64>> {
        self.frames.get(index)
    }

    /// The final recorded frame.
    #[must_use]
    pub fn last(&self) -> Option<&Array2<f64>> {
        self.frames.last()
    }

    /// Iterates over the frames in time order.
    pub fn iter(&self) -> impl Iterator<Item = &Array2<f64>> {
        self.frames.iter()
    }

    /// Time step at which frame `index` was recorded.
    #[must_use]
    pub fn step_of(&self, index: usize) -> usize {
        index * self.rate
    }

    /// Mean object temperature of each frame, or `None` for an empty mask.
    #[must_use]
    pub fn object_mean_series(&self, mask: &ObjectMask) -> Option<Vec<f64>> {
        let count = mask.count();
        if count == 0 {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = count as f64;
        let series = self
            .frames
            .iter()
            .map(|frame| {
                let sum: f64 = frame
                    .iter()
                    .zip(mask.as_array())
                    .filter_map(|(&t, &inside)| inside.then_some(t))
                    .sum();
                sum / count
            })
            .collect();
        Some(series)
    }
}

/// Minimum, maximum and mean of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FieldStats {
    /// Summarizes `field`, or returns `None` if it is empty.
    #[must_use]
    pub fn of(field: &Array2<f64>) -> Option<Self> {
        let mean = field.mean()?;
        let (min, max) = field
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                (lo.min(t), hi.max(t))
            });
        Some(Self { min, max, mean })
    }
}

/// Runs the full simulation of `system`.
///
/// Frame 0 is the initial field. Steps `t = 1..runtime` are then taken, and
/// the field after step `t` is recorded whenever `t` is a multiple of the
/// frame rate. When the rate divides the runtime this yields
/// `runtime / rate` frames.
///
/// # Errors
///
/// Returns [`HeatError::GridMismatch`] if the mask does not match the grid.
pub fn run(system: &HeatSystem, mask: &ObjectMask) -> Result<Frames, HeatError> {
    let mut simulation = Simulation::new(system, mask)?;
    let rate = system.rate();

    let mut frames = Vec::with_capacity(system.frames());
    frames.push(simulation.field().clone());

    for t in 1..system.runtime() {
        simulation.advance(1);
        if t % rate == 0 {
            tracing::debug!(step = t, frame = frames.len(), "recorded frame");
            frames.push(simulation.field().clone());
        }
    }

    tracing::info!(
        steps = system.runtime(),
        frames = frames.len(),
        grid = system.grid(),
        "heat plate run complete"
    );

    Ok(Frames { frames, rate })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::thermal::plate::core::{Edges, PlateConfig, Shape};

    fn small_config() -> PlateConfig {
        PlateConfig {
            runtime: 40,
            grid: 20,
            rate: 10,
            edges: Edges::uniform(10.0),
            background_diffusivity: 1e-4,
            object_diffusivity: 2e-5,
            background_temp: 1.0,
            object_temp: 5.0,
            ..PlateConfig::default()
        }
    }

    #[test]
    fn frames_follow_the_rate() {
        let system = HeatSystem::new(&small_config()).unwrap();
        let mask = ObjectMask::from_shape(&Shape::Square, 20).unwrap();

        let frames = run(&system, &mask).unwrap();
        assert_eq!(frames.len(), system.frames());
        assert_eq!(frames.step_of(3), 30);

        let mut manual = Simulation::new(&system, &mask).unwrap();
        assert_eq!(frames.get(0), Some(manual.field()));
        manual.advance(10);
        assert_eq!(frames.get(1), Some(manual.field()));
        manual.advance(20);
        assert_eq!(frames.last(), Some(manual.field()));
        assert_eq!(manual.elapsed(), 30);
    }

    #[test]
    fn symmetric_setup_stays_symmetric() {
        let system = HeatSystem::new(&small_config()).unwrap();
        let mask = ObjectMask::from_shape(&Shape::Cross, 20).unwrap();

        let mut simulation = Simulation::new(&system, &mask).unwrap();
        simulation.advance(200);
        let field = simulation.field();

        for j in 0..20 {
            for i in 0..20 {
                assert_relative_eq!(field[[j, i]], field[[i, j]], epsilon = 1e-12);
                assert_relative_eq!(field[[j, i]], field[[19 - j, i]], epsilon = 1e-12);
                assert_relative_eq!(field[[j, i]], field[[j, 19 - i]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn stable_runs_obey_the_maximum_principle() {
        let system = HeatSystem::new(&small_config()).unwrap();
        let mask = ObjectMask::from_shape(&Shape::Circle, 20).unwrap();

        let mut simulation = Simulation::new(&system, &mask).unwrap();
        let initial = FieldStats::of(simulation.field()).unwrap();
        simulation.advance(500);
        let later = FieldStats::of(simulation.field()).unwrap();

        assert!(later.min >= initial.min - 1e-12);
        assert!(later.max <= initial.max + 1e-12);
        // Hot edges warm the plate.
        assert!(later.mean > initial.mean);
    }

    #[test]
    fn object_mean_series() {
        let system = HeatSystem::new(&small_config()).unwrap();
        let mask = ObjectMask::from_shape(&Shape::Dot, 20).unwrap();

        let frames = run(&system, &mask).unwrap();
        let series = frames.object_mean_series(&mask).unwrap();

        assert_eq!(series.len(), frames.len());
        assert_relative_eq!(series[0], 5.0);

        let empty = ObjectMask::empty(20);
        assert!(frames.object_mean_series(&empty).is_none());
    }

    #[test]
    fn mismatched_mask() {
        let system = HeatSystem::new(&small_config()).unwrap();
        let err = run(&system, &ObjectMask::empty(10)).unwrap_err();
        assert!(matches!(err, HeatError::GridMismatch { mask: 10, grid: 20 }));
    }
}
