use ndarray::{Array2, Zip};
use uom::si::{
    f64::{Length, ThermodynamicTemperature, Time},
    length::meter,
    thermodynamic_temperature::kelvin,
    time::second,
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    units::{ThermalDiffusivity, diffusivity_from_si},
};

use super::{Edges, HeatError, ObjectMask, PlateConfig};

/// A validated heat plate setup.
///
/// Built from a [`PlateConfig`]: every physical quantity is checked for
/// positivity and carried as a [`uom`] quantity. Whether the setup is
/// numerically sound is a separate question answered by
/// [`HeatSystem::checks`].
#[derive(Debug, Clone)]
pub struct HeatSystem {
    runtime: usize,
    rate: usize,
    grid: usize,
    edges: [ThermodynamicTemperature; 4],
    background_diffusivity: ThermalDiffusivity,
    object_diffusivity: ThermalDiffusivity,
    background_temp: ThermodynamicTemperature,
    object_temp: ThermodynamicTemperature,
    dt: Time,
    size: Length,
}

impl HeatSystem {
    /// Validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HeatError::InvalidInput`] if a count, length, time step or
    /// diffusivity is not strictly positive.
    pub fn new(config: &PlateConfig) -> Result<Self, HeatError> {
        let positive_count = |value: usize, field: &'static str| {
            Constrained::<usize, StrictlyPositive>::new(value)
                .map(Constrained::into_inner)
                .map_err(HeatError::invalid(field))
        };
        let positive = |value: f64, field: &'static str| {
            StrictlyPositive::new(value)
                .map(Constrained::into_inner)
                .map_err(HeatError::invalid(field))
        };

        let Edges {
            top,
            right,
            bottom,
            left,
        } = config.edges;

        Ok(Self {
            runtime: positive_count(config.runtime, "runtime")?,
            rate: positive_count(config.rate, "rate")?,
            grid: positive_count(config.grid, "grid")?,
            edges: [top, right, bottom, left].map(|t| ThermodynamicTemperature::new::<kelvin>(t)),
            background_diffusivity: diffusivity_from_si(positive(
                config.background_diffusivity,
                "background_diffusivity",
            )?),
            object_diffusivity: diffusivity_from_si(positive(
                config.object_diffusivity,
                "object_diffusivity",
            )?),
            background_temp: ThermodynamicTemperature::new::<kelvin>(config.background_temp),
            object_temp: ThermodynamicTemperature::new::<kelvin>(config.object_temp),
            dt: Time::new::<second>(positive(config.dt, "dt")?),
            size: Length::new::<meter>(positive(config.size, "size")?),
        })
    }

    /// Number of time steps.
    #[must_use]
    pub fn runtime(&self) -> usize {
        self.runtime
    }

    /// Steps between recorded frames.
    #[must_use]
    pub fn rate(&self) -> usize {
        self.rate
    }

    /// Cells per side.
    #[must_use]
    pub fn grid(&self) -> usize {
        self.grid
    }

    /// Number of recorded frames, including the initial state.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.runtime / self.rate
    }

    /// Time step.
    #[must_use]
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Side length of the plate.
    #[must_use]
    pub fn size(&self) -> Length {
        self.size
    }

    /// Cell width, `size / grid`.
    #[must_use]
    pub fn dx(&self) -> Length {
        self.size / self.grid as f64
    }

    /// Diffusivity outside the object.
    #[must_use]
    pub fn background_diffusivity(&self) -> ThermalDiffusivity {
        self.background_diffusivity
    }

    /// Diffusivity inside the object.
    #[must_use]
    pub fn object_diffusivity(&self) -> ThermalDiffusivity {
        self.object_diffusivity
    }

    /// Largest stable time step for `diffusivity`, `dx² / (4·α)`.
    #[must_use]
    pub fn stable_dt(&self, diffusivity: ThermalDiffusivity) -> Time {
        let dx = self.dx().get::<meter>();
        Time::new::<second>(dx * dx / (4.0 * diffusivity.value))
    }

    /// Dimensionless stencil weight `α·dt/dx²` for `diffusivity`.
    #[must_use]
    pub fn stencil_weight(&self, diffusivity: ThermalDiffusivity) -> f64 {
        let dx = self.dx().get::<meter>();
        diffusivity.value * self.dt.get::<second>() / (dx * dx)
    }

    /// Per-cell stencil weights: object cells use the object diffusivity.
    #[must_use]
    pub fn weights(&self, mask: &ObjectMask) -> Array2<f64> {
        let background = self.stencil_weight(self.background_diffusivity);
        let object = self.stencil_weight(self.object_diffusivity);
        mask.as_array()
            .map(|&inside| if inside { object } else { background })
    }

    /// Builds the initial temperature field in kelvin.
    ///
    /// The background temperature fills the plate, the object temperature
    /// fills the mask, then the edges are set: left and right columns first,
    /// then top and bottom rows, so the rows own the corners.
    #[must_use]
    pub fn initial_field(&self, mask: &ObjectMask) -> Array2<f64> {
        let [top, right, bottom, left] = self.edges.map(|t| t.get::<kelvin>());
        let object = self.object_temp.get::<kelvin>();

        let background = self.background_temp.get::<kelvin>();
        let mut field = Array2::from_elem((self.grid, self.grid), background);
        Zip::from(&mut field)
            .and(mask.as_array())
            .for_each(|cell, &inside| {
                if inside {
                    *cell = object;
                }
            });

        let last = self.grid - 1;
        field.column_mut(0).fill(left);
        field.column_mut(last).fill(right);
        field.row_mut(0).fill(top);
        field.row_mut(last).fill(bottom);
        field
    }

    /// Checks that `mask` matches the grid.
    pub(super) fn check_mask(&self, mask: &ObjectMask) -> Result<(), HeatError> {
        if mask.grid() == self.grid && mask.as_array().ncols() == self.grid {
            Ok(())
        } else {
            Err(HeatError::GridMismatch {
                mask: mask.grid(),
                grid: self.grid,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn derived_quantities() {
        let system = HeatSystem::new(&PlateConfig::default()).unwrap();

        assert_relative_eq!(system.dx().get::<meter>(), 0.01);
        assert_eq!(system.frames(), 100);
        assert_relative_eq!(
            system.stable_dt(system.background_diffusivity()).get::<second>(),
            25.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            system.stencil_weight(system.object_diffusivity()),
            0.01,
            max_relative = 1e-12
        );
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let config = PlateConfig {
            background_diffusivity: 0.0,
            ..PlateConfig::default()
        };
        assert!(matches!(
            HeatSystem::new(&config),
            Err(HeatError::InvalidInput {
                field: "background_diffusivity",
                ..
            })
        ));

        let config = PlateConfig {
            rate: 0,
            ..PlateConfig::default()
        };
        assert!(matches!(
            HeatSystem::new(&config),
            Err(HeatError::InvalidInput { field: "rate", .. })
        ));
    }

    #[test]
    fn initial_field_layers() {
        let config = PlateConfig {
            grid: 6,
            edges: Edges {
                top: 10.0,
                right: 20.0,
                bottom: 30.0,
                left: 40.0,
            },
            background_temp: 1.0,
            object_temp: 5.0,
            ..PlateConfig::default()
        };
        let system = HeatSystem::new(&config).unwrap();
        let mut cells = Array2::from_elem((6, 6), false);
        cells[[2, 3]] = true;
        let mask = ObjectMask::from_array(cells);

        let field = system.initial_field(&mask);

        assert_eq!(field[[0, 0]], 10.0);
        assert_eq!(field[[0, 5]], 10.0);
        assert_eq!(field[[5, 0]], 30.0);
        assert_eq!(field[[3, 0]], 40.0);
        assert_eq!(field[[3, 5]], 20.0);
        assert_eq!(field[[2, 3]], 5.0);
        assert_eq!(field[[2, 2]], 1.0);

        let weights = system.weights(&mask);
        assert_relative_eq!(weights[[2, 3]], system.stencil_weight(system.object_diffusivity()));
    }
}
