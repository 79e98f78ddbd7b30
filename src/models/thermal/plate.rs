//! Transient conduction in a square plate with an embedded object.
//!
//! The plate has fixed edge temperatures and a background material; an
//! optional object (a procedural shape or a dark region of an image) has its
//! own diffusivity and starting temperature. The field is advanced with the
//! explicit five-point scheme and recorded every `rate` steps.
//!
//! [`PlateModel`] is the [`twine_core::Model`] adapter: it validates the
//! input checks and returns the recorded [`Frames`].
//!
//! ```
//! use physlab::models::thermal::plate::{PlateConfig, PlateInput, PlateModel, Shape};
//! use twine_core::Model;
//!
//! let config = PlateConfig {
//!     runtime: 100,
//!     shape: Shape::Circle,
//!     ..PlateConfig::default()
//! };
//! let input = PlateInput::from_config(&config).unwrap();
//! let frames = PlateModel.call(&input).unwrap();
//! assert_eq!(frames.len(), 10);
//! ```

mod core;

pub use self::core::{
    Check, CheckReport, Edges, FieldStats, Frames, HeatError, HeatSystem, MaskError, ObjectMask,
    PlateConfig, Shape, Simulation, heat_map, run, step, write_field_csv, write_heat_map,
};

use twine_core::Model;

/// A validated system together with the object it carries.
#[derive(Debug, Clone)]
pub struct PlateInput {
    pub system: HeatSystem,
    pub mask: ObjectMask,
}

impl PlateInput {
    /// Runs the input checks on `system`, then builds the mask for `shape`.
    ///
    /// Nothing grid-sized is allocated until the checks pass.
    ///
    /// # Errors
    ///
    /// Returns [`HeatError::ChecksFailed`] if an input check fails, or a
    /// [`HeatError::Mask`] if the shape image cannot be used.
    pub fn new(system: HeatSystem, shape: &Shape) -> Result<Self, HeatError> {
        system.validate()?;
        let mask = ObjectMask::from_shape(shape, system.grid())?;
        Ok(Self { system, mask })
    }

    /// Validates `config` and builds the mask for its shape.
    ///
    /// # Errors
    ///
    /// Returns a [`HeatError`] if a value is out of range, an input check
    /// fails, or the shape image cannot be used.
    pub fn from_config(config: &PlateConfig) -> Result<Self, HeatError> {
        Self::new(HeatSystem::new(config)?, &config.shape)
    }
}

/// Runs a full plate simulation after the input checks pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlateModel;

impl Model for PlateModel {
    type Input = PlateInput;
    type Output = Frames;
    type Error = HeatError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        input.system.validate()?;
        run(&input.system, &input.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_unstable_input() {
        let config = PlateConfig {
            dt: 100.0,
            ..PlateConfig::default()
        };
        let err = PlateInput::from_config(&config).unwrap_err();
        assert!(matches!(err, HeatError::ChecksFailed { ref failed } if failed.len() == 2));

        let input = PlateInput {
            system: HeatSystem::new(&config).unwrap(),
            mask: ObjectMask::empty(100),
        };
        let err = PlateModel.call(&input).unwrap_err();
        assert!(matches!(err, HeatError::ChecksFailed { ref failed } if failed.len() == 2));
    }

    #[test]
    fn huge_grids_fail_checks_before_allocating() {
        let config = PlateConfig {
            grid: 1 << 33,
            shape: Shape::Square,
            ..PlateConfig::default()
        };
        let err = PlateInput::from_config(&config).unwrap_err();
        assert!(
            matches!(err, HeatError::ChecksFailed { ref failed } if failed.contains(&"resolution"))
        );
    }

    #[test]
    fn runs_valid_input() {
        let config = PlateConfig {
            runtime: 50,
            rate: 5,
            shape: Shape::Square,
            ..PlateConfig::default()
        };
        let input = PlateInput::from_config(&config).unwrap();

        let frames = PlateModel.call(&input).unwrap();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames.get(0), Some(&input.system.initial_field(&input.mask)));
    }
}
