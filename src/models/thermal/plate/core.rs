//! Explicit finite-difference conduction on a square plate.
//!
//! A [`PlateConfig`] is validated into a [`HeatSystem`], an [`ObjectMask`]
//! marks the cells with their own diffusivity, and [`run`] or
//! [`Simulation`] march the field forward with the FTCS [`step`].

mod checks;
mod config;
mod error;
mod mask;
mod output;
mod simulation;
mod stencil;
mod system;

pub use checks::{Check, CheckReport};
pub use config::{Edges, PlateConfig, Shape};
pub use error::{HeatError, MaskError};
pub use mask::ObjectMask;
pub use output::{heat_map, write_field_csv, write_heat_map};
pub use simulation::{FieldStats, Frames, Simulation, run};
pub use stencil::step;
pub use system::HeatSystem;
