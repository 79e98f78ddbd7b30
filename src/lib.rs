//! # physlab
//!
//! Simulation and data reduction tools for an undergraduate physics lab,
//! built on [Twine](https://github.com/isentropic-dev/twine) models.
//!
//! ## Crate layout
//!
//! - [`models`]: [`twine_core::Model`] implementations: the heat plate
//!   simulation and the Johnson noise reduction.
//! - [`station`]: Weather station sampling, logging and reporting.
//! - [`support`]: Numeric utilities shared by the models: constraints, units,
//!   tables, quadrature and curve fitting.
//! - [`cli`]: The `physlab` command line.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are public because they're useful, but their APIs
//! are not stable. Code starts in a model's internal `core` module and moves
//! to [`support`] once more than one model needs it.

pub mod cli;
pub mod models;
pub mod station;
pub mod support;
