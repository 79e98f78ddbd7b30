//! Lab models.
//!
//! Models are organized by physical domain:
//!
//! - [`thermal`]: heat conduction on a discretized plate.
//! - [`noise`]: reduction of thermal (Johnson) noise measurements.
//!
//! Each model lives in its own module with an internal `core` submodule where
//! the computation happens. The [`twine_core::Model`] implementation on top is
//! a thin adapter that delegates to the core API.

pub mod noise;
pub mod thermal;
