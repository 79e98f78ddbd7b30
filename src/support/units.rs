//! Extensions to [`uom`].
//!
//! Model inputs and results carry [`uom`] quantities at their boundaries.
//! This module adds the quantities and constants those models need that
//! [`uom`] does not ship.
//!
//! ```
//! use physlab::support::units::{ThermalDiffusivity, boltzmann_constant};
//! use uom::si::{
//!     area::square_meter,
//!     f64::{Area, Time},
//!     heat_capacity::joule_per_kelvin,
//!     time::second,
//! };
//!
//! let k_b = boltzmann_constant();
//! assert_eq!(k_b.get::<joule_per_kelvin>(), 1.380_649e-23);
//!
//! let alpha: ThermalDiffusivity = Area::new::<square_meter>(1e-6) / Time::new::<second>(1.0);
//! assert!(alpha.value > 0.0);
//! ```

mod quantities;

pub use quantities::{ThermalDiffusivity, boltzmann_constant, diffusivity_from_si};
