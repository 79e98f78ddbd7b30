//! Thermal models.
//!
//! This module contains transient heat conduction models.

pub mod plate;
