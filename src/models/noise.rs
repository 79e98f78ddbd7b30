//! Electrical noise models.

pub mod johnson;
