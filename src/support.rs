//! Numeric utilities shared by the models.
//!
//! Nothing here knows about heat plates, amplifiers or weather stations.

pub mod constraint;
pub mod fit;
pub mod quadrature;
pub mod table;
pub mod units;
