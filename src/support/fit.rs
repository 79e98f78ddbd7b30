//! Least-squares curve fitting.
//!
//! Two fits cover the lab analyses:
//!
//! - [`levenberg_marquardt`]: nonlinear fit of an `N`-parameter [`CurveModel`],
//!   with a covariance estimate scaled by the residual variance.
//! - [`proportional`]: weighted fit of a line through the origin, `y = m·x`.

mod error;
mod levenberg_marquardt;
mod proportional;

pub use error::FitError;
pub use levenberg_marquardt::{CurveFit, CurveModel, LmConfig, levenberg_marquardt};
pub use proportional::{ProportionalFit, proportional};

/// Checks that paired samples have equal lengths.
fn check_lengths(x: &[f64], y: &[f64]) -> Result<(), FitError> {
    if x.len() == y.len() {
        Ok(())
    } else {
        Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        })
    }
}
