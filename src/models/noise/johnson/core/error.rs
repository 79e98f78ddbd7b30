use thiserror::Error;
use twine_solvers::equation::bisection;

use crate::support::{
    constraint::ConstraintError, fit::FitError, quadrature::QuadratureError, table::TableError,
};

/// Errors that can occur while reducing Johnson noise measurements.
#[derive(Debug, Error)]
pub enum NoiseError {
    /// A data file could not be read.
    #[error("failed to read data table")]
    Table(#[from] TableError),

    /// An average was requested over no sweeps.
    #[error("no sweeps to average")]
    NoSweeps,

    /// Paired columns differ in length.
    #[error("column lengths differ: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Two sweeps were not taken on the same frequency grid.
    #[error("sweep {sweep} differs in frequency at point {index}")]
    FrequencyMismatch { sweep: usize, index: usize },

    /// The background voltage is zero, so the gain is undefined.
    #[error("background voltage is zero at {frequency} Hz")]
    ZeroBackground { frequency: f64 },

    /// The gain curve has no positive weight to start a fit from.
    #[error("gain curve is empty or has no positive area")]
    DegenerateGain,

    /// A measurement value violates its numeric constraint.
    #[error("invalid {field}")]
    InvalidInput {
        /// Name of the offending quantity.
        field: &'static str,

        #[source]
        source: ConstraintError,
    },

    /// A curve fit failed.
    #[error("fit failed")]
    Fit(#[from] FitError),

    /// A band gain integral failed.
    #[error("band gain integration failed")]
    Quadrature(#[from] QuadratureError),

    /// The bisection solver encountered an error.
    #[error("bisection solver error")]
    Bisection(#[from] bisection::Error),

    /// No resistance reduces the band gain to the requested fraction.
    #[error("band gain never drops to {fraction} of its zero-resistance value")]
    RollOffNotBracketed { fraction: f64 },

    /// The solver reached the iteration limit without converging.
    #[error("solver hit iteration limit: residual={residual}")]
    MaxIters {
        /// Band gain residual at the last iterate, Hz.
        residual: f64,

        /// Iteration count performed by the solver.
        iters: usize,
    },
}

impl NoiseError {
    pub(super) fn invalid(field: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::InvalidInput { field, source }
    }
}
