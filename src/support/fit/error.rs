use thiserror::Error;

/// Errors that can occur while fitting a curve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The abscissa and ordinate samples differ in length.
    #[error("sample lengths differ: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },

    /// Not enough samples to determine the parameters and their uncertainty.
    #[error("fit needs at least {needed} points, found {found}")]
    TooFewPoints { needed: usize, found: usize },

    /// A measurement uncertainty is zero, negative or NaN.
    #[error("sigma at index {index} must be positive, got {sigma}")]
    NonPositiveSigma { index: usize, sigma: f64 },

    /// The model produced NaN or an infinity.
    #[error("model is not finite at x={x}")]
    NonFinite { x: f64 },

    /// The normal equations could not be solved.
    #[error("normal matrix is singular")]
    Singular,

    /// The solver reached the iteration limit without converging.
    #[error("fit did not converge after {iters} iterations: ssr={ssr}")]
    NotConverged {
        /// Iteration count performed by the solver.
        iters: usize,

        /// Sum of squared residuals at the last accepted parameters.
        ssr: f64,
    },
}
