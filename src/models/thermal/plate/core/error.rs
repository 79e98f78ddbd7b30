use std::path::PathBuf;

use thiserror::Error;

use crate::support::constraint::ConstraintError;

/// Errors that can occur while building an object mask.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The shape image could not be opened or decoded.
    #[error("failed to load shape image")]
    Image(#[from] image::ImageError),

    /// Shape images must be square.
    #[error("shape image must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },

    /// The grid must be an integer multiple of the image side.
    #[error("shape image side {side} does not divide grid size {grid}")]
    NotDivisor { side: usize, grid: usize },
}

/// Errors that can occur while setting up or running a heat plate simulation.
#[derive(Debug, Error)]
pub enum HeatError {
    /// A configuration value violates its numeric constraint.
    #[error("invalid {field}")]
    InvalidInput {
        /// Name of the offending configuration field.
        field: &'static str,

        #[source]
        source: ConstraintError,
    },

    /// One or more input checks failed.
    #[error("input checks failed: {}", failed.join(", "))]
    ChecksFailed {
        /// Names of the failed checks.
        failed: Vec<&'static str>,
    },

    /// The object mask could not be built.
    #[error("object mask")]
    Mask(#[from] MaskError),

    /// The object mask does not match the simulation grid.
    #[error("mask is {mask}x{mask} but grid is {grid}x{grid}")]
    GridMismatch { mask: usize, grid: usize },

    /// A configuration file could not be parsed.
    #[error("invalid configuration in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A file could not be read or written.
    #[error("i/o failed for {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A heat map image could not be written.
    #[error("failed to write heat map")]
    Image(#[from] image::ImageError),
}

impl HeatError {
    pub(super) fn invalid(field: &'static str) -> impl FnOnce(ConstraintError) -> Self {
        move |source| Self::InvalidInput { field, source }
    }
}
