use std::{io, path::PathBuf};

use thiserror::Error;

use crate::support::table::TableError;

/// Errors that can occur while logging or reporting weather readings.
#[derive(Debug, Error)]
pub enum StationError {
    /// The sensor device could not be opened or read.
    #[error("failed to read sensor {}", path.display())]
    Device {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sensor stream could not be read.
    #[error("failed to read sensor line")]
    Read(#[from] io::Error),

    /// The sensor stream ended before enough samples were read.
    #[error("sensor stream ended after {read} of {wanted} samples")]
    EndOfStream { read: usize, wanted: usize },

    /// A sensor line does not hold exactly three numbers.
    #[error("expected temperature, humidity and lux in `{line}`")]
    Malformed { line: String },

    /// Averaging needs at least one sample.
    #[error("no samples requested")]
    NoSamples,

    /// The log file exists but could not be read.
    #[error("failed to read {}", path.display())]
    ReadLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log file could not be parsed.
    #[error("invalid weather log")]
    Table(#[from] TableError),

    /// The log file has the wrong number of columns.
    #[error("weather log has {found} columns, expected 3")]
    Columns { found: usize },

    /// The log file could not be written.
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A report needs at least one logged reading.
    #[error("weather log is empty")]
    EmptyLog,

    /// Report times fell outside the supported range.
    #[error("report time axis out of range")]
    Time(#[from] jiff::Error),
}
