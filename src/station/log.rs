use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::support::table::{Table, write_rows};

use super::{Reading, StationError};

/// Readings kept in the log: 24 hours at one reading every 10 minutes.
pub const CAPACITY: usize = 144;

/// Header line of the log file, after the `# ` prefix.
const HEADER: &str = "Temp,Humidity,Lux";

/// A rolling log of the most recent readings, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherLog {
    readings: Vec<Reading>,
}

impl WeatherLog {
    /// Parses log text; the first line is the header.
    ///
    /// # Errors
    ///
    /// Returns a [`StationError`] if a row is not numeric or does not have
    /// three columns.
    pub fn parse(text: &str) -> Result<Self, StationError> {
        let table = Table::parse(text, 1)?;
        if !table.is_empty() && table.width() != 3 {
            return Err(StationError::Columns {
                found: table.width(),
            });
        }

        let mut log = Self {
            readings: table
                .rows()
                .iter()
                .map(|row| Reading::from([row[0], row[1], row[2]]))
                .collect(),
        };
        log.trim();
        Ok(log)
    }

    /// Loads a log file; a missing file is an empty log.
    ///
    /// # Errors
    ///
    /// Returns a [`StationError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "starting a new weather log");
                Ok(Self::default())
            }
            Err(source) => Err(StationError::ReadLog {
                path: path.to_owned(),
                source,
            }),
        }
    }

    /// Appends a reading, dropping the oldest ones beyond [`CAPACITY`].
    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
        self.trim();
    }

    fn trim(&mut self) {
        if self.readings.len() > CAPACITY {
            let dropped = self.readings.len() - CAPACITY;
            self.readings.drain(..dropped);
            tracing::warn!(dropped, "weather log full, dropped oldest rows");
        }
    }

    /// Writes the log with a `# Temp,Humidity,Lux` header and one decimal
    /// per value.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let rows: Vec<[f64; 3]> = self.readings.iter().map(|r| r.to_row()).collect();
        write_rows(writer, HEADER, rows.iter().map(<[f64; 3]>::as_slice), 1)
    }

    /// Saves the log to a file, replacing it.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Write`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StationError> {
        let path = path.as_ref();
        let write_error = |source| StationError::Write {
            path: path.to_owned(),
            source,
        };

        let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
        self.write(&mut writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;

        tracing::debug!(path = %path.display(), rows = self.len(), "saved weather log");
        Ok(())
    }

    /// Readings, oldest first.
    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// The most recent reading.
    #[must_use]
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
