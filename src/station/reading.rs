use std::{io::BufRead, str::FromStr, thread, time::Duration};

use super::StationError;

/// One sample from the weather sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Air temperature, °F.
    pub temperature: f64,

    /// Relative humidity, %.
    pub humidity: f64,

    /// Illuminance, lux.
    pub lux: f64,
}

impl Reading {
    /// The readings as a `[temperature, humidity, lux]` row.
    #[must_use]
    pub fn to_row(self) -> [f64; 3] {
        [self.temperature, self.humidity, self.lux]
    }

    /// Component-wise mean, or `None` for no readings.
    #[must_use]
    pub fn mean(readings: &[Reading]) -> Option<Reading> {
        if readings.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = readings.len() as f64;
        let sum = |pick: fn(&Reading) -> f64| readings.iter().map(pick).sum::<f64>() / n;
        Some(Reading {
            temperature: sum(|r| r.temperature),
            humidity: sum(|r| r.humidity),
            lux: sum(|r| r.lux),
        })
    }
}

impl From<[f64; 3]> for Reading {
    fn from([temperature, humidity, lux]: [f64; 3]) -> Self {
        Self {
            temperature,
            humidity,
            lux,
        }
    }
}

/// Parses a sensor line such as `72.5, 40.1, 310` or `72.5 40.1 310`.
impl FromStr for Reading {
    type Err = StationError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || StationError::Malformed {
            line: line.trim().to_owned(),
        };

        let values = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|cell| !cell.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;

        let row: [f64; 3] = values.try_into().map_err(|_| malformed())?;
        Ok(row.into())
    }
}

/// Sampling settings for [`acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireConfig {
    /// Number of sensor lines averaged into one reading.
    pub samples: usize,

    /// Pause after each sample except the last.
    pub interval: Duration,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            samples: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// Reads `config.samples` lines from the sensor and returns their mean.
///
/// # Errors
///
/// Returns a [`StationError`] if the stream fails or ends early, or a line
/// is malformed.
pub fn acquire<R: BufRead>(reader: &mut R, config: &AcquireConfig) -> Result<Reading, StationError> {
    if config.samples == 0 {
        return Err(StationError::NoSamples);
    }

    let mut samples = Vec::with_capacity(config.samples);
    let mut line = String::new();
    while samples.len() < config.samples {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(StationError::EndOfStream {
                read: samples.len(),
                wanted: config.samples,
            });
        }
        let reading: Reading = line.parse()?;
        tracing::debug!(?reading, "sensor sample");
        samples.push(reading);

        if samples.len() < config.samples && !config.interval.is_zero() {
            thread::sleep(config.interval);
        }
    }

    Reading::mean(&samples).ok_or(StationError::NoSamples)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use approx::assert_relative_eq;

    fn fast(samples: usize) -> AcquireConfig {
        AcquireConfig {
            samples,
            interval: Duration::ZERO,
        }
    }

    #[test]
    fn parses_separators() {
        let expected = Reading {
            temperature: 72.5,
            humidity: 40.1,
            lux: 310.0,
        };
        for line in ["72.5,40.1,310", "72.5, 40.1, 310\r\n", " 72.5 40.1\t310 "] {
            assert_eq!(line.parse::<Reading>().unwrap(), expected);
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["72.5,40.1", "72.5,40.1,310,1", "72.5,humid,310", ""] {
            assert!(matches!(
                line.parse::<Reading>(),
                Err(StationError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn averages_samples() {
        let mut stream = Cursor::new("70,40,100\n72,42,200\n74,44,300\n99,99,999\n");
        let reading = acquire(&mut stream, &fast(3)).unwrap();

        assert_relative_eq!(reading.temperature, 72.0);
        assert_relative_eq!(reading.humidity, 42.0);
        assert_relative_eq!(reading.lux, 200.0);
    }

    #[test]
    fn short_stream() {
        let mut stream = Cursor::new("70,40,100\n");
        assert!(matches!(
            acquire(&mut stream, &fast(10)),
            Err(StationError::EndOfStream { read: 1, wanted: 10 })
        ));
        assert!(matches!(
            acquire(&mut Cursor::new(""), &fast(0)),
            Err(StationError::NoSamples)
        ));
    }
}
