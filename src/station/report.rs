use std::{fmt, io};

use jiff::{SignedDuration, Zoned};

use super::{Reading, StationError, WeatherLog};

/// Minutes between logged readings.
const LOG_INTERVAL_MINUTES: i64 = 10;

/// Minimum, maximum and mean of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ChannelStats {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, max, sum, count) = values.fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0_u32),
            |(lo, hi, sum, n), v| (lo.min(v), hi.max(v), sum + v, n + 1),
        );
        Self {
            min,
            max,
            mean: sum / f64::from(count.max(1)),
        }
    }
}

/// A summary of the weather log as of `now`.
///
/// The newest reading is stamped `now` and each earlier one 10 minutes
/// before the next.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    now: Zoned,
    times: Vec<Zoned>,
    readings: Vec<Reading>,
    pub temperature: ChannelStats,
    pub humidity: ChannelStats,
    pub lux: ChannelStats,
}

impl Report {
    /// Builds the report for `log` ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::EmptyLog`] if there is nothing to report.
    pub fn new(log: &WeatherLog, now: Zoned) -> Result<Self, StationError> {
        let readings = log.readings().to_vec();
        if readings.is_empty() {
            return Err(StationError::EmptyLog);
        }

        let last = readings.len() - 1;
        let times = (0..readings.len())
            .map(|i| {
                let steps = i64::try_from(last - i).unwrap_or(i64::MAX);
                now.checked_sub(SignedDuration::from_mins(LOG_INTERVAL_MINUTES * steps))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            temperature: ChannelStats::of(readings.iter().map(|r| r.temperature)),
            humidity: ChannelStats::of(readings.iter().map(|r| r.humidity)),
            lux: ChannelStats::of(readings.iter().map(|r| r.lux)),
            now,
            times,
            readings,
        })
    }

    /// Time stamp of each reading, oldest first.
    #[must_use]
    pub fn times(&self) -> &[Zoned] {
        &self.times
    }

    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// The newest reading.
    #[must_use]
    pub fn latest(&self) -> Reading {
        // `new` rejects empty logs.
        self.readings[self.readings.len() - 1]
    }

    /// `HH:MM:SS YYYY-MM-DD  |  Temp (F): t , H (%): h , Lux : l`
    #[must_use]
    pub fn title(&self) -> String {
        let latest = self.latest();
        format!(
            "{}  |  Temp (F): {:.1} , H (%): {:.1} , Lux : {:.1}",
            self.now.strftime("%H:%M:%S %Y-%m-%d"),
            latest.temperature,
            latest.humidity,
            latest.lux,
        )
    }

    /// Writes the time series as `time,temp,humidity,lux` rows with
    /// `HH:MM` times.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write_series<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "time,temp,humidity,lux")?;
        for (time, reading) in self.times.iter().zip(&self.readings) {
            writeln!(
                writer,
                "{},{:.1},{:.1},{:.1}",
                time.strftime("%H:%M"),
                reading.temperature,
                reading.humidity,
                reading.lux,
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title())?;
        writeln!(
            f,
            "{} readings since {}",
            self.readings.len(),
            self.times[0].strftime("%H:%M %Y-%m-%d")
        )?;
        let channels = [
            ("Temperature (F)", self.temperature),
            ("Humidity (%)", self.humidity),
            ("Lux", self.lux),
        ];
        for (name, stats) in channels {
            writeln!(
                f,
                "{name:<16} min {:>8.1}  max {:>8.1}  mean {:>8.1}",
                stats.min, stats.max, stats.mean
            )?;
        }
        Ok(())
    }
}
