use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use clap::{Args, Subcommand};
use eyre::{Result, WrapErr};
use jiff::Zoned;

use crate::station::{AcquireConfig, Report, StationError, WeatherLog, acquire};

/// Weather station subcommands
#[derive(Subcommand, Debug)]
pub enum WeatherCommand {
    /// Average a batch of sensor readings and append it to the log
    Log(LogArgs),

    /// Summarize the log
    Report(ReportArgs),
}

/// Arguments for the log command
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Sensor serial device
    #[arg(short, long, default_value = "/dev/ttyACM0")]
    pub device: PathBuf,

    /// Weather log file
    #[arg(short, long, default_value = "weather_stats.csv")]
    pub log: PathBuf,

    /// Sensor lines averaged into one reading
    #[arg(long, default_value_t = 10)]
    pub samples: usize,

    /// Seconds between sensor lines
    #[arg(long, default_value_t = 1.0)]
    pub interval: f64,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Weather log file
    #[arg(short, long, default_value = "weather_stats.csv")]
    pub log: PathBuf,

    /// Write the time series to this CSV file
    #[arg(long)]
    pub series: Option<PathBuf>,
}

/// Runs a weather subcommand.
pub(super) fn execute(command: WeatherCommand) -> Result<()> {
    match command {
        WeatherCommand::Log(args) => log(&args),
        WeatherCommand::Report(args) => report(&args),
    }
}

fn log(args: &LogArgs) -> Result<()> {
    let config = AcquireConfig {
        samples: args.samples,
        interval: Duration::try_from_secs_f64(args.interval)
            .wrap_err("interval must be a non-negative number of seconds")?,
    };

    let mut log = WeatherLog::load(&args.log)?;
    let device = File::open(&args.device).map_err(|source| StationError::Device {
        path: args.device.clone(),
        source,
    })?;
    let reading = acquire(&mut BufReader::new(device), &config)?;

    log.push(reading);
    log.save(&args.log)?;
    tracing::info!(
        temperature = reading.temperature,
        humidity = reading.humidity,
        lux = reading.lux,
        rows = log.len(),
        "logged reading"
    );
    Ok(())
}

fn report(args: &ReportArgs) -> Result<()> {
    let log = WeatherLog::load(&args.log)?;
    let report = Report::new(&log, Zoned::now())?;
    print!("{report}");

    if let Some(path) = &args.series {
        let file = File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        report
            .write_series(&mut writer)
            .and_then(|()| writer.flush())
            .wrap_err_with(|| format!("cannot write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn logs_from_a_device_file() {
        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join("tty");
        fs::write(&device, "70,40,100\n72,42,300\n").unwrap();
        let log_path = dir.path().join("weather_stats.csv");

        let args = LogArgs {
            device,
            log: log_path.clone(),
            samples: 2,
            interval: 0.0,
        };
        log(&args).unwrap();
        log(&args).unwrap();

        let text = fs::read_to_string(&log_path).unwrap();
        assert_eq!(text, "# Temp,Humidity,Lux\n71.0,41.0,200.0\n71.0,41.0,200.0\n");

        let series = dir.path().join("series.csv");
        report(&ReportArgs {
            log: log_path,
            series: Some(series.clone()),
        })
        .unwrap();
        assert_eq!(fs::read_to_string(series).unwrap().lines().count(), 3);
    }
}
