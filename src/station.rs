//! Weather station logging.
//!
//! A sensor board prints one `temperature, humidity, lux` line per second.
//! [`acquire`] averages a batch of lines into a [`Reading`], which is
//! appended to a rolling [`WeatherLog`] of the last 24 hours. A [`Report`]
//! summarizes the log for display.
//!
//! ```
//! use std::io::Cursor;
//! use std::time::Duration;
//!
//! use physlab::station::{AcquireConfig, WeatherLog, acquire};
//!
//! let mut sensor = Cursor::new("70.0,40.0,100\n72.0,42.0,300\n");
//! let config = AcquireConfig { samples: 2, interval: Duration::ZERO };
//!
//! let mut log = WeatherLog::default();
//! log.push(acquire(&mut sensor, &config).unwrap());
//! assert_eq!(log.latest().unwrap().temperature, 71.0);
//! ```

mod error;
mod log;
mod reading;
mod report;

pub use error::StationError;
pub use log::{CAPACITY, WeatherLog};
pub use reading::{AcquireConfig, Reading, acquire};
pub use report::{ChannelStats, Report};
