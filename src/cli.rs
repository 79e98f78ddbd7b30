//! The `physlab` command line.
//!
//! ```bash
//! # Check and run a heat plate from a JSON config, overriding the shape
//! physlab heat check --config plate.json
//! physlab heat run --config plate.json --shape circle --out results/
//!
//! # Reduce a Johnson noise session
//! physlab noise --amp AMP1.TXT AMP2.TXT AMP3.TXT \
//!     --background BG1.TXT BG2.TXT BG3.TXT --room room.csv --ln2 ln2.csv
//!
//! # Log one averaged reading, then summarize the last 24 hours
//! physlab weather log --device /dev/ttyACM0 --log weather_stats.csv
//! physlab weather report --log weather_stats.csv
//! ```

mod heat;
mod noise;
mod weather;

use clap::{Parser, Subcommand};

pub use heat::{HeatCommand, PlateArgs};
pub use noise::NoiseArgs;
pub use weather::WeatherCommand;

/// Lab simulation and data reduction tools.
#[derive(Parser, Debug)]
#[command(name = "physlab")]
#[command(author, version, about = "Lab simulation and data reduction tools")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 2D heat conduction in a plate
    #[command(subcommand)]
    Heat(HeatCommand),

    /// Johnson noise reduction and Boltzmann constant estimate
    Noise(NoiseArgs),

    /// Weather station logging and reporting
    #[command(subcommand)]
    Weather(WeatherCommand),
}

impl Cli {
    /// Runs the selected command.
    ///
    /// # Errors
    ///
    /// Returns the error of the failed command, with context.
    pub fn execute(self) -> eyre::Result<()> {
        match self.command {
            Commands::Heat(command) => heat::execute(command),
            Commands::Noise(args) => noise::execute(&args),
            Commands::Weather(command) => weather::execute(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_noise_arguments() {
        let cli = Cli::try_parse_from([
            "physlab", "noise", "--amp", "a1", "a2", "a3", "--background", "b1", "b2", "b3",
            "--room", "room.csv", "--ln2", "ln2.csv",
        ])
        .unwrap();
        let Commands::Noise(args) = cli.command else {
            panic!("expected the noise command");
        };
        assert_eq!(args.amp.len(), 3);
        assert_eq!(args.background[2].to_str(), Some("b3"));

        let missing = Cli::try_parse_from([
            "physlab", "noise", "--amp", "a1", "a2", "--background", "b1", "b2", "b3", "--room",
            "r", "--ln2", "n",
        ]);
        assert!(missing.is_err());
    }
}
