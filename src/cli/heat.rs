use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Subcommand, ValueEnum};
use eyre::{Result, WrapErr, eyre};
use twine_core::Model;

use crate::models::thermal::plate::{
    FieldStats, Frames, HeatSystem, PlateConfig, PlateInput, PlateModel, Shape, Simulation,
    write_field_csv, write_heat_map,
};

/// Heat plate subcommands
#[derive(Subcommand, Debug)]
pub enum HeatCommand {
    /// Print the input checks without running
    Check(PlateArgs),

    /// Run the full simulation and write the results
    Run(RunArgs),

    /// Step the simulation interactively, reading step counts from stdin
    Step(StepArgs),
}

/// Procedural shapes selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ShapeArg {
    None,
    Dot,
    Square,
    Circle,
    Cross,
}

impl From<ShapeArg> for Shape {
    fn from(val: ShapeArg) -> Self {
        match val {
            ShapeArg::None => Shape::None,
            ShapeArg::Dot => Shape::Dot,
            ShapeArg::Square => Shape::Square,
            ShapeArg::Circle => Shape::Circle,
            ShapeArg::Cross => Shape::Cross,
        }
    }
}

/// Plate settings: a JSON config file plus per-field overrides
#[derive(Args, Debug, Default)]
pub struct PlateArgs {
    /// JSON configuration file; missing fields use the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of time steps
    #[arg(long)]
    pub runtime: Option<usize>,

    /// Cells per side
    #[arg(long)]
    pub grid: Option<usize>,

    /// Steps between recorded frames
    #[arg(long)]
    pub rate: Option<usize>,

    /// Top edge temperature (K)
    #[arg(long)]
    pub top: Option<f64>,

    /// Right edge temperature (K)
    #[arg(long)]
    pub right: Option<f64>,

    /// Bottom edge temperature (K)
    #[arg(long)]
    pub bottom: Option<f64>,

    /// Left edge temperature (K)
    #[arg(long)]
    pub left: Option<f64>,

    /// Background diffusivity (m²/s)
    #[arg(long)]
    pub background_diffusivity: Option<f64>,

    /// Object diffusivity (m²/s)
    #[arg(long)]
    pub object_diffusivity: Option<f64>,

    /// Initial background temperature (K)
    #[arg(long)]
    pub background_temp: Option<f64>,

    /// Initial object temperature (K)
    #[arg(long)]
    pub object_temp: Option<f64>,

    /// Time step (s)
    #[arg(long)]
    pub dt: Option<f64>,

    /// Plate side length (m)
    #[arg(long)]
    pub size: Option<f64>,

    /// Procedural object shape
    #[arg(long, value_enum, conflicts_with = "mask")]
    pub shape: Option<ShapeArg>,

    /// Square PNG whose dark pixels mark the object
    #[arg(long)]
    pub mask: Option<PathBuf>,
}

impl PlateArgs {
    /// Loads the config file, if any, and applies the overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn resolve(&self) -> Result<PlateConfig> {
        let mut config = match &self.config {
            Some(path) => PlateConfig::from_json_file(path)?,
            None => PlateConfig::default(),
        };

        let set = |target: &mut usize, value: Option<usize>| {
            if let Some(value) = value {
                *target = value;
            }
        };
        set(&mut config.runtime, self.runtime);
        set(&mut config.grid, self.grid);
        set(&mut config.rate, self.rate);

        let overrides = [
            (&mut config.edges.top, self.top),
            (&mut config.edges.right, self.right),
            (&mut config.edges.bottom, self.bottom),
            (&mut config.edges.left, self.left),
            (&mut config.background_diffusivity, self.background_diffusivity),
            (&mut config.object_diffusivity, self.object_diffusivity),
            (&mut config.background_temp, self.background_temp),
            (&mut config.object_temp, self.object_temp),
            (&mut config.dt, self.dt),
            (&mut config.size, self.size),
        ];
        for (target, value) in overrides {
            if let Some(value) = value {
                *target = value;
            }
        }

        if let Some(shape) = self.shape {
            config.shape = shape.into();
        }
        if let Some(mask) = &self.mask {
            config.shape = Shape::Image(mask.clone());
        }
        Ok(config)
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub plate: PlateArgs,

    /// Output directory
    #[arg(short, long, default_value = "heat_output")]
    pub out: PathBuf,

    /// Also write a heat map of every recorded frame
    #[arg(long)]
    pub frames: bool,
}

/// Arguments for the step command
#[derive(Args, Debug)]
pub struct StepArgs {
    #[command(flatten)]
    pub plate: PlateArgs,

    /// Output directory for the current heat map
    #[arg(short, long, default_value = "heat_output")]
    pub out: PathBuf,
}

/// Runs a heat plate subcommand.
pub(super) fn execute(command: HeatCommand) -> Result<()> {
    match command {
        HeatCommand::Check(plate) => check(&plate),
        HeatCommand::Run(args) => run(&args),
        HeatCommand::Step(args) => step(&args),
    }
}

/// Resolves the arguments into a system and prints its input checks.
fn checked_system(plate: &PlateArgs) -> Result<(HeatSystem, Shape)> {
    let config = plate.resolve()?;
    let system = HeatSystem::new(&config).wrap_err("invalid plate configuration")?;
    let report = system.checks();
    print!("{report}");
    if report.passed() {
        Ok((system, config.shape))
    } else {
        Err(eyre!("input checks failed: {}", report.failures().join(", ")))
    }
}

fn prepare(plate: &PlateArgs) -> Result<PlateInput> {
    let (system, shape) = checked_system(plate)?;
    PlateInput::new(system, &shape).wrap_err("invalid plate configuration")
}

fn check(plate: &PlateArgs) -> Result<()> {
    checked_system(plate).map(|_| ())
}

fn run(args: &RunArgs) -> Result<()> {
    let input = prepare(&args.plate)?;
    let frames = PlateModel.call(&input)?;
    fs::create_dir_all(&args.out)
        .wrap_err_with(|| format!("cannot create {}", args.out.display()))?;

    let last = frames.last().ok_or_else(|| eyre!("no frames recorded"))?;
    write_field_csv(last, args.out.join("final.csv"))?;
    write_heat_map(last, args.out.join("final.png"))?;

    if let Some(series) = frames.object_mean_series(&input.mask) {
        write_object_series(&frames, &series, &args.out.join("object_mean.csv"))?;
    }
    if args.frames {
        let dir = args.out.join("frames");
        fs::create_dir_all(&dir).wrap_err_with(|| format!("cannot create {}", dir.display()))?;
        for (index, frame) in frames.iter().enumerate() {
            write_heat_map(frame, dir.join(format!("frame_{index:05}.png")))?;
        }
    }

    if let Some(stats) = FieldStats::of(last) {
        println!(
            "final field: min {:.4} K, max {:.4} K, mean {:.4} K",
            stats.min, stats.max, stats.mean
        );
    }
    println!("wrote results to {}", args.out.display());
    Ok(())
}

fn write_object_series(frames: &Frames, series: &[f64], path: &Path) -> Result<()> {
    let mut text = String::from("step,object_mean\n");
    for (index, mean) in series.iter().enumerate() {
        text.push_str(&format!("{},{mean:.6}\n", frames.step_of(index)));
    }
    fs::write(path, text).wrap_err_with(|| format!("cannot write {}", path.display()))
}

fn step(args: &StepArgs) -> Result<()> {
    let input = prepare(&args.plate)?;
    fs::create_dir_all(&args.out)
        .wrap_err_with(|| format!("cannot create {}", args.out.display()))?;
    let image = args.out.join("current.png");

    let mut simulation = Simulation::new(&input.system, &input.mask)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("steps to advance (q to quit): ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }
        let Ok(steps) = line.parse::<usize>() else {
            println!("not a step count: {line}");
            continue;
        };

        simulation.advance(steps);
        write_heat_map(simulation.field(), &image)?;
        if let Some(stats) = FieldStats::of(simulation.field()) {
            println!(
                "step {}: min {:.4} K, max {:.4} K, mean {:.4} K",
                simulation.elapsed(),
                stats.min,
                stats.max,
                stats.mean
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.json");
        fs::write(&path, r#"{ "grid": 200, "dt": 2.0, "shape": "dot" }"#).unwrap();

        let args = PlateArgs {
            config: Some(path),
            dt: Some(0.5),
            top: Some(300.0),
            shape: Some(ShapeArg::Cross),
            ..PlateArgs::default()
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.grid, 200);
        assert_eq!(config.dt, 0.5);
        assert_eq!(config.edges.top, 300.0);
        assert_eq!(config.edges.left, 1.0);
        assert_eq!(config.shape, Shape::Cross);
    }

    #[test]
    fn run_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            plate: PlateArgs {
                runtime: Some(20),
                shape: Some(ShapeArg::Square),
                ..PlateArgs::default()
            },
            out: dir.path().to_owned(),
            frames: true,
        };

        run(&args).unwrap();

        assert!(dir.path().join("final.csv").exists());
        assert!(dir.path().join("final.png").exists());
        let series = fs::read_to_string(dir.path().join("object_mean.csv")).unwrap();
        assert_eq!(series.lines().count(), 3);
        assert!(dir.path().join("frames/frame_00001.png").exists());
    }

    #[test]
    fn failed_checks_are_errors() {
        let plate = PlateArgs {
            grid: Some(150),
            ..PlateArgs::default()
        };
        assert!(check(&plate).is_err());
        assert!(check(&PlateArgs::default()).is_ok());
    }

    #[test]
    fn oversized_grids_are_rejected_without_allocating() {
        let plate = PlateArgs {
            grid: Some(1 << 33),
            shape: Some(ShapeArg::Circle),
            ..PlateArgs::default()
        };
        assert!(check(&plate).is_err());

        let dir = tempfile::tempdir().unwrap();
        let args = StepArgs {
            plate,
            out: dir.path().to_owned(),
        };
        assert!(step(&args).is_err());
    }
}
