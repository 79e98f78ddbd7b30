use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::Args;
use eyre::{Result, WrapErr};
use twine_core::Model;
use uom::si::{
    electrical_resistance::megaohm,
    f64::Frequency,
    frequency::hertz,
    heat_capacity::joule_per_kelvin,
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::{
    models::noise::johnson::{
        BathAnalysis, JohnsonNoiseModel, NoiseConfig, NoiseData, NoiseTable, RollOffConfig, Sweep,
    },
    support::table::write_rows,
};

/// Arguments for the noise command
#[derive(Args, Debug)]
pub struct NoiseArgs {
    /// Amplifier sweeps (frequency, Vrms)
    #[arg(long, num_args = 3, required = true)]
    pub amp: Vec<PathBuf>,

    /// Background sweeps (frequency, Vrms)
    #[arg(long, num_args = 3, required = true)]
    pub background: Vec<PathBuf>,

    /// Room temperature noise table (R, V², σ_V², σ_R)
    #[arg(long)]
    pub room: PathBuf,

    /// Liquid nitrogen noise table (R, V², σ_V², σ_R)
    #[arg(long)]
    pub ln2: PathBuf,

    /// Band gain fraction that defines the roll-off resistance
    #[arg(long, default_value_t = 0.5)]
    pub fraction: f64,

    /// Write the gain curve and its Gaussian fit to this CSV file
    #[arg(long)]
    pub gain_out: Option<PathBuf>,
}

fn read_sweeps(paths: &[PathBuf]) -> Result<Vec<Sweep>> {
    paths
        .iter()
        .map(|path| Sweep::read(path).wrap_err_with(|| format!("sweep {}", path.display())))
        .collect()
}

/// Runs the noise command.
pub(super) fn execute(args: &NoiseArgs) -> Result<()> {
    let input = NoiseData {
        amplifier: read_sweeps(&args.amp)?,
        background: read_sweeps(&args.background)?,
        room: NoiseTable::read(&args.room)
            .wrap_err_with(|| format!("noise table {}", args.room.display()))?,
        ln2: NoiseTable::read(&args.ln2)
            .wrap_err_with(|| format!("noise table {}", args.ln2.display()))?,
    };

    let model = JohnsonNoiseModel {
        config: NoiseConfig {
            roll_off: RollOffConfig {
                fraction: args.fraction,
                ..RollOffConfig::default()
            },
            ..NoiseConfig::default()
        },
    };
    let analysis = model.call(&input)?;

    let curve = analysis.fit.curve;
    let error = analysis.fit.uncertainty;
    println!(
        "gain fit: a = {:.4} ± {:.4}, mu = {:.2} ± {:.2} Hz, sigma = {:.2} ± {:.2} Hz",
        curve.amplitude,
        error.amplitude,
        curve.center.get::<hertz>(),
        error.center.get::<hertz>(),
        curve.width.get::<hertz>(),
        error.width.get::<hertz>(),
    );
    print_bath("room temperature", &input.room, &analysis.room);
    print_bath("liquid nitrogen", &input.ln2, &analysis.ln2);
    println!(
        "band gain falls to {} of its open value at R = {:.4} MΩ",
        args.fraction,
        analysis.roll_off.get::<megaohm>()
    );

    if let Some(path) = &args.gain_out {
        let rows: Vec<[f64; 3]> = analysis
            .gain
            .frequency()
            .iter()
            .zip(analysis.gain.gain())
            .map(|(&f, &g)| [f, g, curve.gain(Frequency::new::<hertz>(f))])
            .collect();
        write_gain_table(path, &rows)?;
    }
    Ok(())
}

/// Writes measured gain and fitted gain against frequency.
fn write_gain_table(path: &Path, rows: &[[f64; 3]]) -> Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_rows(
        &mut writer,
        "Frequency (Hz),Gain,Fit",
        rows.iter().map(<[f64; 3]>::as_slice),
        6,
    )
    .and_then(|()| writer.flush())
    .wrap_err_with(|| format!("cannot write {}", path.display()))
}

fn print_bath(name: &str, table: &NoiseTable, bath: &BathAnalysis) {
    println!("{name}:");
    for (r, band) in table.resistance().iter().zip(&bath.band_gains) {
        println!(
            "  R = {r:>10.1} Ω  band gain = {:.6e} ± {:.2e} Hz",
            band.value,
            band.std_error
        );
    }
    let fit = &bath.temperature;
    println!(
        "  temperature = {:.2} ± {:.2} K{}",
        fit.temperature.get::<kelvin>(),
        fit.std_error.get::<delta_kelvin>(),
        if fit.weighted { "" } else { " (unweighted)" }
    );
    let k = &bath.boltzmann;
    println!(
        "  k_B = {:.4e} ± {:.2e} J/K ({:.4} × exact)",
        k.constant.get::<joule_per_kelvin>(),
        k.std_error.get::<joule_per_kelvin>(),
        k.ratio
    );
}
