use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use image::{GrayImage, Luma};
use ndarray::Array2;

use super::{FieldStats, HeatError};

/// Writes a field as comma separated rows, top row first.
///
/// # Errors
///
/// Returns [`HeatError::Io`] if the file cannot be written.
pub fn write_field_csv(field: &Array2<f64>, path: impl AsRef<Path>) -> Result<(), HeatError> {
    let path = path.as_ref();
    let io_error = |source| HeatError::Io {
        path: path.to_owned(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    for row in field.rows() {
        let line = row
            .iter()
            .map(|t| format!("{t:.6}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{line}").map_err(io_error)?;
    }
    writer.flush().map_err(io_error)
}

/// Renders a field as an 8-bit grayscale heat map, hottest cells white.
///
/// A constant field renders black.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn heat_map(field: &Array2<f64>) -> GrayImage {
    let (rows, cols) = field.dim();
    let Some(stats) = FieldStats::of(field) else {
        return GrayImage::new(0, 0);
    };
    let span = stats.max - stats.min;

    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let t = field[[y as usize, x as usize]];
        let level = if span > 0.0 {
            ((t - stats.min) / span * 255.0).round()
        } else {
            0.0
        };
        Luma([level.clamp(0.0, 255.0) as u8])
    })
}

/// Writes the heat map of a field as an image; the format follows the
/// file extension.
///
/// # Errors
///
/// Returns [`HeatError::Image`] if the image cannot be encoded or written.
pub fn write_heat_map(field: &Array2<f64>, path: impl AsRef<Path>) -> Result<(), HeatError> {
    heat_map(field).save(path)?;
    Ok(())
}
