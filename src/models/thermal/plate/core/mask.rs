use std::path::Path;

use image::RgbImage;
use ndarray::Array2;

use super::{MaskError, Shape};

/// Pixels darker than this mean channel value belong to the object.
const DARK_THRESHOLD: f64 = 100.0;

/// Cells of the grid occupied by an object with its own diffusivity.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMask(Array2<bool>);

impl ObjectMask {
    /// A mask with no object.
    #[must_use]
    pub fn empty(grid: usize) -> Self {
        Self(Array2::from_elem((grid, grid), false))
    }

    /// Builds the mask for `shape` on a `grid × grid` plate.
    ///
    /// # Errors
    ///
    /// Returns a [`MaskError`] if an image shape cannot be loaded or does not
    /// fit the grid.
    pub fn from_shape(shape: &Shape, grid: usize) -> Result<Self, MaskError> {
        let n = grid as f64;
        let mask = match shape {
            Shape::None => Self::empty(grid),
            Shape::Dot => {
                let lo = grid / 2 - grid / 20;
                let hi = grid / 2 + grid / 20;
                Self(Array2::from_shape_fn((grid, grid), |(j, i)| {
                    (lo..hi).contains(&j) && (lo..hi).contains(&i)
                }))
            }
            Shape::Square => Self::from_fn(grid, |x, y| {
                x.abs() < n / 4.0 && y.abs() < n / 4.0
            }),
            Shape::Circle => Self::from_fn(grid, |x, y| x.hypot(y) < n / 4.0),
            Shape::Cross => {
                let (half_length, half_width) = (n / 3.0, n / 12.0);
                Self::from_fn(grid, |x, y| {
                    let horizontal = x.abs() < half_length && y.abs() < half_width;
                    let vertical = y.abs() < half_length && x.abs() < half_width;
                    horizontal || vertical
                })
            }
            Shape::Image(path) => Self::from_image_path(path, grid)?,
        };
        tracing::debug!(?shape, grid, cells = mask.count(), "built object mask");
        Ok(mask)
    }

    /// Loads a shape image and scales it to the grid.
    ///
    /// # Errors
    ///
    /// Returns a [`MaskError`] if the image cannot be decoded, is not square,
    /// or its side does not divide `grid`.
    pub fn from_image_path(path: impl AsRef<Path>, grid: usize) -> Result<Self, MaskError> {
        let image = image::open(path)?.to_rgb8();
        Self::from_image(&image, grid)
    }

    /// Builds a mask from an image: a pixel is part of the object when the
    /// mean of its RGB channels is below 100. Each pixel becomes a square
    /// block of `grid / side` cells.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::NotSquare`] or [`MaskError::NotDivisor`] if the
    /// image does not fit the grid.
    pub fn from_image(image: &RgbImage, grid: usize) -> Result<Self, MaskError> {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(MaskError::NotSquare { width, height });
        }

        let side = width as usize;
        let dark = Array2::from_shape_fn((side, side), |(row, col)| {
            #[allow(clippy::cast_possible_truncation)]
            let pixel = image.get_pixel(col as u32, row as u32);
            let mean = pixel.0.iter().map(|&c| f64::from(c)).sum::<f64>() / 3.0;
            mean < DARK_THRESHOLD
        });
        Self::from_pixels(&dark, grid)
    }

    /// Scales a square pixel mask up to the grid by integer repetition.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::NotDivisor`] if the pixel side does not divide `grid`.
    pub fn from_pixels(pixels: &Array2<bool>, grid: usize) -> Result<Self, MaskError> {
        let (rows, cols) = pixels.dim();
        if rows != cols {
            return Err(MaskError::NotSquare {
                width: u32::try_from(cols).unwrap_or(u32::MAX),
                height: u32::try_from(rows).unwrap_or(u32::MAX),
            });
        }
        if rows == 0 || grid % rows != 0 {
            return Err(MaskError::NotDivisor { side: rows, grid });
        }

        let scale = grid / rows;
        Ok(Self(Array2::from_shape_fn((grid, grid), |(j, i)| {
            pixels[[j / scale, i / scale]]
        })))
    }

    /// Wraps an existing boolean grid.
    #[must_use]
    pub fn from_array(cells: Array2<bool>) -> Self {
        Self(cells)
    }

    /// Cells per side.
    #[must_use]
    pub fn grid(&self) -> usize {
        self.0.nrows()
    }

    /// Number of object cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&cell| cell).count()
    }

    /// Returns `true` if no cell belongs to the object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// The underlying boolean grid, indexed `[row, col]`.
    #[must_use]
    pub fn as_array(&self) -> &Array2<bool> {
        &self.0
    }

    /// Builds a mask from a predicate on cell-center coordinates relative to
    /// the grid center.
    fn from_fn(grid: usize, inside: impl Fn(f64, f64) -> bool) -> Self {
        let center = grid as f64 / 2.0;
        Self(Array2::from_shape_fn((grid, grid), |(j, i)| {
            let x = i as f64 + 0.5 - center;
            let y = j as f64 + 0.5 - center;
            inside(x, y)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgb;

    #[test]
    fn image_pixels_scale_to_blocks() {
        let mut image = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        image.put_pixel(1, 0, Rgb([0, 0, 0]));
        // Mean 110 is not dark enough.
        image.put_pixel(0, 1, Rgb([90, 120, 120]));

        let mask = ObjectMask::from_image(&image, 4).unwrap();
        let expected = ndarray::array![
            [false, false, true, true],
            [false, false, true, true],
            [false, false, false, false],
            [false, false, false, false],
        ];
        assert_eq!(mask.as_array(), &expected);
        assert_eq!(mask.count(), 4);
    }

    #[test]
    fn rejects_images_that_do_not_fit() {
        let wide = RgbImage::new(3, 2);
        assert!(matches!(
            ObjectMask::from_image(&wide, 6),
            Err(MaskError::NotSquare {
                width: 3,
                height: 2
            })
        ));

        let square = RgbImage::new(3, 3);
        assert!(matches!(
            ObjectMask::from_image(&square, 100),
            Err(MaskError::NotDivisor { side: 3, grid: 100 })
        ));
    }

    #[test]
    fn loads_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let mut image = RgbImage::from_pixel(5, 5, Rgb([255, 255, 255]));
        image.put_pixel(2, 2, Rgb([0, 0, 0]));
        image.save(&path).unwrap();

        let mask = ObjectMask::from_shape(&Shape::Image(path), 100).unwrap();
        assert_eq!(mask.count(), 20 * 20);
        assert!(mask.as_array()[[50, 50]]);
        assert!(!mask.as_array()[[0, 0]]);
    }

    #[test]
    fn alpha_channel_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        let mut image = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
        image.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, image::Rgba([90, 90, 90, 255]));
        image.put_pixel(0, 1, image::Rgba([255, 255, 255, 0]));
        image.save(&path).unwrap();

        let mask = ObjectMask::from_image_path(&path, 2).unwrap();
        assert!(mask.as_array()[[0, 0]]);
        assert!(mask.as_array()[[0, 1]]);
        assert!(!mask.as_array()[[1, 0]]);
        assert!(!mask.as_array()[[1, 1]]);
    }

    #[test]
    fn procedural_shapes_are_centered_and_symmetric() {
        for shape in [Shape::Dot, Shape::Square, Shape::Circle, Shape::Cross] {
            let mask = ObjectMask::from_shape(&shape, 100).unwrap();
            let cells = mask.as_array();

            assert!(cells[[50, 50]], "{shape:?} misses the center");
            assert!(!cells[[0, 0]], "{shape:?} reaches the corner");
            assert_eq!(cells, &cells.t(), "{shape:?} is not symmetric");
            for j in 0..100 {
                for i in 0..100 {
                    assert_eq!(cells[[j, i]], cells[[99 - j, 99 - i]]);
                }
            }
        }

        assert!(ObjectMask::from_shape(&Shape::None, 100).unwrap().is_empty());
        assert_eq!(ObjectMask::from_shape(&Shape::Dot, 100).unwrap().count(), 100);
    }
}
