use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use super::HeatError;

/// Fixed temperatures along the four plate edges, in kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    /// All four edges at the same temperature.
    #[must_use]
    pub fn uniform(temperature: f64) -> Self {
        Self {
            top: temperature,
            right: temperature,
            bottom: temperature,
            left: temperature,
        }
    }
}

impl Default for Edges {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Object embedded in the plate.
///
/// Procedural shapes are centered on the grid. `Image` loads a square PNG
/// whose dark pixels mark the object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    None,
    Dot,
    Square,
    Circle,
    Cross,
    Image(PathBuf),
}

/// Raw simulation settings, as read from a JSON file or the command line.
///
/// Missing fields take the values of [`PlateConfig::default`], which are the
/// classic demo settings: a 100×100 plate with a cold background, a warm
/// object and warm edges, run for 1000 steps with a frame every 10 steps.
///
/// ```
/// use physlab::models::thermal::plate::PlateConfig;
///
/// let config = PlateConfig::from_json(r#"{ "grid": 200, "shape": "circle" }"#).unwrap();
/// assert_eq!(config.grid, 200);
/// assert_eq!(config.runtime, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlateConfig {
    /// Number of time steps.
    pub runtime: usize,

    /// Cells per side of the square grid.
    pub grid: usize,

    /// A frame is recorded every `rate` steps.
    pub rate: usize,

    /// Dirichlet edge temperatures, K.
    pub edges: Edges,

    /// Diffusivity outside the object, m²/s.
    pub background_diffusivity: f64,

    /// Diffusivity inside the object, m²/s.
    pub object_diffusivity: f64,

    /// Initial temperature outside the object, K.
    pub background_temp: f64,

    /// Initial temperature inside the object, K.
    pub object_temp: f64,

    /// Time step, s.
    pub dt: f64,

    /// Side length of the plate, m.
    pub size: f64,

    /// Object embedded in the plate.
    pub shape: Shape,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            runtime: 1000,
            grid: 100,
            rate: 10,
            edges: Edges::default(),
            background_diffusivity: 1e-6,
            object_diffusivity: 1e-6,
            background_temp: 0.0,
            object_temp: 1.0,
            dt: 1.0,
            size: 1.0,
            shape: Shape::None,
        }
    }
}

impl PlateConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`HeatError::Io`] if the file cannot be read and
    /// [`HeatError::Config`] if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HeatError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| HeatError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| HeatError::Config {
            path: path.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config = PlateConfig::from_json(
            r#"{
                "runtime": 500,
                "edges": { "top": 10.0 },
                "shape": { "image": "shapes/paw.png" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.runtime, 500);
        assert_eq!(config.grid, 100);
        assert_eq!(config.edges.top, 10.0);
        assert_eq!(config.edges.left, 1.0);
        assert_eq!(config.shape, Shape::Image(PathBuf::from("shapes/paw.png")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(PlateConfig::from_json(r#"{ "frames": 3 }"#).is_err());
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.json");
        fs::write(&path, r#"{ "shape": "cross" }"#).unwrap();
        assert_eq!(PlateConfig::from_json_file(&path).unwrap().shape, Shape::Cross);

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PlateConfig::from_json_file(&path),
            Err(HeatError::Config { .. })
        ));
    }
}
