//! Tunable startup parameters, read from TOML.
//!
//! Every field has a default, so a partial file (or no file) is valid:
//!
//! ```toml
//! [terrain]
//! x = 40
//!
//! [simulation]
//! time_scale = 2.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rocket_demo.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Rocket Demo".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Dimensions of the instanced cube grid, in cubes, and the cube edge length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSection {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub scale: f32,
}

impl Default for TerrainSection {
    fn default() -> Self {
        Self {
            x: 100,
            y: 20,
            z: 20,
            scale: 1.5,
        }
    }
}

impl TerrainSection {
    pub fn cube_count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Raises any zero dimension to one so the grid always holds a cube.
    pub fn clamp_dimensions(&mut self) {
        if self.cube_count() == 0 {
            log::warn!(
                "Terrain grid {}x{}x{} is empty, clamping each side to at least 1",
                self.x,
                self.y,
                self.z
            );
        }
        self.x = self.x.max(1);
        self.y = self.y.max(1);
        self.z = self.z.max(1);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketSection {
    pub speed: f32,
    pub explosion_radius: f32,
}

impl Default for RocketSection {
    fn default() -> Self {
        Self {
            speed: 1.0,
            explosion_radius: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Initial value, and the value restored by a reset.
    pub time_scale: f32,
    pub camera_speed: f32,
    /// Scaled seconds an explosion's particles stay alive.
    pub particle_lifetime: f32,
    pub particle_count: u32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            time_scale: 5.0,
            camera_speed: 8.0,
            particle_lifetime: 10.0,
            particle_count: 2000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Prefixed onto every texture path.
    pub root: PathBuf,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

impl AssetsSection {
    /// Resolves a texture path against the root. Empty paths stay empty.
    pub fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            PathBuf::new()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowSection,
    pub terrain: TerrainSection,
    pub rocket: RocketSection,
    pub simulation: SimulationSection,
    pub assets: AssetsSection,
}

impl GameConfig {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] if none is given.
    ///
    /// A missing default file yields the defaults. A missing file that was
    /// asked for explicitly is an error, as is malformed TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No {} found, using default configuration", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config = Self::parse(&text).map_err(|source| Error::Config {
            path: path.clone(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses TOML text. Zero terrain dimensions are raised to one.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.terrain.clamp_dimensions();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = GameConfig::parse("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.terrain.cube_count(), 40_000);
        assert_eq!(config.simulation.time_scale, 5.0);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = GameConfig::parse(
            r#"
            [terrain]
            x = 2
            scale = 1.0

            [rocket]
            explosion_radius = 3.5
            "#,
        )
        .unwrap();
        assert_eq!(config.terrain.x, 2);
        assert_eq!(config.terrain.y, 20);
        assert_eq!(config.terrain.scale, 1.0);
        assert_eq!(config.rocket.explosion_radius, 3.5);
        assert_eq!(config.rocket.speed, 1.0);
        assert_eq!(config.window.title, "Rocket Demo");
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(GameConfig::parse("[terrain\nx = ").is_err());
        assert!(GameConfig::parse("[terrain]\nx = \"wide\"").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = GameConfig::default();
        config.simulation.camera_speed = 3.0;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(GameConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = GameConfig::load(Some(Path::new("definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn zero_terrain_dimensions_clamp_to_one() {
        let config = GameConfig::parse("[terrain]\nx = 0\nz = 0").unwrap();
        assert_eq!(config.terrain.x, 1);
        assert_eq!(config.terrain.y, 20);
        assert_eq!(config.terrain.z, 1);
        assert_eq!(config.terrain.cube_count(), 20);
    }

    #[test]
    fn asset_paths_are_rooted() {
        let assets = AssetsSection::default();
        let stones = assets.resolve("stones.dds");
        assert_eq!(stones, PathBuf::from("assets/stones.dds"));
        assert_eq!(assets.resolve(""), PathBuf::new());
    }
}
