//! Configuration — output path, decompiler fill-in values and map projection,
//! loaded from ~/.citygeo/config.yaml.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geojson::DecompileOptions;
use crate::render::TileProjection;

/// User configuration. Every field is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where `compile` writes the document when no `-o` is given.
    pub output: PathBuf,
    /// City name written at the top of decompiled scripts.
    pub decompiled_city_name: String,
    /// Radius written for every decompiled lake.
    pub decompiled_lake_radius: f64,
    /// Angle written for every decompiled bend.
    pub decompiled_bend_angle: f64,
    pub projection: TileProjection,
    /// Entries kept by the compile log.
    pub log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        let decompile = DecompileOptions::default();
        Self {
            output: PathBuf::from("city.geojson"),
            decompiled_city_name: decompile.city_name,
            decompiled_lake_radius: decompile.lake_radius,
            decompiled_bend_angle: decompile.bend_angle,
            projection: TileProjection::default(),
            log_capacity: 256,
        }
    }
}

impl Config {
    /// Default config path (~/.citygeo/config.yaml).
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".citygeo");
        path.push("config.yaml");
        path
    }

    /// Load from the default path.
    pub fn load() -> Result<Self, io::Error> {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, io::Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
        std::fs::write(path, yaml)
    }

    pub fn decompile_options(&self) -> DecompileOptions {
        DecompileOptions {
            city_name: self.decompiled_city_name.clone(),
            bend_angle: self.decompiled_bend_angle,
            lake_radius: self.decompiled_lake_radius,
        }
    }
}
