use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::field::Octave;
use crate::noise::{Interpolation, NoiseRange, Primitive};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TerrainConfig {
    #[serde(default)]
    pub seed: i32,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub streaming: StreamConfig,
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.noise.validate()?;
        self.streaming.validate()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TerrainConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    TerrainConfig::from_toml_str(&s)
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NoiseConfig {
    #[serde(default)]
    pub primitive: Primitive,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub range: NoiseRange,
    #[serde(default = "default_offset")]
    pub offset: f64,
    #[serde(default = "default_normal_step")]
    pub normal_step: f64,
    #[serde(default = "default_octaves")]
    pub octaves: Vec<Octave>,
}

fn default_offset() -> f64 {
    -8.0
}
fn default_normal_step() -> f64 {
    0.1
}
fn default_octaves() -> Vec<Octave> {
    vec![
        Octave::new(0.08, 1.29),
        Octave::new(1.1, 7.6),
        Octave::new(5.0, 38.7),
        Octave::new(20.0, 92.8),
        Octave::new(100.0, 529.0),
    ]
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            primitive: Primitive::default(),
            interpolation: Interpolation::default(),
            range: NoiseRange::default(),
            offset: default_offset(),
            normal_step: default_normal_step(),
            octaves: default_octaves(),
        }
    }
}

impl NoiseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.offset.is_finite() {
            return Err(ConfigError::Offset(self.offset));
        }
        if !(self.normal_step.is_finite() && self.normal_step > 0.0) {
            return Err(ConfigError::NormalStep(self.normal_step));
        }
        for (index, o) in self.octaves.iter().enumerate() {
            if !(o.wavelength.is_finite() && o.wavelength > 0.0) {
                return Err(ConfigError::Wavelength {
                    index,
                    wavelength: o.wavelength,
                });
            }
            if !o.amplitude.is_finite() {
                return Err(ConfigError::Amplitude {
                    index,
                    amplitude: o.amplitude,
                });
            }
        }
        Ok(())
    }
}

/// Where per-vertex normals of generated tiles come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSource {
    /// Area-weighted average of the adjacent triangle normals.
    #[default]
    Mesh,
    /// Finite-difference normal of the noise field at the vertex.
    Field,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StreamConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f64,
    /// Vertices per tile edge.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_load_radius")]
    pub load_radius: f64,
    #[serde(default = "default_unload_radius")]
    pub unload_radius: f64,
    #[serde(default)]
    pub normals: NormalSource,
    #[serde(default)]
    pub parallel_meshing: bool,
}

fn default_chunk_size() -> f64 {
    100.0
}
fn default_grid_size() -> usize {
    21
}
fn default_load_radius() -> f64 {
    250.0
}
fn default_unload_radius() -> f64 {
    300.0
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            grid_size: default_grid_size(),
            load_radius: default_load_radius(),
            unload_radius: default_unload_radius(),
            normals: NormalSource::default(),
            parallel_meshing: false,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(ConfigError::ChunkSize(self.chunk_size));
        }
        if self.grid_size < 2 {
            return Err(ConfigError::GridSize(self.grid_size));
        }
        if !(self.load_radius.is_finite() && self.load_radius > 0.0) {
            return Err(ConfigError::LoadRadius(self.load_radius));
        }
        if !self.unload_radius.is_finite() {
            return Err(ConfigError::UnloadRadius(self.unload_radius));
        }
        if self.unload_radius <= self.load_radius {
            return Err(ConfigError::Hysteresis {
                load: self.load_radius,
                unload: self.unload_radius,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn load_radius_sq(&self) -> f64 {
        self.load_radius * self.load_radius
    }

    #[inline]
    pub fn unload_radius_sq(&self) -> f64 {
        self.unload_radius * self.unload_radius
    }

    /// Furthest a tile centre can sit from the point that requested it.
    #[inline]
    pub fn rounding_slack(&self) -> f64 {
        self.chunk_size * std::f64::consts::FRAC_1_SQRT_2
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unload radius {unload} must be strictly greater than load radius {load}")]
    Hysteresis { load: f64, unload: f64 },
    #[error("chunk size must be positive and finite, got {0}")]
    ChunkSize(f64),
    #[error("grid size must be at least 2 vertices per edge, got {0}")]
    GridSize(usize),
    #[error("load radius must be positive and finite, got {0}")]
    LoadRadius(f64),
    #[error("unload radius must be finite, got {0}")]
    UnloadRadius(f64),
    #[error("octave {index}: wavelength must be positive and finite, got {wavelength}")]
    Wavelength { index: usize, wavelength: f64 },
    #[error("octave {index}: amplitude must be finite, got {amplitude}")]
    Amplitude { index: usize, amplitude: f64 },
    #[error("normal step must be positive and finite, got {0}")]
    NormalStep(f64),
    #[error("height offset must be finite, got {0}")]
    Offset(f64),
}
