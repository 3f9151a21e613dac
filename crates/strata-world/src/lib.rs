//! Procedural height field, tile coordinates, and terrain configuration.
#![forbid(unsafe_code)]

mod field;
pub mod noise;
mod tile_coord;
pub mod worldgen;

pub use field::{NoiseField, Octave};
pub use noise::{Interpolation, LatticeNoise, NoiseRange, Primitive};
pub use tile_coord::TileCoord;
pub use worldgen::{ConfigError, NoiseConfig, NormalSource, StreamConfig, TerrainConfig};
