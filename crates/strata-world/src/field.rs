use serde::{Deserialize, Serialize};
use strata_geom::Vec3;

use crate::noise::{NoiseRange, Primitive, Sampler};
use crate::worldgen::{ConfigError, NoiseConfig};

/// One term of the height composite: `amplitude * noise(p / wavelength)`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Octave {
    pub amplitude: f64,
    pub wavelength: f64,
}

impl Octave {
    pub const fn new(amplitude: f64, wavelength: f64) -> Self {
        Self {
            amplitude,
            wavelength,
        }
    }
}

// Flattened octave used in the sampling loop.
#[derive(Clone, Copy, Debug)]
struct Band {
    amplitude: f64,
    frequency: f64,
}

/// Deterministic height and normal function over the infinite plane.
///
/// Construction is the only place configuration is read; afterwards every
/// query is a pure function of `(x, z)`, so one field can be shared across
/// threads behind an `Arc`.
#[derive(Debug)]
pub struct NoiseField {
    seed: i32,
    octaves: Vec<Octave>,
    bands: Vec<Band>,
    offset: f64,
    range: NoiseRange,
    normal_step: f64,
    sampler: Sampler,
}

impl NoiseField {
    /// Field with the default octave stack for `seed`.
    pub fn new(seed: i32) -> Self {
        Self::build(seed, &NoiseConfig::default())
    }

    pub fn from_config(seed: i32, cfg: &NoiseConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        log::debug!(
            target: "worldgen",
            "noise field seed={} primitive={:?} interpolation={:?} range={:?} octaves={}",
            seed,
            cfg.primitive,
            cfg.interpolation,
            cfg.range,
            cfg.octaves.len()
        );
        Ok(Self::build(seed, cfg))
    }

    fn build(seed: i32, cfg: &NoiseConfig) -> Self {
        let bands = cfg
            .octaves
            .iter()
            .map(|o| Band {
                amplitude: o.amplitude,
                frequency: 1.0 / o.wavelength,
            })
            .collect();
        Self {
            seed,
            octaves: cfg.octaves.clone(),
            bands,
            offset: cfg.offset,
            range: cfg.range,
            normal_step: cfg.normal_step,
            sampler: Sampler::new(cfg.primitive, seed, cfg.interpolation),
        }
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn primitive(&self) -> Primitive {
        self.sampler.primitive()
    }

    /// Single primitive evaluation in lattice space, after the range convention.
    #[inline]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        self.range.apply(self.sampler.sample(x, z))
    }

    /// Terrain height at world position `(x, z)`.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let mut h = 0.0;
        for band in &self.bands {
            h += band.amplitude * self.sample(x * band.frequency, z * band.frequency);
        }
        h + self.offset
    }

    /// Central-difference slope `(dh/dx, dh/dz)`.
    pub fn gradient(&self, x: f64, z: f64) -> (f64, f64) {
        let s = self.normal_step;
        let dx = (self.height(x + s, z) - self.height(x - s, z)) / (2.0 * s);
        let dz = (self.height(x, z + s) - self.height(x, z - s)) / (2.0 * s);
        (dx, dz)
    }

    /// Unit surface normal; its `y` component is always positive.
    pub fn normal(&self, x: f64, z: f64) -> Vec3 {
        let (dx, dz) = self.gradient(x, z);
        Vec3::new(-dx, 1.0, -dz).normalized()
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}
