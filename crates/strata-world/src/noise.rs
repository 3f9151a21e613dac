//! Lattice gradient noise and the library-backed alternatives.
//!
//! Every primitive here is a pure function of its seed and input
//! coordinates; the structs hold configuration only.

use std::f64::consts::PI;
use std::fmt;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::{Deserialize, Serialize};

/// Blend weight applied along each axis between lattice corners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Smoothstep,
    Quintic,
}

impl Interpolation {
    #[inline]
    pub fn weight(self, t: f64) -> f64 {
        match self {
            Interpolation::Linear => t,
            Interpolation::Smoothstep => t * t * (3.0 - 2.0 * t),
            Interpolation::Quintic => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }
}

/// Output convention of a single primitive evaluation, applied to every octave.
///
/// `Signed` keeps the raw value centred on zero; `Unit` shifts it with
/// `(v + 1) / 2`, which raises the composite terrain by half the summed
/// amplitudes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseRange {
    #[default]
    Signed,
    Unit,
}

impl NoiseRange {
    #[inline]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            NoiseRange::Signed => v,
            NoiseRange::Unit => (v + 1.0) * 0.5,
        }
    }
}

/// Which 2D noise function backs the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    #[default]
    Lattice,
    OpenSimplex2,
    Perlin,
    ValueCubic,
}

/// Gradient noise on the integer lattice with hashed angular gradients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeNoise {
    seed: f64,
    interpolation: Interpolation,
}

const GRADIENT_LENGTH: f64 = 2.0;

impl LatticeNoise {
    pub fn new(seed: i32, interpolation: Interpolation) -> Self {
        Self {
            seed: f64::from(seed),
            interpolation,
        }
    }

    /// Pseudo-random value in `(-1, 1)` for a lattice point.
    #[inline]
    fn hash(&self, ix: f64, iy: f64) -> f64 {
        ((12.9898 * ix + 78.233 * iy + self.seed).sin() * 43758.5453) % 1.0
    }

    #[inline]
    fn gradient(&self, ix: f64, iy: f64) -> (f64, f64) {
        let angle = 200.0 * PI * self.hash(ix, iy);
        (GRADIENT_LENGTH * angle.cos(), GRADIENT_LENGTH * angle.sin())
    }

    #[inline]
    fn corner(&self, ix: f64, iy: f64, x: f64, y: f64) -> f64 {
        let (gx, gy) = self.gradient(ix, iy);
        (x - ix) * gx + (y - iy) * gy
    }

    /// Evaluates the noise at lattice-space coordinates. The value is zero
    /// on every lattice point and continuous everywhere.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let x1 = x0 + 1.0;
        let y1 = y0 + 1.0;

        let d00 = self.corner(x0, y0, x, y);
        let d01 = self.corner(x0, y1, x, y);
        let d10 = self.corner(x1, y0, x, y);
        let d11 = self.corner(x1, y1, x, y);

        let wx = self.interpolation.weight(x - x0);
        let wy = self.interpolation.weight(y - y0);
        let near = lerp(d00, d01, wy);
        let far = lerp(d10, d11, wy);
        lerp(near, far, wx)
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (b - a) * t + a
}

/// A configured primitive, ready to evaluate.
pub enum Sampler {
    Lattice(LatticeNoise),
    Library { kind: Primitive, noise: FastNoiseLite },
}

impl Sampler {
    pub fn new(primitive: Primitive, seed: i32, interpolation: Interpolation) -> Self {
        let noise_type = match primitive {
            Primitive::Lattice => return Sampler::Lattice(LatticeNoise::new(seed, interpolation)),
            Primitive::OpenSimplex2 => NoiseType::OpenSimplex2,
            Primitive::Perlin => NoiseType::Perlin,
            Primitive::ValueCubic => NoiseType::ValueCubic,
        };
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(noise_type));
        // Octave wavelengths are applied before sampling.
        noise.set_frequency(Some(1.0));
        Sampler::Library {
            kind: primitive,
            noise,
        }
    }

    pub fn primitive(&self) -> Primitive {
        match self {
            Sampler::Lattice(_) => Primitive::Lattice,
            Sampler::Library { kind, .. } => *kind,
        }
    }

    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        match self {
            Sampler::Lattice(lattice) => lattice.sample(x, y),
            Sampler::Library { noise, .. } => f64::from(noise.get_noise_2d(x as _, y as _)),
        }
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampler::Lattice(lattice) => f.debug_tuple("Lattice").field(lattice).finish(),
            Sampler::Library { kind, .. } => f.debug_struct("Library").field("kind", kind).finish(),
        }
    }
}
