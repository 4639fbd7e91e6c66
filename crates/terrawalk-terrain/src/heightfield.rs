//! Ground elevation as a pure function of horizontal world position.
//!
//! Every consumer (mesh deformation, object placement, locomotion) must read
//! ground level through the same [`Heightfield`], so the type is built once
//! and handed out behind an `Arc`.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::noise::{SimplexNoise, SimplexSkew};

/// Mapping from noise space to world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightfieldParams {
    /// World units per noise unit. Input coordinates are divided by this.
    pub horizontal_scale: f64,
    /// Noise output is multiplied by this to get world height.
    pub vertical_amplitude: f64,
    /// Lattice constants for the underlying noise.
    pub skew: SimplexSkew,
}

impl Default for HeightfieldParams {
    fn default() -> Self {
        Self {
            horizontal_scale: 50.0,
            vertical_amplitude: 10.0,
            skew: SimplexSkew::default(),
        }
    }
}

/// Continuous, deterministic terrain height function.
#[derive(Clone, Debug)]
pub struct Heightfield {
    noise: SimplexNoise,
    params: HeightfieldParams,
}

impl Heightfield {
    /// Wrap a noise generator with the given scale and amplitude. The
    /// generator is switched to `params.skew`.
    pub fn new(noise: SimplexNoise, params: HeightfieldParams) -> Self {
        Self {
            noise: noise.with_skew(params.skew),
            params,
        }
    }

    /// Build the noise generator from a seed and wrap it.
    pub fn from_seed(seed: u64, params: HeightfieldParams) -> Self {
        Self::new(SimplexNoise::from_seed(seed), params)
    }

    /// Ground height at world position `(x, z)`.
    #[inline]
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let scale = self.params.horizontal_scale;
        self.noise.sample2(x / scale, z / scale) * self.params.vertical_amplitude
    }

    /// Upper bound on `|height(x, z)|`.
    pub fn max_abs_height(&self) -> f64 {
        self.params.vertical_amplitude.abs()
    }

    /// Unit surface normal estimated by central differences with spacing `eps`.
    pub fn normal(&self, x: f64, z: f64, eps: f64) -> DVec3 {
        let dx = self.height(x + eps, z) - self.height(x - eps, z);
        let dz = self.height(x, z + eps) - self.height(x, z - eps);
        DVec3::new(-dx, 2.0 * eps, -dz).normalize_or_zero()
    }

    /// Scale and amplitude in use.
    pub fn params(&self) -> &HeightfieldParams {
        &self.params
    }

    /// The noise generator behind this field.
    pub fn noise(&self) -> &SimplexNoise {
        &self.noise
    }
}
