// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Procedural displacement fields

use nalgebra::Point3;
use noise::core::worley::ReturnType;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin, Worley};
use serde::{Deserialize, Serialize};

/// Noise basis used by a displacement field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Worley distance to the nearest feature point; large rocky cells
    #[default]
    Cellular,
    /// Fractal Perlin noise; soft billowing detail
    Clouds,
    /// Single-octave Perlin gradient noise
    Perlin,
}

fn default_octaves() -> usize {
    3
}

/// Scalar field over 3D positions, fully determined by its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseField {
    #[serde(default)]
    pub kind: NoiseKind,
    pub seed: u32,
    /// Spatial frequency: positions are multiplied by this before sampling
    pub noise_scale: f64,
    /// Octave count for `Clouds`
    #[serde(default = "default_octaves")]
    pub octaves: usize,
}

impl NoiseField {
    pub fn new(kind: NoiseKind, seed: u32, noise_scale: f64) -> Self {
        Self {
            kind,
            seed,
            noise_scale,
            octaves: default_octaves(),
        }
    }

    pub fn cellular(seed: u32, noise_scale: f64) -> Self {
        Self::new(NoiseKind::Cellular, seed, noise_scale)
    }

    pub fn clouds(seed: u32, noise_scale: f64) -> Self {
        Self::new(NoiseKind::Clouds, seed, noise_scale)
    }

    /// Build a sampler for repeated evaluation
    pub fn sampler(&self) -> FieldSampler {
        let source: Box<dyn NoiseFn<f64, 3>> = match self.kind {
            NoiseKind::Cellular => {
                Box::new(Worley::new(self.seed).set_return_type(ReturnType::Distance))
            }
            NoiseKind::Clouds => {
                Box::new(Fbm::<Perlin>::new(self.seed).set_octaves(self.octaves.max(1)))
            }
            NoiseKind::Perlin => Box::new(Perlin::new(self.seed)),
        };
        FieldSampler {
            source,
            scale: self.noise_scale,
        }
    }
}

/// Evaluates a [`NoiseField`]; values are clamped to `[-1, 1]`
pub struct FieldSampler {
    source: Box<dyn NoiseFn<f64, 3>>,
    scale: f64,
}

impl FieldSampler {
    pub fn sample(&self, position: &Point3<f64>) -> f64 {
        let p = position.coords * self.scale;
        self.source.get([p.x, p.y, p.z]).clamp(-1.0, 1.0)
    }
}
