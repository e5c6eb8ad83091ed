// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Displacement passes
//!
//! Noise and image displacement move each vertex along its current normal;
//! radial jitter scales the position vector about the origin. Normals are
//! recomputed once a pass has moved the surface.

use super::{AssetStore, MeshPass, NoiseField, PassDetail};
use crate::error::{SculptError, SculptResult};
use crate::geometry::Mesh;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Displace vertices along their normals by `sample * strength`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseDisplace {
    pub field: NoiseField,
    pub strength: f64,
}

impl NoiseDisplace {
    pub fn new(field: NoiseField, strength: f64) -> Self {
        Self { field, strength }
    }
}

impl MeshPass for NoiseDisplace {
    fn name(&self) -> &'static str {
        "noise_displace"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        if mesh.vertices.is_empty() {
            return Ok(PassDetail::None);
        }

        let sampler = self.field.sampler();
        for vertex in &mut mesh.vertices {
            let displacement = sampler.sample(&vertex.position) * self.strength;
            vertex.position += vertex.normal * displacement;
        }

        mesh.recompute_normals();
        Ok(PassDetail::None)
    }
}

fn default_mid_level() -> f64 {
    0.5
}

/// Displace vertices along their normals by `(luminance(uv) - mid_level) * strength`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDisplace {
    pub image: PathBuf,
    #[serde(default = "default_mid_level")]
    pub mid_level: f64,
    pub strength: f64,
}

impl ImageDisplace {
    pub fn new(image: impl Into<PathBuf>, mid_level: f64, strength: f64) -> Self {
        Self {
            image: image.into(),
            mid_level,
            strength,
        }
    }
}

impl MeshPass for ImageDisplace {
    fn name(&self) -> &'static str {
        "image_displace"
    }

    fn apply(&self, mesh: &mut Mesh, assets: &mut AssetStore) -> SculptResult<PassDetail> {
        // Resolve the image first so a missing asset is reported even on empty meshes
        let map = assets.height_map(&self.image)?;

        if mesh.vertices.is_empty() {
            return Ok(PassDetail::None);
        }
        let uvs = mesh.uvs.as_ref().ok_or_else(|| SculptError::MissingUvs {
            pass: self.name().to_string(),
        })?;

        // Sampling is independent per vertex; collect preserves index order
        let offsets: Vec<Vector3<f64>> = mesh
            .vertices
            .par_iter()
            .zip(uvs.par_iter())
            .map(|(vertex, uv)| {
                let amount = (map.sample(uv) - self.mid_level) * self.strength;
                vertex.normal * amount
            })
            .collect();

        for (vertex, offset) in mesh.vertices.iter_mut().zip(offsets) {
            vertex.position += offset;
        }

        mesh.recompute_normals();
        Ok(PassDetail::None)
    }
}

/// Scale each position vector by `1 + (r - 0.5) * s`, with `s` drawn per vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialJitter {
    pub seed: u64,
    pub min_strength: f64,
    pub max_strength: f64,
}

impl MeshPass for RadialJitter {
    fn name(&self) -> &'static str {
        "radial_jitter"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        if self.max_strength < self.min_strength {
            return Err(SculptError::InvalidParameter {
                pass: self.name().to_string(),
                reason: format!(
                    "max_strength {} is below min_strength {}",
                    self.max_strength, self.min_strength
                ),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        for vertex in &mut mesh.vertices {
            let strength = if self.max_strength > self.min_strength {
                rng.gen_range(self.min_strength..self.max_strength)
            } else {
                self.min_strength
            };
            let displacement = (rng.gen::<f64>() - 0.5) * strength;
            vertex.position.coords *= 1.0 + displacement;
        }

        mesh.recompute_normals();
        Ok(PassDetail::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::sculpt::HeightMap;
    use approx::assert_relative_eq;

    #[test]
    fn test_noise_displace_empty_mesh_is_noop() {
        let mut mesh = Mesh::new();
        let pass = NoiseDisplace::new(NoiseField::cellular(1, 3.0), 0.2);
        pass.apply(&mut mesh, &mut AssetStore::new()).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_noise_displace_moves_along_normals() {
        let base = Primitive::icosphere(1.0, 1).to_mesh();
        let mut mesh = base.clone();
        let pass = NoiseDisplace::new(NoiseField::clouds(9, 2.0), 0.1);
        pass.apply(&mut mesh, &mut AssetStore::new()).unwrap();

        for (before, after) in base.vertices.iter().zip(&mesh.vertices) {
            let delta = after.position - before.position;
            assert!(delta.norm() <= 0.1 + 1e-12);
            // Icosphere normals are radial, so the offset stays radial
            assert!(delta.cross(&before.normal).norm() < 1e-9);
        }
    }

    #[test]
    fn test_image_displace_uniform_map() {
        let mut mesh = Primitive::plane(2.0, 4, 4).to_mesh();
        let mut assets = AssetStore::new();
        assets.insert_height_map("white.png", HeightMap::uniform(8, 8, 1.0).unwrap());

        ImageDisplace::new("white.png", 0.0, 0.15)
            .apply(&mut mesh, &mut assets)
            .unwrap();
        for vertex in &mesh.vertices {
            assert_relative_eq!(vertex.position.z, 0.15, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_image_displace_requires_uvs() {
        let mut mesh = Primitive::icosphere(1.0, 0).to_mesh();
        let mut assets = AssetStore::new();
        assets.insert_height_map("map.png", HeightMap::uniform(2, 2, 0.5).unwrap());

        let result = ImageDisplace::new("map.png", 0.5, 0.1).apply(&mut mesh, &mut assets);
        assert!(matches!(result, Err(SculptError::MissingUvs { .. })));
    }

    #[test]
    fn test_radial_jitter_is_seeded() {
        let pass = RadialJitter {
            seed: 5,
            min_strength: 0.05,
            max_strength: 0.15,
        };
        let mut a = Primitive::icosphere(1.0, 1).to_mesh();
        let mut b = a.clone();
        pass.apply(&mut a, &mut AssetStore::new()).unwrap();
        pass.apply(&mut b, &mut AssetStore::new()).unwrap();
        assert_eq!(a, b);

        for vertex in &a.vertices {
            let radius = vertex.position.coords.norm();
            assert!(radius >= 1.0 - 0.075 - 1e-12 && radius <= 1.0 + 0.075 + 1e-12);
        }
    }

    #[test]
    fn test_radial_jitter_rejects_inverted_range() {
        let pass = RadialJitter {
            seed: 1,
            min_strength: 0.2,
            max_strength: 0.1,
        };
        let mut mesh = Primitive::icosphere(1.0, 0).to_mesh();
        assert!(pass.apply(&mut mesh, &mut AssetStore::new()).is_err());
    }
}
