// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Laplacian smoothing

use super::{AssetStore, MeshPass, PassDetail};
use crate::error::{SculptError, SculptResult};
use crate::geometry::mesh_utils::vertex_neighbors;
use crate::geometry::Mesh;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Move each vertex toward the centroid of its edge neighbours by `factor`, `repeat` times.
///
/// Every iteration reads the positions left by the previous one, never positions
/// already updated in the current iteration, so the result does not depend on
/// vertex order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Smooth {
    pub factor: f64,
    pub repeat: u32,
}

impl Smooth {
    pub fn new(factor: f64, repeat: u32) -> Self {
        Self { factor, repeat }
    }

    fn relax(&self, mesh: &mut Mesh) {
        let neighbors = vertex_neighbors(mesh);

        for _ in 0..self.repeat {
            let previous: Vec<Point3<f64>> = mesh.positions();

            for (i, vertex) in mesh.vertices.iter_mut().enumerate() {
                let around = &neighbors[i];
                if around.is_empty() {
                    continue;
                }
                let sum = around
                    .iter()
                    .fold(Vector3::zeros(), |acc, &n| acc + previous[n].coords);
                let centroid = sum / around.len() as f64;
                vertex.position = previous[i] + (centroid - previous[i].coords) * self.factor;
            }
        }
    }
}

impl MeshPass for Smooth {
    fn name(&self) -> &'static str {
        "smooth"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        if !(0.0..=1.0).contains(&self.factor) {
            return Err(SculptError::InvalidParameter {
                pass: self.name().to_string(),
                reason: format!("factor {} outside [0, 1]", self.factor),
            });
        }
        if self.factor == 0.0 || self.repeat == 0 {
            return Ok(PassDetail::None);
        }

        self.relax(mesh);
        mesh.recompute_normals();
        Ok(PassDetail::None)
    }
}
