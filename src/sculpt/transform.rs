// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Affine and refinement passes

use super::{AssetStore, MeshPass, PassDetail};
use crate::error::{SculptError, SculptResult};
use crate::geometry::{subdivide, Mesh};
use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Non-uniform scale about the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub factors: [f64; 3],
}

impl Scale {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { factors: [x, y, z] }
    }
}

impl MeshPass for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        if self.factors.iter().any(|f| !f.is_finite() || *f == 0.0) {
            return Err(SculptError::InvalidParameter {
                pass: self.name().to_string(),
                reason: format!("scale factors {:?} must be finite and non-zero", self.factors),
            });
        }
        let [x, y, z] = self.factors;
        mesh.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)));
        Ok(PassDetail::None)
    }
}

/// Subdivision refinement; each iteration splits every face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdivide {
    pub iterations: u32,
}

impl MeshPass for Subdivide {
    fn name(&self) -> &'static str {
        "subdivide"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        subdivide(mesh, self.iterations);
        Ok(PassDetail::None)
    }
}
