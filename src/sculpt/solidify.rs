// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shell thickening

use super::{AssetStore, MeshPass, PassDetail};
use crate::error::{SculptError, SculptResult};
use crate::geometry::mesh_utils::boundary_edges;
use crate::geometry::{Face, Mesh, Vertex};
use serde::{Deserialize, Serialize};

/// Give a surface thickness by extruding an inner copy along the normals.
///
/// `offset` places the shell relative to the original surface: `-1` grows it
/// fully inward, `0` centres it, `1` grows it fully outward. Boundary edges are
/// closed with rim quads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solidify {
    pub thickness: f64,
    #[serde(default)]
    pub offset: f64,
}

impl Solidify {
    pub fn new(thickness: f64, offset: f64) -> Self {
        Self { thickness, offset }
    }
}

impl MeshPass for Solidify {
    fn name(&self) -> &'static str {
        "solidify"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        if !(-1.0..=1.0).contains(&self.offset) {
            return Err(SculptError::InvalidParameter {
                pass: self.name().to_string(),
                reason: format!("offset {} outside [-1, 1]", self.offset),
            });
        }
        if mesh.faces.is_empty() || self.thickness == 0.0 {
            return Ok(PassDetail::None);
        }

        mesh.recompute_normals();
        let rims = boundary_edges(mesh);

        let n = mesh.vertex_count();
        let outer = self.thickness * (1.0 + self.offset) / 2.0;
        let inner = self.thickness * (1.0 - self.offset) / 2.0;

        let inner_vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .map(|v| Vertex::new(v.position - v.normal * inner, -v.normal))
            .collect();
        for vertex in &mut mesh.vertices {
            vertex.position += vertex.normal * outer;
        }
        mesh.vertices.extend(inner_vertices);

        if let Some(uvs) = &mut mesh.uvs {
            uvs.extend_from_within(..n);
        }

        let inner_faces: Vec<Face> = mesh
            .faces
            .iter()
            .map(|face| Face::new(face.indices.iter().rev().map(|&i| i + n).collect()))
            .collect();
        mesh.faces.extend(inner_faces);

        for (a, b) in rims {
            mesh.add_face(Face::quad(b, a, a + n, b + n));
        }

        mesh.recompute_normals();
        Ok(PassDetail::None)
    }
}
