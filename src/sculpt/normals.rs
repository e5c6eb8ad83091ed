// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Normal recalculation and winding repair

use super::{AssetStore, MeshPass, PassDetail};
use crate::error::SculptResult;
use crate::geometry::mesh_utils::{build_edge_counts, face_adjacency, traverses_forward, Edge};
use crate::geometry::Mesh;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

fn default_true() -> bool {
    true
}

/// Recompute vertex normals, optionally unifying face winding first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculateNormals {
    #[serde(default = "default_true")]
    pub make_consistent: bool,
}

impl Default for RecalculateNormals {
    fn default() -> Self {
        Self {
            make_consistent: true,
        }
    }
}

impl MeshPass for RecalculateNormals {
    fn name(&self) -> &'static str {
        "recalculate_normals"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        if self.make_consistent {
            let flipped = make_consistent(mesh);
            debug!(flipped, "unified face winding");
        }
        mesh.recompute_normals();
        Ok(PassDetail::None)
    }
}

/// Orient faces so neighbours agree on winding, then turn closed components
/// outward. Returns the number of faces flipped.
pub fn make_consistent(mesh: &mut Mesh) -> usize {
    let adjacency = face_adjacency(mesh);
    let edge_counts = build_edge_counts(mesh);
    let mut visited = vec![false; mesh.face_count()];
    let mut flipped = 0;

    for seed in 0..mesh.face_count() {
        if visited[seed] {
            continue;
        }

        // Breadth-first walk over one edge-connected component
        let mut component = vec![seed];
        let mut queue = VecDeque::from([seed]);
        visited[seed] = true;

        while let Some(face_idx) = queue.pop_front() {
            for &(other, edge) in &adjacency[face_idx] {
                if visited[other] {
                    continue;
                }
                if traverses_forward(&mesh.faces[face_idx], edge)
                    == traverses_forward(&mesh.faces[other], edge)
                {
                    mesh.faces[other].flip();
                    flipped += 1;
                }
                visited[other] = true;
                component.push(other);
                queue.push_back(other);
            }
        }

        let closed = component.iter().all(|&f| {
            mesh.faces[f]
                .edges()
                .all(|(a, b)| edge_counts.get(&Edge::new(a, b)) == Some(&2))
        });
        if closed && component_volume(mesh, &component) < 0.0 {
            for &f in &component {
                mesh.faces[f].flip();
            }
            flipped += component.len();
        }
    }

    flipped
}

/// Signed volume of a set of faces measured about their own centroid
fn component_volume(mesh: &Mesh, faces: &[usize]) -> f64 {
    let mut centroid = Vector3::zeros();
    let mut count = 0usize;
    for &f in faces {
        for &i in &mesh.faces[f].indices {
            centroid += mesh.vertices[i].position.coords;
            count += 1;
        }
    }
    let centroid = centroid / count.max(1) as f64;

    faces
        .iter()
        .flat_map(|&f| mesh.faces[f].triangles())
        .map(|[a, b, c]| {
            let p0 = mesh.vertices[a].position.coords - centroid;
            let p1 = mesh.vertices[b].position.coords - centroid;
            let p2 = mesh.vertices[c].position.coords - centroid;
            p0.dot(&p1.cross(&p2)) / 6.0
        })
        .sum()
}
