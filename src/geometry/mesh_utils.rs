// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh topology queries: edge counts, neighbours, boundaries

use super::Mesh;
use std::collections::HashMap;

/// Undirected edge, smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub v0: usize,
    pub v1: usize,
}

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        // Always store edges with smaller index first for consistent hashing
        if v0 < v1 {
            Self { v0, v1 }
        } else {
            Self { v0: v1, v1: v0 }
        }
    }
}

/// Count how many faces use each undirected edge
pub fn build_edge_counts(mesh: &Mesh) -> HashMap<Edge, u32> {
    let mut edge_counts: HashMap<Edge, u32> = HashMap::new();

    for face in &mesh.faces {
        for (a, b) in face.edges() {
            *edge_counts.entry(Edge::new(a, b)).or_insert(0) += 1;
        }
    }

    edge_counts
}

/// Check if mesh is manifold (each edge shared by at most 2 faces)
pub fn is_manifold(mesh: &Mesh) -> bool {
    build_edge_counts(mesh).values().all(|&count| count <= 2)
}

/// Check if mesh is closed (each edge shared by exactly 2 faces)
pub fn is_closed(mesh: &Mesh) -> bool {
    build_edge_counts(mesh).values().all(|&count| count == 2)
}

/// Directed boundary edges in face winding order, ordered by face
pub fn boundary_edges(mesh: &Mesh) -> Vec<(usize, usize)> {
    let edge_counts = build_edge_counts(mesh);

    mesh.faces
        .iter()
        .flat_map(|face| face.edges())
        .filter(|&(a, b)| edge_counts.get(&Edge::new(a, b)) == Some(&1))
        .collect()
}

/// Sorted, de-duplicated list of edge-connected neighbours for each vertex
pub fn vertex_neighbors(mesh: &Mesh) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); mesh.vertex_count()];

    for face in &mesh.faces {
        for (a, b) in face.edges() {
            if a != b {
                neighbors[a].push(b);
                neighbors[b].push(a);
            }
        }
    }

    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }
    neighbors
}

/// For each face, the faces sharing an edge with it and the shared edge
pub fn face_adjacency(mesh: &Mesh) -> Vec<Vec<(usize, Edge)>> {
    let mut edge_faces: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        for (a, b) in face.edges() {
            edge_faces.entry(Edge::new(a, b)).or_default().push(face_idx);
        }
    }

    let mut adjacency: Vec<Vec<(usize, Edge)>> = vec![Vec::new(); mesh.face_count()];
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        for (a, b) in face.edges() {
            let edge = Edge::new(a, b);
            if let Some(others) = edge_faces.get(&edge) {
                for &other in others {
                    if other != face_idx {
                        adjacency[face_idx].push((other, edge));
                    }
                }
            }
        }
    }
    adjacency
}

/// Whether the face walks the edge from `edge.v0` to `edge.v1`
pub fn traverses_forward(face: &super::Face, edge: Edge) -> bool {
    face.edges().any(|(a, b)| a == edge.v0 && b == edge.v1)
}

/// Mesh validation report
#[derive(Debug, Clone)]
pub struct MeshValidation {
    pub is_manifold: bool,
    pub is_closed: bool,
    pub edge_count: usize,
    pub boundary_edge_count: usize,
    pub loose_vertex_count: usize,
}

pub fn validate_mesh(mesh: &Mesh) -> MeshValidation {
    let edge_counts = build_edge_counts(mesh);

    let boundary_edges = edge_counts
        .values()
        .filter(|&&count| count == 1)
        .count();

    let mut used = vec![false; mesh.vertex_count()];
    for face in &mesh.faces {
        for &i in &face.indices {
            if let Some(slot) = used.get_mut(i) {
                *slot = true;
            }
        }
    }

    MeshValidation {
        is_manifold: edge_counts.values().all(|&count| count <= 2),
        is_closed: !edge_counts.is_empty() && edge_counts.values().all(|&count| count == 2),
        edge_count: edge_counts.len(),
        boundary_edge_count: boundary_edges,
        loose_vertex_count: used.iter().filter(|&&u| !u).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_cylinder_is_closed() {
        let mesh = Primitive::cylinder(1.0, 2.0, 32).to_mesh();
        assert!(is_manifold(&mesh), "Cylinder should be manifold");
        assert!(is_closed(&mesh), "Cylinder should be closed");
        assert!(boundary_edges(&mesh).is_empty());
    }

    #[test]
    fn test_plane_boundary() {
        let mesh = Primitive::plane(2.0, 3, 3).to_mesh();
        let validation = validate_mesh(&mesh);

        assert!(validation.is_manifold);
        assert!(!validation.is_closed);
        assert_eq!(validation.boundary_edge_count, 12);
        assert_eq!(boundary_edges(&mesh).len(), 12);
        assert_eq!(validation.loose_vertex_count, 0);
    }

    #[test]
    fn test_grid_neighbors() {
        let mesh = Primitive::plane(2.0, 2, 2).to_mesh();
        let neighbors = vertex_neighbors(&mesh);

        // Corner, edge-midpoint and centre of a 3x3 vertex grid
        assert_eq!(neighbors[0].len(), 2);
        assert_eq!(neighbors[1].len(), 3);
        assert_eq!(neighbors[4].len(), 4);
    }

    #[test]
    fn test_icosphere_face_adjacency() {
        let mesh = Primitive::icosphere(1.0, 0).to_mesh();
        let adjacency = face_adjacency(&mesh);
        assert!(adjacency.iter().all(|adj| adj.len() == 3));
    }
}
