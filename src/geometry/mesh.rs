// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::{SculptError, SculptResult};
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        // Transform normal (use inverse transpose for normals)
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        let normal = normal_matrix.transform_vector(&self.normal);
        if normal.norm() > 1e-12 {
            self.normal = normal.normalize();
        }
    }
}

/// Polygon defined by three or more vertex indices, counter-clockwise when seen from outside
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self::new(vec![a, b, c])
    }

    pub fn quad(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self::new(vec![a, b, c, d])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Directed edges in winding order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }

    /// Fan triangulation of the polygon
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let first = self.indices[0];
        self.indices
            .windows(2)
            .skip(1)
            .map(move |w| [first, w[0], w[1]])
    }

    pub fn flip(&mut self) {
        self.indices.reverse();
    }
}

/// Polygonal mesh with optional per-vertex UV coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub uvs: Option<Vec<Point2<f64>>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            uvs: None,
        }
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            uvs: None,
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a vertex together with its UV coordinate
    pub fn add_vertex_with_uv(&mut self, vertex: Vertex, uv: Point2<f64>) -> usize {
        let index = self.add_vertex(vertex);
        self.uvs.get_or_insert_with(Vec::new).push(uv);
        index
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles after fan triangulation
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Translate all vertices
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.transform(&Matrix4::new_translation(&offset));
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Merge with another mesh (simple join without CSG)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();

        // Keep the UV layer aligned with vertices: pad whichever side lacks one
        if let Some(other_uvs) = &other.uvs {
            self.uvs
                .get_or_insert_with(|| vec![Point2::origin(); offset])
                .extend_from_slice(other_uvs);
        } else if let Some(uvs) = &mut self.uvs {
            uvs.extend(std::iter::repeat(Point2::origin()).take(other.vertices.len()));
        }

        self.vertices.extend_from_slice(&other.vertices);
        for face in &other.faces {
            self.faces.push(Face::new(
                face.indices.iter().map(|&i| i + offset).collect(),
            ));
        }
    }

    /// Check index bounds, face arity and layer lengths
    pub fn validate(&self) -> SculptResult<()> {
        let count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(SculptError::InvalidMesh(format!(
                    "face {} has {} indices",
                    face_idx,
                    face.len()
                )));
            }
            if let Some(&bad) = face.indices.iter().find(|&&i| i >= count) {
                return Err(SculptError::InvalidMesh(format!(
                    "face {} references vertex {} of {}",
                    face_idx, bad, count
                )));
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != count {
                return Err(SculptError::InvalidMesh(format!(
                    "{} UVs for {} vertices",
                    uvs.len(),
                    count
                )));
            }
        }
        Ok(())
    }

    /// Delete the selected vertices and every face touching one of them.
    /// Returns `(vertices_removed, faces_removed)`.
    pub fn delete_vertices(&mut self, selection: &[bool]) -> (usize, usize) {
        debug_assert_eq!(selection.len(), self.vertices.len());

        let faces_before = self.faces.len();
        self.faces
            .retain(|face| !face.indices.iter().any(|&i| selection[i]));
        let faces_removed = faces_before - self.faces.len();

        let keep: Vec<bool> = selection.iter().map(|&s| !s).collect();
        let vertices_removed = self.compact(&keep);
        (vertices_removed, faces_removed)
    }

    /// Remove loose vertices (vertices not referenced by any face)
    /// Returns the number of vertices removed
    pub fn delete_loose(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for &i in &face.indices {
                used[i] = true;
            }
        }
        self.compact(&used)
    }

    /// Drop vertices whose `keep` flag is false and remap face indices
    fn compact(&mut self, keep: &[bool]) -> usize {
        let mut new_indices = vec![usize::MAX; self.vertices.len()];
        let mut new_vertices = Vec::with_capacity(self.vertices.len());
        let mut new_uvs = self.uvs.as_ref().map(|uvs| Vec::with_capacity(uvs.len()));

        for (old_idx, &kept) in keep.iter().enumerate() {
            if kept {
                new_indices[old_idx] = new_vertices.len();
                new_vertices.push(self.vertices[old_idx]);
                if let (Some(dst), Some(src)) = (new_uvs.as_mut(), self.uvs.as_ref()) {
                    dst.push(src[old_idx]);
                }
            }
        }

        for face in &mut self.faces {
            for index in &mut face.indices {
                *index = new_indices[*index];
            }
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        self.uvs = new_uvs;
        removed
    }

    /// Newell normal of a face, scaled by twice its area
    pub fn face_area_normal(&self, face: &Face) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for (a, b) in face.edges() {
            let p = &self.vertices[a].position;
            let q = &self.vertices[b].position;
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal
    }

    /// Recompute vertex normals from face geometry
    /// Face normals are accumulated weighted by face area
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.faces.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for face in &self.faces {
            let area_normal = self.face_area_normal(face);
            if area_normal.norm() > 1e-12 {
                for &idx in &face.indices {
                    normal_sums[idx] += area_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            // Degenerate neighbourhoods keep their previous normal
            if sum.norm() > 1e-12 {
                vertex.normal = sum.normalize();
            }
        }
    }

    /// Signed volume enclosed by the faces (positive when wound outward)
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .flat_map(|face| face.triangles())
            .map(|[a, b, c]| {
                let p0 = self.vertices[a].position.coords;
                let p1 = self.vertices[b].position.coords;
                let p2 = self.vertices[c].position.coords;
                p0.dot(&p1.cross(&p2)) / 6.0
            })
            .sum()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
