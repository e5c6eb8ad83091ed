// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Linear midpoint subdivision
//!
//! Triangles are split into four by their edge midpoints. Polygons with four or
//! more corners become one quad per corner around the face centroid. Shared edges
//! get a single midpoint vertex so the result stays watertight. Positions, normals
//! and UVs are interpolated linearly; the surface shape does not change.

use super::{mesh_utils::Edge, Face, Mesh, Vertex};
use nalgebra::{Point2, Point3, Vector3};
use std::collections::HashMap;

/// Subdivide every face `iterations` times
pub fn subdivide(mesh: &mut Mesh, iterations: u32) {
    for _ in 0..iterations {
        subdivide_once(mesh);
    }
}

/// Perform a single subdivision pass
pub fn subdivide_once(mesh: &mut Mesh) {
    let mut edge_midpoints: HashMap<Edge, usize> = HashMap::new();
    let old_faces = std::mem::take(&mut mesh.faces);
    let mut new_faces = Vec::with_capacity(old_faces.len() * 4);

    for face in &old_faces {
        let n = face.len();
        let mids: Vec<usize> = face
            .edges()
            .map(|(a, b)| midpoint(mesh, &mut edge_midpoints, a, b))
            .collect();

        if n == 3 {
            let [v0, v1, v2] = [face.indices[0], face.indices[1], face.indices[2]];
            let [m01, m12, m20] = [mids[0], mids[1], mids[2]];
            new_faces.push(Face::triangle(v0, m01, m20));
            new_faces.push(Face::triangle(m01, v1, m12));
            new_faces.push(Face::triangle(m20, m12, v2));
            new_faces.push(Face::triangle(m01, m12, m20));
        } else {
            let center = centroid(mesh, &face.indices);
            for k in 0..n {
                let prev = mids[(k + n - 1) % n];
                new_faces.push(Face::quad(face.indices[k], mids[k], center, prev));
            }
        }
    }

    mesh.faces = new_faces;
}

/// Get or create midpoint vertex for an edge
fn midpoint(mesh: &mut Mesh, cache: &mut HashMap<Edge, usize>, a: usize, b: usize) -> usize {
    let edge = Edge::new(a, b);
    if let Some(&idx) = cache.get(&edge) {
        return idx;
    }
    let idx = blend(mesh, &[edge.v0, edge.v1]);
    cache.insert(edge, idx);
    idx
}

fn centroid(mesh: &mut Mesh, indices: &[usize]) -> usize {
    blend(mesh, indices)
}

/// Append a vertex averaging the given vertices (position, normal and UV)
fn blend(mesh: &mut Mesh, indices: &[usize]) -> usize {
    let weight = 1.0 / indices.len() as f64;

    let mut position = Vector3::zeros();
    let mut normal = Vector3::zeros();
    for &i in indices {
        position += mesh.vertices[i].position.coords;
        normal += mesh.vertices[i].normal;
    }
    let normal = if normal.norm() > 1e-12 {
        normal.normalize()
    } else {
        mesh.vertices[indices[0]].normal
    };

    let uv = mesh.uvs.as_ref().map(|uvs| {
        let (u, v) = indices
            .iter()
            .fold((0.0, 0.0), |(u, v), &i| (u + uvs[i].x, v + uvs[i].y));
        Point2::new(u * weight, v * weight)
    });

    let vertex = Vertex::new(Point3::from(position * weight), normal);
    match uv {
        Some(uv) => mesh.add_vertex_with_uv(vertex, uv),
        None => mesh.add_vertex(vertex),
    }
}
