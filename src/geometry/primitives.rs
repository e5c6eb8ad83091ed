// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{subdivide, Face, Mesh, Vertex};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the ends of a cylinder are closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapFill {
    /// Centre vertex plus one triangle per segment; sides are split into triangle pairs
    #[default]
    TriangleFan,
    /// One polygon per cap; sides stay quads
    NGon,
    /// Open tube
    Nothing,
}

/// Base shapes a sculpting run starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Icosahedron refined `subdivisions` times and projected onto the sphere
    IcoSphere { radius: f64, subdivisions: u32 },
    /// Cylinder centred on the origin, axis along Z
    Cylinder {
        radius: f64,
        depth: f64,
        segments: u32,
        #[serde(default)]
        cap: CapFill,
    },
    /// Square grid in the XY plane facing +Z, with UVs spanning [0, 1]
    Plane {
        size: f64,
        x_segments: u32,
        y_segments: u32,
    },
}

impl Primitive {
    pub fn icosphere(radius: f64, subdivisions: u32) -> Self {
        Self::IcoSphere {
            radius,
            subdivisions,
        }
    }

    pub fn cylinder(radius: f64, depth: f64, segments: u32) -> Self {
        Self::cylinder_with_cap(radius, depth, segments, CapFill::TriangleFan)
    }

    pub fn cylinder_with_cap(radius: f64, depth: f64, segments: u32, cap: CapFill) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Cylinder {
            radius,
            depth,
            segments,
            cap,
        }
    }

    pub fn plane(size: f64, x_segments: u32, y_segments: u32) -> Self {
        Self::Plane {
            size,
            x_segments: x_segments.max(1),
            y_segments: y_segments.max(1),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::IcoSphere { .. } => "ico_sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Plane { .. } => "plane",
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::IcoSphere {
                radius,
                subdivisions,
            } => generate_icosphere_mesh(*radius, *subdivisions),
            Self::Cylinder {
                radius,
                depth,
                segments,
                cap,
            } => generate_cylinder_mesh(*radius, *depth, (*segments).max(3), *cap),
            Self::Plane {
                size,
                x_segments,
                y_segments,
            } => generate_plane_mesh(*size, (*x_segments).max(1), (*y_segments).max(1)),
        }
    }
}

fn generate_icosphere_mesh(radius: f64, subdivisions: u32) -> Mesh {
    let t = (1.0 + 5f64.sqrt()) / 2.0;

    let corners = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ];

    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    let mut mesh = Mesh::with_capacity(12, 20);
    for (x, y, z) in corners {
        let normal = Vector3::new(x, y, z).normalize();
        mesh.add_vertex(Vertex::new(Point3::from(normal * radius), normal));
    }
    for [a, b, c] in faces {
        mesh.add_face(Face::triangle(a, b, c));
    }

    for _ in 0..subdivisions {
        subdivide::subdivide_once(&mut mesh);
        project_to_sphere(&mut mesh, radius);
    }

    mesh
}

fn project_to_sphere(mesh: &mut Mesh, radius: f64) {
    for vertex in &mut mesh.vertices {
        let normal = vertex.position.coords.normalize();
        vertex.position = Point3::from(normal * radius);
        vertex.normal = normal;
    }
}

fn generate_cylinder_mesh(radius: f64, depth: f64, segments: u32, cap: CapFill) -> Mesh {
    let mut mesh = Mesh::new();
    let half = depth / 2.0;
    let segments = segments as usize;

    let centers = if cap == CapFill::TriangleFan {
        let bottom = mesh.add_vertex(Vertex::new(
            Point3::new(0.0, 0.0, -half),
            -Vector3::z(),
        ));
        let top = mesh.add_vertex(Vertex::new(Point3::new(0.0, 0.0, half), Vector3::z()));
        Some((bottom, top))
    } else {
        None
    };

    let mut bottom_indices = Vec::with_capacity(segments);
    let mut top_indices = Vec::with_capacity(segments);

    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        let radial = Vector3::new(cos, sin, 0.0);

        bottom_indices.push(mesh.add_vertex(Vertex::new(
            Point3::new(radius * cos, radius * sin, -half),
            radial,
        )));
        top_indices.push(mesh.add_vertex(Vertex::new(
            Point3::new(radius * cos, radius * sin, half),
            radial,
        )));
    }

    // Side faces, wound outward
    for i in 0..segments {
        let next = (i + 1) % segments;
        let bi = bottom_indices[i];
        let ti = top_indices[i];
        let bn = bottom_indices[next];
        let tn = top_indices[next];

        if cap == CapFill::TriangleFan {
            mesh.add_face(Face::triangle(bi, bn, ti));
            mesh.add_face(Face::triangle(ti, bn, tn));
        } else {
            mesh.add_face(Face::quad(bi, bn, tn, ti));
        }
    }

    match (cap, centers) {
        (CapFill::TriangleFan, Some((bottom_center, top_center))) => {
            for i in 0..segments {
                let next = (i + 1) % segments;
                mesh.add_face(Face::triangle(
                    bottom_center,
                    bottom_indices[next],
                    bottom_indices[i],
                ));
            }
            for i in 0..segments {
                let next = (i + 1) % segments;
                mesh.add_face(Face::triangle(top_center, top_indices[i], top_indices[next]));
            }
        }
        (CapFill::NGon, _) => {
            mesh.add_face(Face::new(bottom_indices.iter().rev().copied().collect()));
            mesh.add_face(Face::new(top_indices.clone()));
        }
        _ => {}
    }

    // Recompute normals to properly average at shared vertices
    mesh.recompute_normals();
    mesh
}

fn generate_plane_mesh(size: f64, x_segments: u32, y_segments: u32) -> Mesh {
    let nx = x_segments as usize;
    let ny = y_segments as usize;
    let mut mesh = Mesh::with_capacity((nx + 1) * (ny + 1), nx * ny);
    let half = size / 2.0;

    for j in 0..=ny {
        let v = j as f64 / ny as f64;
        for i in 0..=nx {
            let u = i as f64 / nx as f64;
            mesh.add_vertex_with_uv(
                Vertex::new(
                    Point3::new(-half + u * size, -half + v * size, 0.0),
                    Vector3::z(),
                ),
                Point2::new(u, v),
            );
        }
    }

    let index = |i: usize, j: usize| j * (nx + 1) + i;
    for j in 0..ny {
        for i in 0..nx {
            mesh.add_face(Face::quad(
                index(i, j),
                index(i + 1, j),
                index(i + 1, j + 1),
                index(i, j + 1),
            ));
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mesh_utils::{is_closed, is_manifold};

    #[test]
    fn test_icosphere_vertex_counts() {
        assert_eq!(Primitive::icosphere(1.0, 0).to_mesh().vertex_count(), 12);
        assert_eq!(Primitive::icosphere(1.0, 1).to_mesh().vertex_count(), 42);
        assert_eq!(Primitive::icosphere(1.0, 2).to_mesh().vertex_count(), 162);
    }

    #[test]
    fn test_icosphere_is_closed_and_outward() {
        let mesh = Primitive::icosphere(2.0, 2).to_mesh();
        assert!(is_manifold(&mesh));
        assert!(is_closed(&mesh));
        assert!(mesh.signed_volume() > 0.0);
        for vertex in &mesh.vertices {
            assert!((vertex.position.coords.norm() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cylinder_fan_counts() {
        let mesh = Primitive::cylinder(1.0, 0.1, 64).to_mesh();
        assert_eq!(mesh.vertex_count(), 2 * 64 + 2);
        assert_eq!(mesh.face_count(), 64 * 2 + 64 * 2);
        assert!(is_manifold(&mesh), "Cylinder mesh should be manifold");
        assert!(is_closed(&mesh), "Cylinder mesh should be closed");
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_cylinder_ngon_counts() {
        let mesh = Primitive::cylinder_with_cap(1.0, 0.15, 64, CapFill::NGon).to_mesh();
        assert_eq!(mesh.vertex_count(), 128);
        assert_eq!(mesh.face_count(), 66);
        assert!(is_closed(&mesh));
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_open_cylinder_has_boundary() {
        let mesh = Primitive::cylinder_with_cap(1.0, 1.0, 16, CapFill::Nothing).to_mesh();
        assert_eq!(mesh.face_count(), 16);
        assert!(!is_closed(&mesh));
    }

    #[test]
    fn test_plane_grid() {
        let mesh = Primitive::plane(2.0, 10, 10).to_mesh();
        assert_eq!(mesh.vertex_count(), 121);
        assert_eq!(mesh.face_count(), 100);

        let uvs = mesh.uvs.as_ref().unwrap();
        assert_eq!(uvs[0], Point2::new(0.0, 0.0));
        assert_eq!(uvs[120], Point2::new(1.0, 1.0));
        assert!(mesh.vertices.iter().all(|v| v.normal == Vector3::z()));

        let bbox = mesh.bounding_box();
        assert!((bbox.min.x + 1.0).abs() < 1e-12);
        assert!((bbox.max.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segments_fall_back() {
        match Primitive::cylinder(1.0, 1.0, 2) {
            Primitive::Cylinder { segments, .. } => assert_eq!(segments, 32),
            _ => unreachable!(),
        }
    }
}
