// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL exporter

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Export mesh to binary STL; polygons are fan-triangulated
pub fn export(mesh: &Mesh, path: &Path) -> Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .faces
        .iter()
        .flat_map(|face| face.triangles())
        .map(|[a, b, c]| {
            let v0 = mesh.vertices[a].position;
            let v1 = mesh.vertices[b].position;
            let v2 = mesh.vertices[c].position;

            // Facet normal from the winding; zero for degenerate triangles
            let normal = (v1 - v0).cross(&(v2 - v0));
            let normal = normal.try_normalize(1e-12).unwrap_or(normal);

            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    StlVertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
                    StlVertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
                    StlVertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
                ],
            }
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    stl_io::write_stl(&mut out, triangles.iter()).context("Failed to write STL file")?;
    out.flush()?;

    Ok(())
}
