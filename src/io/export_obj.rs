// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ exporter with optional MTL companion

use super::{ExportOptions, MaterialDesc};
use crate::geometry::Mesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export mesh to OBJ; a material in `options` also writes `<stem>.mtl` alongside
pub fn export(mesh: &Mesh, path: &Path, options: &ExportOptions) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create OBJ file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# sculptor {}", env!("CARGO_PKG_VERSION"))?;

    if let Some(material) = &options.material {
        let mtl_path = path.with_extension("mtl");
        write_mtl(material, &mtl_path)?;
        let mtl_name = mtl_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("MTL path has no file name")?;
        writeln!(out, "mtllib {}", mtl_name)?;
    }

    writeln!(out, "o {}", object_name(path))?;

    for vertex in &mesh.vertices {
        let p = vertex.position;
        writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    if let Some(uvs) = &mesh.uvs {
        for uv in uvs {
            writeln!(out, "vt {:.6} {:.6}", uv.x, uv.y)?;
        }
    }
    for vertex in &mesh.vertices {
        let n = vertex.normal;
        writeln!(out, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
    }

    if let Some(material) = &options.material {
        writeln!(out, "usemtl {}", material.name)?;
    }
    writeln!(out, "s 1")?;

    let has_uvs = mesh.has_uvs();
    for face in &mesh.faces {
        write!(out, "f")?;
        // OBJ indices are 1-based; UVs and normals share the vertex index
        for &i in &face.indices {
            let k = i + 1;
            if has_uvs {
                write!(out, " {}/{}/{}", k, k, k)?;
            } else {
                write!(out, " {}//{}", k, k)?;
            }
        }
        writeln!(out)?;
    }

    out.flush().context("Failed to flush OBJ file")?;
    Ok(())
}

fn write_mtl(material: &MaterialDesc, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create MTL file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let [r, g, b] = material.base_color;

    writeln!(out, "newmtl {}", material.name)?;
    writeln!(out, "Kd {:.6} {:.6} {:.6}", r, g, b)?;
    writeln!(out, "Ks 0.500000 0.500000 0.500000")?;
    writeln!(out, "Ns {:.6}", (1.0 - material.roughness).max(0.0) * 1000.0)?;
    writeln!(out, "illum 2")?;
    // PBR extension understood by most modern importers
    writeln!(out, "Pr {:.6}", material.roughness)?;
    writeln!(out, "Pm {:.6}", material.metallic)?;
    if let Some(texture) = &material.texture {
        writeln!(out, "map_Kd {}", texture.display())?;
    }

    out.flush().context("Failed to flush MTL file")?;
    Ok(())
}

fn object_name(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
}
