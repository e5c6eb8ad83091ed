// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Format dispatch and export fallback

use super::{export_gltf, export_obj, export_stl};
use crate::error::{SculptError, SculptResult};
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Interchange formats the exporter can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Obj,
    Glb,
    Gltf,
    Stl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Obj => "obj",
            ExportFormat::Glb => "glb",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Stl => "stl",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "obj" => Ok(ExportFormat::Obj),
            "glb" => Ok(ExportFormat::Glb),
            "gltf" => Ok(ExportFormat::Gltf),
            "stl" => Ok(ExportFormat::Stl),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Surface description carried into formats that support materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    /// Linear RGB
    pub base_color: [f64; 3],
    pub metallic: f64,
    pub roughness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<PathBuf>,
}

impl MaterialDesc {
    pub fn new(name: impl Into<String>, base_color: [f64; 3], metallic: f64, roughness: f64) -> Self {
        Self {
            name: name.into(),
            base_color,
            metallic,
            roughness,
            texture: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default)]
    pub material: Option<MaterialDesc>,
}

impl ExportOptions {
    pub fn with_material(material: MaterialDesc) -> Self {
        Self {
            material: Some(material),
        }
    }
}

/// Write `mesh` to `path` in `format`, returning the path written
pub fn export(
    mesh: &Mesh,
    path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> SculptResult<PathBuf> {
    let fail = |reason: String| SculptError::Export {
        format: format.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    check_exportable(mesh).map_err(fail)?;

    let result = match format {
        ExportFormat::Obj => export_obj::export(mesh, path, options),
        ExportFormat::Glb => export_gltf::export_glb(mesh, path, options),
        ExportFormat::Gltf => export_gltf::export_gltf(mesh, path, options),
        ExportFormat::Stl => export_stl::export(mesh, path),
    };
    if let Err(e) = result {
        discard_partial(path, format);
        return Err(fail(format!("{:#}", e)));
    }

    info!(path = %path.display(), %format, vertices = mesh.vertex_count(), "exported mesh");
    Ok(path.to_path_buf())
}

/// Export to `dir/stem.<primary>`; on failure retry once as `dir/stem.<fallback>`
pub fn export_with_fallback(
    mesh: &Mesh,
    dir: &Path,
    stem: &str,
    primary: ExportFormat,
    fallback: Option<ExportFormat>,
    options: &ExportOptions,
) -> SculptResult<PathBuf> {
    let primary_path = dir.join(format!("{}.{}", stem, primary.extension()));
    match export(mesh, &primary_path, primary, options) {
        Ok(path) => Ok(path),
        Err(err) => match fallback {
            Some(fallback) if fallback != primary => {
                warn!(error = %err, %fallback, "primary export failed, retrying");
                let fallback_path = dir.join(format!("{}.{}", stem, fallback.extension()));
                export(mesh, &fallback_path, fallback, options)
            }
            _ => Err(err),
        },
    }
}

/// Remove whatever a failed export left behind: the target and its sidecar
fn discard_partial(path: &Path, format: ExportFormat) {
    let sidecar = match format {
        ExportFormat::Obj => Some(path.with_extension("mtl")),
        ExportFormat::Gltf => Some(path.with_extension("bin")),
        ExportFormat::Glb | ExportFormat::Stl => None,
    };
    for leftover in std::iter::once(path.to_path_buf()).chain(sidecar) {
        if leftover.is_file() {
            match fs::remove_file(&leftover) {
                Ok(()) => debug!(path = %leftover.display(), "removed partial export"),
                Err(e) => {
                    warn!(path = %leftover.display(), error = %e, "could not remove partial export")
                }
            }
        }
    }
}

fn check_exportable(mesh: &Mesh) -> Result<(), String> {
    if mesh.vertices.is_empty() || mesh.faces.is_empty() {
        return Err("mesh has no geometry".into());
    }
    let finite = mesh.vertices.iter().all(|v| {
        v.position.iter().all(|c| c.is_finite()) && v.normal.iter().all(|c| c.is_finite())
    });
    if !finite {
        return Err("mesh contains non-finite coordinates".into());
    }
    mesh.validate().map_err(|e| e.to_string())
}
