// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run manifest: what each pass did and a fingerprint of the result

use super::PassDetail;
use crate::error::SculptResult;
use crate::geometry::{BoundingBox, Mesh};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// One executed pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassRecord {
    pub name: String,
    pub params: serde_json::Value,
    pub vertices_before: usize,
    pub vertices_after: usize,
    pub faces_after: usize,
    pub elapsed_ms: f64,
    #[serde(default, skip_serializing_if = "PassDetail::is_none")]
    pub detail: PassDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub passes: Vec<PassRecord>,
    pub vertex_count: usize,
    pub face_count: usize,
    /// Absent for an empty mesh
    pub bbox: Option<BoundingBox>,
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Manifest {
    pub fn new(passes: Vec<PassRecord>, mesh: &Mesh) -> Self {
        let bbox = mesh.bounding_box();
        Self {
            recipe: None,
            seed: None,
            passes,
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            bbox: (!bbox.is_empty()).then_some(bbox),
            fingerprint: fingerprint(mesh),
            warnings: Vec::new(),
        }
    }

    /// Re-derive counts, bounds and fingerprint after the mesh changed outside the pipeline
    pub fn refresh(&mut self, mesh: &Mesh) {
        let bbox = mesh.bounding_box();
        self.vertex_count = mesh.vertex_count();
        self.face_count = mesh.face_count();
        self.bbox = (!bbox.is_empty()).then_some(bbox);
        self.fingerprint = fingerprint(mesh);
    }

    pub fn total_elapsed_ms(&self) -> f64 {
        self.passes.iter().map(|p| p.elapsed_ms).sum()
    }

    pub fn to_json(&self) -> SculptResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| std::io::Error::other(e).into())
    }

    pub fn write(&self, path: &Path) -> SculptResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// SHA-256 over vertex positions and face indices, hex encoded.
///
/// Positions are hashed by their exact bit patterns, so any change in the
/// last place shows up.
pub fn fingerprint(mesh: &Mesh) -> String {
    let mut hasher = Sha256::new();
    hasher.update((mesh.vertex_count() as u64).to_le_bytes());
    for vertex in &mesh.vertices {
        for c in vertex.position.iter() {
            hasher.update(c.to_bits().to_le_bytes());
        }
    }
    hasher.update((mesh.face_count() as u64).to_le_bytes());
    for face in &mesh.faces {
        hasher.update((face.len() as u64).to_le_bytes());
        for &i in &face.indices {
            hasher.update((i as u64).to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}
