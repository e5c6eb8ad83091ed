// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Threshold carving: strip low geometry to leave raised relief

use super::{AssetStore, MeshPass, PassDetail};
use crate::error::SculptResult;
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Global axis a carve reads vertex heights from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// What a carve removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CarveReport {
    pub marked: usize,
    pub faces_removed: usize,
    pub loose_removed: usize,
    pub remaining_vertices: usize,
    pub remaining_faces: usize,
}

impl CarveReport {
    pub fn is_empty_result(&self) -> bool {
        self.remaining_vertices == 0
    }
}

/// Remove every vertex whose axis value is strictly below `threshold`,
/// every face touching one, and any vertex left without faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCarve {
    #[serde(default)]
    pub axis: Axis,
    pub threshold: f64,
}

impl ThresholdCarve {
    pub fn new(axis: Axis, threshold: f64) -> Self {
        Self { axis, threshold }
    }

    /// Selection mask of vertices below the threshold
    pub fn select(&self, mesh: &Mesh) -> Vec<bool> {
        let axis = self.axis.index();
        mesh.vertices
            .iter()
            .map(|v| v.position[axis] < self.threshold)
            .collect()
    }

    pub fn carve(&self, mesh: &mut Mesh) -> CarveReport {
        let selection = self.select(mesh);
        let marked = selection.iter().filter(|&&s| s).count();

        let (_, faces_removed) = mesh.delete_vertices(&selection);
        // Faces surviving the first stage may still leave vertices orphaned
        let loose_removed = mesh.delete_loose();

        let report = CarveReport {
            marked,
            faces_removed,
            loose_removed,
            remaining_vertices: mesh.vertex_count(),
            remaining_faces: mesh.face_count(),
        };
        debug!(?report, threshold = self.threshold, "threshold carve");
        report
    }
}

impl MeshPass for ThresholdCarve {
    fn name(&self) -> &'static str {
        "threshold_carve"
    }

    fn apply(&self, mesh: &mut Mesh, _assets: &mut AssetStore) -> SculptResult<PassDetail> {
        Ok(PassDetail::Carve(self.carve(mesh)))
    }
}
