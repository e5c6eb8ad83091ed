// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ordered execution of sculpt passes

use super::{AssetStore, Manifest, MeshPass, PassRecord, SculptPass};
use crate::error::{SculptError, SculptResult};
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

fn default_min_vertices() -> usize {
    1
}

/// A list of passes applied in order to one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub passes: Vec<SculptPass>,
    /// Any pass leaving fewer vertices than this aborts the run
    #[serde(default = "default_min_vertices")]
    pub min_vertices: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Final mesh plus the record of how it was made
#[derive(Debug, Clone)]
pub struct SculptOutput {
    pub mesh: Mesh,
    pub manifest: Manifest,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            min_vertices: default_min_vertices(),
            recipe: None,
            seed: None,
        }
    }

    pub fn with_pass(mut self, pass: impl Into<SculptPass>) -> Self {
        self.passes.push(pass.into());
        self
    }

    pub fn push(&mut self, pass: impl Into<SculptPass>) {
        self.passes.push(pass.into());
    }

    pub fn with_min_vertices(mut self, min_vertices: usize) -> Self {
        self.min_vertices = min_vertices;
        self
    }

    /// Label the manifest with the recipe and seed that produced this pipeline
    pub fn with_provenance(mut self, recipe: impl Into<String>, seed: u64) -> Self {
        self.recipe = Some(recipe.into());
        self.seed = Some(seed);
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order, stopping at the first failure
    pub fn run(&self, mesh: Mesh, assets: &mut AssetStore) -> SculptResult<SculptOutput> {
        let mut records = Vec::with_capacity(self.passes.len());
        self.run_recorded(mesh, assets, &mut records)
    }

    /// Same as [`run`](Self::run), but the records of completed passes stay in
    /// `records` when the run stops early. A pass that leaves too few vertices
    /// is recorded before the run aborts; a pass that fails is not.
    pub fn run_recorded(
        &self,
        mut mesh: Mesh,
        assets: &mut AssetStore,
        records: &mut Vec<PassRecord>,
    ) -> SculptResult<SculptOutput> {
        records.clear();
        mesh.validate()?;

        for pass in &self.passes {
            let vertices_before = mesh.vertex_count();
            let start = Instant::now();

            let detail = pass.apply(&mut mesh, assets)?;

            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            mesh.validate()?;
            debug!(
                pass = pass.name(),
                vertices_before,
                vertices_after = mesh.vertex_count(),
                faces = mesh.face_count(),
                elapsed_ms,
                "pass complete"
            );

            records.push(PassRecord {
                name: pass.name().to_string(),
                params: pass.params(),
                vertices_before,
                vertices_after: mesh.vertex_count(),
                faces_after: mesh.face_count(),
                elapsed_ms,
                detail,
            });

            if mesh.vertex_count() < self.min_vertices {
                return Err(SculptError::EmptyMeshResult {
                    pass: pass.name().to_string(),
                    remaining_vertices: mesh.vertex_count(),
                    min_vertices: self.min_vertices,
                });
            }
        }

        let mut manifest = Manifest::new(std::mem::take(records), &mesh);
        manifest.recipe = self.recipe.clone();
        manifest.seed = self.seed;
        info!(
            passes = manifest.passes.len(),
            vertices = manifest.vertex_count,
            faces = manifest.face_count,
            "sculpt finished"
        );

        Ok(SculptOutput { mesh, manifest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::sculpt::{Axis, HeightMap, ImageDisplace, PassDetail, Smooth, ThresholdCarve};

    #[test]
    fn test_empty_pipeline_returns_input() {
        let mesh = Primitive::icosphere(1.0, 1).to_mesh();
        let output = Pipeline::new().run(mesh.clone(), &mut AssetStore::new()).unwrap();
        assert_eq!(output.mesh, mesh);
        assert!(output.manifest.passes.is_empty());
        assert_eq!(output.manifest.vertex_count, 42);
    }

    #[test]
    fn test_records_each_pass() {
        let pipeline = Pipeline::new()
            .with_pass(Smooth::new(0.5, 2))
            .with_pass(ThresholdCarve::new(Axis::Z, -0.5))
            .with_provenance("test", 7);

        let mesh = Primitive::icosphere(1.0, 1).to_mesh();
        let output = pipeline.run(mesh, &mut AssetStore::new()).unwrap();
        let manifest = &output.manifest;

        assert_eq!(manifest.recipe.as_deref(), Some("test"));
        assert_eq!(manifest.seed, Some(7));
        assert_eq!(manifest.passes.len(), 2);
        assert_eq!(manifest.passes[0].name, "smooth");
        assert_eq!(manifest.passes[1].vertices_before, 42);
        assert!(matches!(manifest.passes[1].detail, PassDetail::Carve(_)));
        assert_eq!(manifest.vertex_count, output.mesh.vertex_count());
    }

    #[test]
    fn test_empty_result_is_structured_error() {
        let pipeline = Pipeline::new()
            .with_pass(Smooth::new(0.5, 1))
            .with_pass(ThresholdCarve::new(Axis::Z, 10.0));
        let mesh = Primitive::plane(2.0, 4, 4).to_mesh();

        match pipeline.run(mesh, &mut AssetStore::new()) {
            Err(SculptError::EmptyMeshResult {
                pass,
                remaining_vertices,
                min_vertices,
            }) => {
                assert_eq!(pass, "threshold_carve");
                assert_eq!(remaining_vertices, 0);
                assert_eq!(min_vertices, 1);
            }
            other => panic!("expected EmptyMeshResult, got {:?}", other.map(|o| o.manifest)),
        }
    }

    #[test]
    fn test_stopped_run_keeps_completed_records() {
        let pipeline = Pipeline::new()
            .with_pass(Smooth::new(0.5, 1))
            .with_pass(ThresholdCarve::new(Axis::Z, 10.0))
            .with_pass(Smooth::new(0.5, 1));
        let mut records = Vec::new();

        let result = pipeline.run_recorded(
            Primitive::plane(2.0, 4, 4).to_mesh(),
            &mut AssetStore::new(),
            &mut records,
        );

        assert!(result.unwrap_err().is_empty_result());
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["smooth", "threshold_carve"]);
        assert_eq!(records[1].vertices_before, 25);
        assert_eq!(records[1].vertices_after, 0);
        match records[1].detail {
            PassDetail::Carve(report) => assert_eq!(report.marked, 25),
            PassDetail::None => panic!("carve pass recorded no report"),
        }
    }

    #[test]
    fn test_min_vertices_threshold() {
        let pipeline = Pipeline::new()
            .with_pass(ThresholdCarve::new(Axis::X, 0.5))
            .with_min_vertices(20);
        let mesh = Primitive::plane(2.0, 4, 4).to_mesh();
        let err = pipeline.run(mesh, &mut AssetStore::new()).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_missing_asset_fails_fast() {
        let pipeline = Pipeline::new()
            .with_pass(ImageDisplace::new("/no/such/logo.png", 0.5, 0.1))
            .with_pass(Smooth::new(0.5, 1));
        let mesh = Primitive::plane(2.0, 2, 2).to_mesh();
        let err = pipeline.run(mesh, &mut AssetStore::new()).unwrap_err();
        assert!(matches!(err, SculptError::AssetMissing { .. }));
    }

    #[test]
    fn test_registered_map_drives_displacement() {
        let mut assets = AssetStore::new();
        assets.insert_height_map("black.png", HeightMap::uniform(4, 4, 0.0).unwrap());
        let pipeline = Pipeline::new().with_pass(ImageDisplace::new("black.png", 0.5, 0.1));

        let output = pipeline
            .run(Primitive::plane(2.0, 2, 2).to_mesh(), &mut assets)
            .unwrap();
        assert!(output
            .mesh
            .vertices
            .iter()
            .all(|v| (v.position.z + 0.05).abs() < 1e-9));
    }
}
