// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch generation: many seeded assets of one recipe, each exported with its manifest

use crate::error::SculptError;
use crate::io::{export_with_fallback, ExportFormat};
use crate::recipes::{asset_seed, Recipe, RecipeInputs};
use crate::sculpt::AssetStore;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs))
}

/// What to generate and where
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub recipe: Recipe,
    pub count: usize,
    pub seed: u64,
    pub output_dir: PathBuf,
    /// Overrides the recipe's preferred format
    pub format: Option<ExportFormat>,
    /// Overrides the recipe's fallback format
    pub fallback: Option<ExportFormat>,
    pub min_vertices: usize,
    pub inputs: RecipeInputs,
    pub show_progress: bool,
}

impl BatchOptions {
    pub fn new(recipe: Recipe, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            recipe,
            count: 1,
            seed: 0,
            output_dir: output_dir.into(),
            format: None,
            fallback: None,
            min_vertices: 1,
            inputs: RecipeInputs::default(),
            show_progress: false,
        }
    }
}

/// Result for a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    Exported {
        path: PathBuf,
        manifest: PathBuf,
        vertices: usize,
        faces: usize,
        /// The primary format failed and the fallback was written
        fell_back: bool,
    },
    /// Carving removed the geometry; nothing was exported
    Empty {
        pass: String,
        remaining_vertices: usize,
    },
    Failed {
        kind: String,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetReport {
    pub index: usize,
    pub seed: u64,
    pub outcome: AssetOutcome,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub timestamp: String,
    pub recipe: Recipe,
    pub base_seed: u64,
    pub assets: Vec<AssetReport>,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub total_duration: Duration,
}

impl BatchReport {
    fn new(recipe: Recipe, base_seed: u64) -> Self {
        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            recipe,
            base_seed,
            assets: Vec::new(),
            total_duration: Duration::ZERO,
        }
    }

    pub fn exported(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Exported { .. }))
    }

    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Empty { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&AssetOutcome) -> bool) -> usize {
        self.assets.iter().filter(|a| pred(&a.outcome)).count()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Runs assets one after another; a failed asset does not stop the batch
pub struct BatchRunner {
    options: BatchOptions,
    assets: AssetStore,
}

impl BatchRunner {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            assets: AssetStore::new(),
        }
    }

    /// Use a pre-populated asset store (embedded or synthetic height maps)
    pub fn with_assets(options: BatchOptions, assets: AssetStore) -> Self {
        Self { options, assets }
    }

    pub fn run(&mut self) -> anyhow::Result<BatchReport> {
        let options = self.options.clone();
        fs::create_dir_all(&options.output_dir)?;

        let start = Instant::now();
        let mut report = BatchReport::new(options.recipe, options.seed);

        let pb = if options.show_progress {
            let p = ProgressBar::new(options.count as u64);
            p.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                    .progress_chars("#>-"),
            );
            Some(p)
        } else {
            None
        };

        for index in 0..options.count {
            let asset_start = Instant::now();
            let seed = asset_seed(options.seed, index);
            let outcome = self.generate_one(index, seed);

            match &outcome {
                AssetOutcome::Exported { path, .. } => {
                    info!(index, seed, path = %path.display(), "asset exported")
                }
                AssetOutcome::Empty { pass, .. } => {
                    warn!(index, seed, %pass, "asset carved to nothing, skipped")
                }
                AssetOutcome::Failed { error, .. } => error!(index, seed, %error, "asset failed"),
            }

            report.assets.push(AssetReport {
                index,
                seed,
                outcome,
                duration: asset_start.elapsed(),
            });
            if let Some(ref p) = pb {
                p.inc(1);
            }
        }

        if let Some(p) = pb {
            p.finish_and_clear();
        }
        report.total_duration = start.elapsed();
        Ok(report)
    }

    fn generate_one(&mut self, index: usize, seed: u64) -> AssetOutcome {
        let options = &self.options;
        let mut plan = options.recipe.plan(seed, &options.inputs);
        plan.pipeline.min_vertices = options.min_vertices;

        let output = match plan.build(&mut self.assets) {
            Ok(output) => output,
            Err(SculptError::EmptyMeshResult {
                pass,
                remaining_vertices,
                ..
            }) => {
                return AssetOutcome::Empty {
                    pass,
                    remaining_vertices,
                }
            }
            Err(err) => return failed(&err),
        };

        // With `min_vertices` at 0 an emptied mesh gets through the pipeline
        if output.mesh.vertex_count() == 0 {
            let pass = output
                .manifest
                .passes
                .iter()
                .find(|record| record.vertices_after == 0)
                .map_or_else(|| plan.base.name().to_string(), |record| record.name.clone());
            return AssetOutcome::Empty {
                pass,
                remaining_vertices: 0,
            };
        }

        let stem = format!("{}_{}", options.recipe.name(), index);
        let primary = options.format.unwrap_or(plan.format);
        let fallback = options.fallback.or(plan.fallback);

        let path = match export_with_fallback(
            &output.mesh,
            &options.output_dir,
            &stem,
            primary,
            fallback,
            &plan.export_options(),
        ) {
            Ok(path) => path,
            Err(err) => return failed(&err),
        };

        let manifest_path = options.output_dir.join(format!("{}.manifest.json", stem));
        if let Err(err) = output.manifest.write(&manifest_path) {
            return failed(&err);
        }

        AssetOutcome::Exported {
            fell_back: ExportFormat::from_path(&path) != Some(primary),
            path,
            manifest: manifest_path,
            vertices: output.mesh.vertex_count(),
            faces: output.mesh.face_count(),
        }
    }
}

fn failed(err: &SculptError) -> AssetOutcome {
    AssetOutcome::Failed {
        kind: err.kind().to_string(),
        error: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sculpt::HeightMap;
    use tempfile::TempDir;

    #[test]
    fn test_batch_names_outputs_by_index() {
        let dir = TempDir::new().unwrap();
        let mut options = BatchOptions::new(Recipe::SimpleAsteroid, dir.path());
        options.count = 3;
        options.seed = 10;

        let report = BatchRunner::new(options).run().unwrap();
        assert_eq!(report.exported(), 3);
        assert!(!report.has_failures());
        for i in 0..3 {
            assert!(dir.path().join(format!("simple_asteroid_{}.obj", i)).is_file());
            assert!(dir
                .path()
                .join(format!("simple_asteroid_{}.manifest.json", i))
                .is_file());
        }
        assert_eq!(report.assets[2].seed, 12);
    }

    #[test]
    fn test_missing_height_map_fails_each_asset_but_batch_completes() {
        let dir = TempDir::new().unwrap();
        let mut options = BatchOptions::new(Recipe::ReliefCoin, dir.path());
        options.count = 2;
        options.inputs.height_map = PathBuf::from("/missing/logo.png");

        let report = BatchRunner::new(options).run().unwrap();
        assert_eq!(report.failed(), 2);
        assert!(report.has_failures());
        match &report.assets[0].outcome {
            AssetOutcome::Failed { kind, .. } => assert_eq!(kind, "asset_missing"),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_dark_map_reports_empty_asset() {
        let dir = TempDir::new().unwrap();
        let mut options = BatchOptions::new(Recipe::CleanCoin, dir.path());
        options.inputs.height_map = PathBuf::from("dark.png");
        let mut assets = AssetStore::new();
        assets.insert_height_map("dark.png", HeightMap::uniform(4, 4, 0.0).unwrap());

        let report = BatchRunner::with_assets(options, assets).run().unwrap();
        assert_eq!(report.empty(), 1);
        assert!(!report.has_failures());
        assert!(!dir.path().join("clean_coin_0.obj").exists());
    }

    #[test]
    fn test_emptied_mesh_is_empty_even_without_vertex_floor() {
        let dir = TempDir::new().unwrap();
        let mut options = BatchOptions::new(Recipe::CleanCoin, dir.path());
        options.inputs.height_map = PathBuf::from("dark.png");
        options.min_vertices = 0;
        let mut assets = AssetStore::new();
        assets.insert_height_map("dark.png", HeightMap::uniform(4, 4, 0.0).unwrap());

        let report = BatchRunner::with_assets(options, assets).run().unwrap();
        assert_eq!(report.empty(), 1);
        assert!(!report.has_failures());
        match &report.assets[0].outcome {
            AssetOutcome::Empty {
                pass,
                remaining_vertices,
            } => {
                assert_eq!(pass, "threshold_carve");
                assert_eq!(*remaining_vertices, 0);
            }
            other => panic!("expected an empty asset, got {:?}", other),
        }
        assert!(!dir.path().join("clean_coin_0.obj").exists());
        assert!(!dir.path().join("clean_coin_0.manifest.json").exists());
    }

    #[test]
    fn test_format_override() {
        let dir = TempDir::new().unwrap();
        let mut options = BatchOptions::new(Recipe::Coin, dir.path());
        options.format = Some(ExportFormat::Stl);

        let report = BatchRunner::new(options).run().unwrap();
        match &report.assets[0].outcome {
            AssetOutcome::Exported { path, fell_back, .. } => {
                assert_eq!(path, &dir.path().join("coin_0.stl"));
                assert!(!fell_back);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
