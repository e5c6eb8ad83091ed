// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Asset recipes
//!
//! A recipe turns a seed into a concrete [`AssetPlan`]: base primitive, pass
//! list, material and export formats. All random draws happen here, through a
//! `StdRng` seeded from the asset seed, so a plan is a pure function of
//! `(recipe, seed, inputs)`.

use crate::error::{SculptError, SculptResult};
use crate::geometry::{Mesh, Primitive};
use crate::io::{ExportFormat, ExportOptions, MaterialDesc};
use crate::sculpt::{
    AssetStore, Axis, ImageDisplace, Manifest, NoiseDisplace, NoiseField, Pipeline, RadialJitter,
    RecalculateNormals, Scale, SculptOutput, Smooth, Solidify, Subdivide, ThresholdCarve,
};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

const GOLD: [f64; 3] = [0.831, 0.686, 0.216];
const SILVER: [f64; 3] = [0.8, 0.85, 0.9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipe {
    Asteroid,
    SimpleAsteroid,
    Coin,
    ThickCoin,
    ReliefCoin,
    CleanCoin,
    ExtrudedCoin,
}

impl Recipe {
    pub const ALL: [Recipe; 7] = [
        Recipe::Asteroid,
        Recipe::SimpleAsteroid,
        Recipe::Coin,
        Recipe::ThickCoin,
        Recipe::ReliefCoin,
        Recipe::CleanCoin,
        Recipe::ExtrudedCoin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Recipe::Asteroid => "asteroid",
            Recipe::SimpleAsteroid => "simple_asteroid",
            Recipe::Coin => "coin",
            Recipe::ThickCoin => "thick_coin",
            Recipe::ReliefCoin => "relief_coin",
            Recipe::CleanCoin => "clean_coin",
            Recipe::ExtrudedCoin => "extruded_coin",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Recipe::Asteroid => "noise-displaced icosphere with cellular and cloud layers",
            Recipe::SimpleAsteroid => "icosphere with per-vertex radial jitter",
            Recipe::Coin => "thin silver disc",
            Recipe::ThickCoin => "thicker silver disc",
            Recipe::ReliefCoin => "gold relief carved from a height map",
            Recipe::CleanCoin => "smoothed gold relief carved from a height map",
            Recipe::ExtrudedCoin => "gold disc with a raised height-map relief on top",
        }
    }

    /// Whether the recipe reads the height map image
    pub fn uses_height_map(self) -> bool {
        matches!(
            self,
            Recipe::ReliefCoin | Recipe::CleanCoin | Recipe::ExtrudedCoin
        )
    }

    /// Resolve every random parameter for one asset
    pub fn plan(self, seed: u64, inputs: &RecipeInputs) -> AssetPlan {
        let mut rng = StdRng::seed_from_u64(seed);
        let pipeline = Pipeline::new().with_provenance(self.name(), seed);

        let mut plan = AssetPlan {
            recipe: self,
            seed,
            base: Primitive::icosphere(1.0, 1),
            pipeline,
            join: None,
            material: None,
            format: ExportFormat::Obj,
            fallback: None,
        };

        match self {
            Recipe::Asteroid => {
                plan.base = Primitive::icosphere(1.0, rng.gen_range(1..=2));
                plan.pipeline.push(Scale::new(
                    0.8 + rng.gen::<f64>() * 0.4,
                    0.7 + rng.gen::<f64>() * 0.6,
                    0.8 + rng.gen::<f64>() * 0.4,
                ));

                // Large rocky cells, then fine cloud detail
                let cells = NoiseField::cellular(rng.gen(), rng.gen_range(2.0..4.0));
                plan.pipeline
                    .push(NoiseDisplace::new(cells, rng.gen_range(0.1..0.25)));
                let clouds = NoiseField::clouds(rng.gen(), rng.gen_range(1.0..2.5));
                plan.pipeline
                    .push(NoiseDisplace::new(clouds, rng.gen_range(0.05..0.15)));

                if rng.gen::<f64>() > 0.5 {
                    plan.pipeline.push(Subdivide { iterations: 1 });
                    plan.pipeline.push(Smooth::new(0.5, 1));
                }
                plan.pipeline.push(RecalculateNormals::default());

                let mut material = MaterialDesc::new(
                    "asteroid",
                    [0.45, 0.42, 0.4],
                    rng.gen_range(0.0..0.1),
                    rng.gen_range(0.9..1.0),
                );
                material.texture = inputs.asteroid_texture.clone();
                plan.material = Some(material);
                plan.format = ExportFormat::Glb;
                plan.fallback = Some(ExportFormat::Obj);
            }
            Recipe::SimpleAsteroid => {
                plan.base = Primitive::icosphere(1.0, rng.gen_range(1..=2));
                plan.pipeline.push(Scale::new(
                    0.7 + rng.gen::<f64>() * 0.6,
                    0.7 + rng.gen::<f64>() * 0.6,
                    0.7 + rng.gen::<f64>() * 0.6,
                ));
                plan.pipeline.push(RadialJitter {
                    seed: rng.gen(),
                    min_strength: 0.05,
                    max_strength: 0.15,
                });
                plan.pipeline.push(RecalculateNormals::default());
            }
            Recipe::Coin => {
                plan.base = Primitive::cylinder(1.0, 0.1, 64);
                plan.pipeline.push(RecalculateNormals::default());
                plan.material = Some(MaterialDesc::new("coin_silver", SILVER, 0.95, 0.1));
            }
            Recipe::ThickCoin => {
                plan.base = Primitive::cylinder(1.0, 0.15, 64);
                plan.pipeline.push(RecalculateNormals::default());
                plan.material = Some(MaterialDesc::new("coin_silver", SILVER, 0.9, 0.2));
            }
            Recipe::ReliefCoin => {
                plan.base = Primitive::plane(2.0, 1, 1);
                plan.pipeline.push(Subdivide { iterations: 7 });
                // Black stays flat, white rises
                plan.pipeline
                    .push(ImageDisplace::new(&inputs.height_map, 0.0, 0.15));
                plan.pipeline.push(ThresholdCarve::new(Axis::Z, 0.01));
                plan.pipeline.push(RecalculateNormals::default());
                plan.pipeline.push(Solidify::new(0.05, 0.0));
                plan.material = Some(MaterialDesc::new("coin_gold", GOLD, 1.0, 0.15));
            }
            Recipe::CleanCoin => {
                plan.base = Primitive::plane(2.0, 1, 1);
                plan.pipeline.push(Subdivide { iterations: 6 });
                plan.pipeline
                    .push(ImageDisplace::new(&inputs.height_map, 0.5, 0.08));
                plan.pipeline.push(ThresholdCarve::new(Axis::Z, 0.035));
                plan.pipeline.push(Smooth::new(0.5, 3));
                plan.pipeline.push(RecalculateNormals::default());
                plan.pipeline.push(Solidify::new(0.04, 0.0));
                plan.pipeline.push(Smooth::new(0.5, 5));
                plan.material = Some(MaterialDesc::new("coin_gold", GOLD, 1.0, 0.2));
            }
            Recipe::ExtrudedCoin => {
                plan.base = Primitive::plane(1.8, 1, 1);
                plan.pipeline.push(Subdivide { iterations: 6 });
                plan.pipeline
                    .push(ImageDisplace::new(&inputs.height_map, 0.5, 0.1));
                plan.pipeline.push(ThresholdCarve::new(Axis::Z, 0.08));
                plan.pipeline.push(Smooth::new(0.3, 2));
                plan.pipeline.push(RecalculateNormals::default());
                plan.pipeline.push(Solidify::new(0.03, 1.0));
                plan.join = Some(Join {
                    primitive: Primitive::cylinder(1.0, 0.15, 64),
                    offset: [0.0, 0.0, 0.075],
                });
                plan.material = Some(MaterialDesc::new("coin_gold", GOLD, 1.0, 0.15));
            }
        }

        plan
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Recipe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Recipe::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Recipe::ALL.iter().map(|r| r.name()).collect();
                format!("unknown recipe '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// External files recipes may refer to
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeInputs {
    pub height_map: PathBuf,
    pub asteroid_texture: Option<PathBuf>,
}

impl Default for RecipeInputs {
    fn default() -> Self {
        Self {
            height_map: PathBuf::from("assets/logo.png"),
            asteroid_texture: None,
        }
    }
}

/// The sculpted mesh is moved by `offset` and appended to `primitive`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub primitive: Primitive,
    pub offset: [f64; 3],
}

/// Everything needed to build and export one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPlan {
    pub recipe: Recipe,
    pub seed: u64,
    pub base: Primitive,
    pub pipeline: Pipeline,
    pub join: Option<Join>,
    pub material: Option<MaterialDesc>,
    pub format: ExportFormat,
    pub fallback: Option<ExportFormat>,
}

impl AssetPlan {
    /// Run the pipeline and apply the join, if any.
    ///
    /// When joining, a relief carved away entirely is accepted: the joined
    /// primitive is returned alone and the manifest carries a warning.
    pub fn build(&self, assets: &mut AssetStore) -> SculptResult<SculptOutput> {
        let mut records = Vec::new();
        let sculpted = self
            .pipeline
            .run_recorded(self.base.to_mesh(), assets, &mut records);

        let Some(join) = &self.join else {
            return sculpted;
        };

        let mut mesh = join.primitive.to_mesh();
        let mut manifest = match sculpted {
            Ok(mut output) => {
                output.mesh.translate(Vector3::from(join.offset));
                mesh.merge(&output.mesh);
                output.manifest
            }
            Err(SculptError::EmptyMeshResult {
                pass,
                remaining_vertices,
                ..
            }) => {
                warn!(
                    recipe = self.recipe.name(),
                    seed = self.seed,
                    %pass,
                    "relief carved away, keeping base only"
                );
                let mut manifest = Manifest::new(records, &Mesh::new());
                manifest.recipe = Some(self.recipe.name().to_string());
                manifest.seed = Some(self.seed);
                manifest.warnings.push(format!(
                    "relief discarded: pass `{}` left {} vertices",
                    pass, remaining_vertices
                ));
                manifest
            }
            Err(other) => return Err(other),
        };

        manifest.refresh(&mesh);
        Ok(SculptOutput { mesh, manifest })
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            material: self.material.clone(),
        }
    }
}

/// A user-declared asset loaded from TOML: base primitive, pass list and material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRecipe {
    pub base: Primitive,
    #[serde(flatten)]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub material: Option<MaterialDesc>,
}

impl CustomRecipe {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read pipeline file: {:?}", path.as_ref()))?;
        let recipe: CustomRecipe = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline file: {:?}", path.as_ref()))?;
        Ok(recipe)
    }

    pub fn build(&self, assets: &mut AssetStore) -> SculptResult<SculptOutput> {
        self.pipeline.run(self.base.to_mesh(), assets)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            material: self.material.clone(),
        }
    }
}

/// Seed of the `index`-th asset in a batch
pub fn asset_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}
