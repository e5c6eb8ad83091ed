// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sculptor
//!
//! Procedural mesh sculpting. A base primitive runs through an ordered list of
//! passes (noise and image displacement, threshold carving, smoothing,
//! solidify, normal repair) and is exported as OBJ, glTF or STL together with
//! a JSON manifest of what each pass did. Recipes bundle seeded pass lists for
//! asteroids and coins; the batch runner generates many of them at once.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod recipes;
pub mod sculpt;

pub use error::{SculptError, SculptResult};
pub use geometry::{Mesh, Primitive};
pub use io::{export, ExportFormat};
pub use recipes::{AssetPlan, CustomRecipe, Recipe};
pub use sculpt::{AssetStore, Manifest, MeshPass, Pipeline, SculptOutput, SculptPass};

/// Build one asset of `recipe` and return the sculpted mesh with its manifest
pub fn sculpt_recipe(recipe: Recipe, seed: u64, assets: &mut AssetStore) -> SculptResult<SculptOutput> {
    recipe.plan(seed, &recipes::RecipeInputs::default()).build(assets)
}
