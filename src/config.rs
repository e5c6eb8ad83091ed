// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sculptor configuration system
//!
//! Precedence, lowest first: built-in defaults, `sculptor.toml`, `SCULPTOR_*`
//! environment variables, command-line flags.

use crate::batch::BatchOptions;
use crate::io::ExportFormat;
use crate::recipes::{Recipe, RecipeInputs};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "sculptor.toml";

/// Batch generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptorConfig {
    /// Directory assets and manifests are written to
    pub output_dir: PathBuf,
    /// Base seed; asset `i` uses `seed + i`
    pub seed: u64,
    /// Assets per run
    pub count: usize,
    /// Export format, overriding the recipe's choice
    pub format: Option<ExportFormat>,
    /// Format to retry with when the primary export fails
    pub fallback: Option<ExportFormat>,
    /// Greyscale image for relief recipes
    pub height_map: PathBuf,
    /// Texture referenced by asteroid materials
    pub asteroid_texture: Option<PathBuf>,
    /// Pipelines abort when a pass leaves fewer vertices
    pub min_vertices: usize,
    pub verbose: bool,
}

impl Default for SculptorConfig {
    fn default() -> Self {
        let inputs = RecipeInputs::default();
        Self {
            output_dir: PathBuf::from("output"),
            seed: 0,
            count: 8,
            format: None,
            fallback: None,
            height_map: inputs.height_map,
            asteroid_texture: inputs.asteroid_texture,
            min_vertices: 1,
            verbose: false,
        }
    }
}

impl SculptorConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SculptorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `path` (or `sculptor.toml` when present) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `SCULPTOR_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(output_dir) = lookup("SCULPTOR_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(output_dir);
        }

        if let Some(seed) = lookup("SCULPTOR_SEED") {
            self.seed = seed
                .parse()
                .with_context(|| format!("SCULPTOR_SEED is not an integer: {:?}", seed))?;
        }

        if let Some(count) = lookup("SCULPTOR_COUNT") {
            self.count = count
                .parse()
                .with_context(|| format!("SCULPTOR_COUNT is not an integer: {:?}", count))?;
        }

        if let Some(verbose) = lookup("SCULPTOR_VERBOSE") {
            self.verbose = matches!(verbose.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn recipe_inputs(&self) -> RecipeInputs {
        RecipeInputs {
            height_map: self.height_map.clone(),
            asteroid_texture: self.asteroid_texture.clone(),
        }
    }

    pub fn batch_options(&self, recipe: Recipe) -> BatchOptions {
        BatchOptions {
            recipe,
            count: self.count,
            seed: self.seed,
            output_dir: self.output_dir.clone(),
            format: self.format,
            fallback: self.fallback,
            min_vertices: self.min_vertices,
            inputs: self.recipe_inputs(),
            show_progress: false,
        }
    }
}
