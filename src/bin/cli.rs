// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sculptor CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sculptor::batch::BatchRunner;
use sculptor::cli::Reporter;
use sculptor::config::SculptorConfig;
use sculptor::io::{export_with_fallback, ExportFormat};
use sculptor::recipes::{CustomRecipe, Recipe};
use sculptor::sculpt::AssetStore;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sculptor")]
#[command(about = "Sculptor - procedural mesh sculpting and batch asset generation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./sculptor.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of seeded assets from a recipe
    Generate {
        /// Recipe name (see `sculptor recipes`)
        #[arg(short, long)]
        recipe: Recipe,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of assets
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Base seed; asset i uses seed + i
        #[arg(short, long)]
        seed: Option<u64>,

        /// Export format (obj, glb, gltf, stl)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Format to retry with when the primary export fails
        #[arg(long)]
        fallback: Option<ExportFormat>,

        /// Greyscale height map for relief recipes
        #[arg(long, value_name = "IMAGE")]
        height_map: Option<PathBuf>,

        /// Abort an asset when a pass leaves fewer vertices
        #[arg(long)]
        min_vertices: Option<usize>,

        /// Batch report path (defaults to <out>/batch_report.json)
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// List the available recipes
    Recipes,

    /// Sculpt one mesh from a TOML pipeline file
    Run {
        /// Pipeline file: base primitive, passes and optional material
        #[arg(short, long, value_name = "FILE")]
        pipeline: PathBuf,

        /// Output mesh; the format follows the extension
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        /// Format to retry with when the primary export fails
        #[arg(long)]
        fallback: Option<ExportFormat>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SculptorConfig::load(cli.config.as_deref())?;
    init_tracing(cli.verbose || config.verbose);

    match cli.command {
        Commands::Generate {
            recipe,
            out,
            count,
            seed,
            format,
            fallback,
            height_map,
            min_vertices,
            report,
        } => {
            let mut config = config;
            if let Some(out) = out {
                config.output_dir = out;
            }
            if let Some(count) = count {
                config.count = count;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if format.is_some() {
                config.format = format;
            }
            if fallback.is_some() {
                config.fallback = fallback;
            }
            if let Some(height_map) = height_map {
                config.height_map = height_map;
            }
            if let Some(min_vertices) = min_vertices {
                config.min_vertices = min_vertices;
            }
            generate_command(recipe, &config, report)?;
        }
        Commands::Recipes => Reporter::report_recipes(),
        Commands::Run {
            pipeline,
            out,
            fallback,
        } => {
            if let Err(e) = run_command(&pipeline, &out, fallback.or(config.fallback)) {
                Reporter::report_error(&format!("{:#}", e));
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("Sculptor v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "sculptor=debug" } else { "sculptor=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn generate_command(recipe: Recipe, config: &SculptorConfig, report_path: Option<PathBuf>) -> Result<()> {
    if recipe.uses_height_map() && !config.height_map.is_file() {
        Reporter::report_warning(&format!(
            "height map {} not found, every {} asset will fail",
            config.height_map.display(),
            recipe
        ));
    }

    Reporter::progress(&format!(
        "Generating {} x {} into {}",
        config.count,
        recipe,
        config.output_dir.display()
    ));

    let mut options = config.batch_options(recipe);
    options.show_progress = true;
    let report = BatchRunner::new(options).run()?;

    Reporter::report_batch(&report);

    let report_path = report_path.unwrap_or_else(|| config.output_dir.join("batch_report.json"));
    report
        .save(&report_path)
        .with_context(|| format!("Failed to write batch report: {:?}", report_path))?;
    Reporter::report_info(&format!("Report: {}", report_path.display()));

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn run_command(pipeline_path: &Path, out: &Path, fallback: Option<ExportFormat>) -> Result<()> {
    let Some(format) = ExportFormat::from_path(out) else {
        bail!(
            "cannot infer an export format from {:?} (expected .obj, .glb, .gltf or .stl)",
            out
        );
    };

    let recipe = CustomRecipe::from_file(pipeline_path)?;
    // Image paths inside the pipeline file are relative to the file itself
    let root = pipeline_path.parent().unwrap_or_else(|| Path::new("."));
    let mut assets = AssetStore::with_search_root(root);

    let start = Instant::now();
    let output = recipe
        .build(&mut assets)
        .with_context(|| format!("Pipeline {:?} failed", pipeline_path))?;

    let dir = out.parent().unwrap_or_else(|| Path::new("."));
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .context("output path has no file name")?;
    std::fs::create_dir_all(dir)?;

    let path = export_with_fallback(
        &output.mesh,
        dir,
        stem,
        format,
        fallback,
        &recipe.export_options(),
    )?;
    output
        .manifest
        .write(&dir.join(format!("{}.manifest.json", stem)))?;

    Reporter::report_sculpt(&path, &output.manifest, start.elapsed());
    if ExportFormat::from_path(&path) != Some(format) {
        Reporter::report_warning(&format!("{} export failed, wrote {}", format, path.display()));
    }

    Ok(())
}
