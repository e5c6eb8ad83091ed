// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::batch::{AssetOutcome, AssetReport, BatchReport};
use crate::recipes::Recipe;
use crate::sculpt::Manifest;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a finished batch: one line per asset, then totals
    pub fn report_batch(report: &BatchReport) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} {} {}",
            "Recipe:".bold(),
            report.recipe.name().cyan(),
            format!("(base seed {})", report.base_seed).bright_black()
        );
        println!("{}", "━".repeat(80).bright_black());

        for asset in &report.assets {
            Self::report_asset(asset);
        }

        println!("\n{}", "Summary:".bold());
        println!(
            "  {} {}   {} {}   {} {}",
            "Exported:".bright_black(),
            report.exported().to_string().green(),
            "Empty:".bright_black(),
            report.empty().to_string().yellow(),
            "Failed:".bright_black(),
            if report.failed() > 0 {
                report.failed().to_string().red()
            } else {
                report.failed().to_string().green()
            }
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(report.total_duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report one asset of a batch
    pub fn report_asset(asset: &AssetReport) {
        let label = format!("#{:<3} seed {:<20}", asset.index, asset.seed);
        match &asset.outcome {
            AssetOutcome::Exported {
                path,
                vertices,
                faces,
                fell_back,
                ..
            } => {
                let note = if *fell_back { " (fallback format)" } else { "" };
                println!(
                    "  {} {} {} {} {}{}",
                    "✅".green(),
                    label.bright_black(),
                    path.display().to_string().cyan(),
                    format!("{} verts / {} faces", vertices, faces).bright_black(),
                    Self::format_duration(asset.duration).yellow(),
                    note.yellow()
                );
            }
            AssetOutcome::Empty {
                pass,
                remaining_vertices,
            } => {
                println!(
                    "  {} {} {}",
                    "⚠️ ".yellow(),
                    label.bright_black(),
                    format!(
                        "empty after `{}` ({} vertices left), not exported",
                        pass, remaining_vertices
                    )
                    .yellow()
                );
            }
            AssetOutcome::Failed { kind, error } => {
                println!(
                    "  {} {} {} {}",
                    "❌".red(),
                    label.bright_black(),
                    format!("[{}]", kind).red().bold(),
                    error.red()
                );
            }
        }
    }

    /// Report a single sculpted and exported mesh
    pub fn report_sculpt(output: &Path, manifest: &Manifest, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Sculpted:".bold(), output.display().to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());
        for pass in &manifest.passes {
            println!(
                "  {} {:<22} {:>8} → {:<8} {}",
                "•".bright_blue(),
                pass.name,
                pass.vertices_before,
                pass.vertices_after,
                format!("{:.2}ms", pass.elapsed_ms).bright_black()
            );
        }
        println!(
            "  {} {}",
            "Vertices:".bright_black(),
            manifest.vertex_count.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Faces:".bright_black(),
            manifest.face_count.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Fingerprint:".bright_black(),
            manifest.fingerprint[..16].bright_black()
        );
        println!(
            "  {} {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow(),
            format!("({:.2}ms in passes)", manifest.total_elapsed_ms()).bright_black()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// List the available recipes
    pub fn report_recipes() {
        println!("{}", "Recipes:".bold());
        for recipe in Recipe::ALL {
            let marker = if recipe.uses_height_map() {
                " [height map]".yellow()
            } else {
                "".normal()
            };
            println!(
                "  {:<16} {}{}",
                recipe.name().cyan(),
                recipe.description().bright_black(),
                marker
            );
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print progress message
    pub fn progress(message: &str) {
        println!("{} {}...", "⏳".bright_blue(), message.bright_black());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
