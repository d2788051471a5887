//! CLI for the spring-migrate recipe catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spring_migrate::prelude::*;
use spring_migrate::recipe::catalog;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spring-migrate")]
#[command(author, version, about = "Automated migration recipes for Spring Boot projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a migration manifest to a project
    Run {
        /// Path to the YAML migration manifest
        #[arg(short, long)]
        manifest: PathBuf,

        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Preview changes as a diff without writing files
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the recipes a manifest can declare
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            manifest,
            path,
            dry_run,
            json,
        } => cmd_run(manifest, path, dry_run, json),
        Commands::List => cmd_list(),
    }
}

fn cmd_run(manifest: PathBuf, path: PathBuf, dry_run: bool, json: bool) -> Result<()> {
    let recipes = load_manifest_file(&manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

    let mut run = MigrationRun::in_project(&path).recipes(recipes);
    if dry_run {
        run = run.dry_run();
    }
    let result = run.apply().context("Migration failed")?;

    if dry_run {
        for change in result.changes.iter().filter(|c| c.is_modified()) {
            print!(
                "{}",
                spring_migrate::diff::colorized_diff(
                    &change.original,
                    &change.transformed,
                    &change.path
                )
            );
        }
        println!("\n{}", result.summary);
    } else {
        println!("Modified {} file(s)", result.files_modified());
    }

    for failure in &result.report.failures {
        eprintln!(
            "warning: {} failed on {}: {}",
            failure.recipe,
            failure.path.display(),
            failure.message
        );
    }
    for (key, value) in &result.report.signals {
        eprintln!("action required: {key} = {value}");
    }
    if !result.report.converged {
        eprintln!("warning: run did not converge within the cycle bound");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    println!("Available recipes:");
    for (name, description) in catalog::builtin_recipes() {
        println!("  {name}\n      {description}");
    }
    Ok(())
}
