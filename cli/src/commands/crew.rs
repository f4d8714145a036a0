// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Crew manifest commands
//!
//! Commands: show, validate, generate

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use overseer_core::domain::crew::{CrewManifest, Process};
use overseer_core::infrastructure::crew_manifest_parser::CrewManifestParser;

use super::run::load_manifest;

#[derive(Subcommand)]
pub enum CrewCommand {
    /// Show the crew that `run` would execute
    Show {
        /// Crew manifest (default: built-in crew)
        #[arg(long, env = "OVERSEER_CREW", value_name = "FILE")]
        crew: Option<PathBuf>,

        /// Print the manifest as YAML instead of a summary
        #[arg(long)]
        yaml: bool,
    },

    /// Validate a crew manifest
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Write the built-in crew as a manifest to edit
    Generate {
        /// Output path (default: ./crew.yaml)
        #[arg(short, long, default_value = "./crew.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(command: CrewCommand) -> Result<()> {
    match command {
        CrewCommand::Show { crew, yaml } => show(crew, yaml),
        CrewCommand::Validate { file } => validate(file),
        CrewCommand::Generate { output, force } => generate(output, force),
    }
}

fn show(crew: Option<PathBuf>, yaml: bool) -> Result<()> {
    let manifest = load_manifest(crew.as_deref())?;

    if yaml {
        print!("{}", CrewManifestParser::to_yaml(&manifest)?);
        return Ok(());
    }

    println!("{} {}", "Crew:".bold(), manifest.metadata.name);
    if let Some(description) = &manifest.metadata.description {
        println!("  {}", description.dimmed());
    }
    let spec = &manifest.spec;
    match spec.process {
        Process::Hierarchical => {
            let manager = spec.manager().map(|m| m.role.as_str()).unwrap_or("(none)");
            println!("  Process: hierarchical (manager: {}, max delegations: {})", manager, spec.max_delegations);
        }
        Process::Sequential => println!("  Process: sequential"),
    }
    println!();

    println!("{}", "Agents:".bold());
    for agent in &spec.agents {
        let badge = if agent.allow_delegation { " [delegates]" } else { "" };
        println!("  {}{}", agent.role.bold(), badge.cyan());
        println!("    Goal: {}", agent.goal);
        println!("    Backstory: {}", agent.backstory.dimmed());
    }
    println!();

    println!("{}", "Tasks:".bold());
    for (i, task) in spec.tasks.iter().enumerate() {
        println!("  {}. {}", i + 1, task.description);
        println!("     Expected: {}", task.expected_output);
        if let Some(agent) = &task.agent {
            println!("     Agent: {}", agent);
        }
    }

    if let Some(governance) = &spec.governance {
        println!();
        println!("{}", "Governance:".bold());
        if let Some(max_calls) = governance.max_calls {
            println!("  Max model calls: {}", max_calls);
        }
        if let Some(path) = &governance.pause_file {
            println!("  Pause file: {}", path.display());
        }
        if let Some(interval) = governance.poll_interval {
            println!("  Poll interval: {:?}", interval);
        }
    }

    Ok(())
}

fn validate(file: PathBuf) -> Result<()> {
    println!("Validating crew manifest...");
    let manifest = CrewManifestParser::parse_file(&file)?;
    println!(
        "{} {} ({} agents, {} tasks)",
        "✓ Valid:".green(),
        manifest.metadata.name,
        manifest.spec.agents.len(),
        manifest.spec.tasks.len()
    );
    Ok(())
}

fn generate(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let yaml = CrewManifestParser::to_yaml(&CrewManifest::default_crew())?;
    std::fs::write(&output, yaml)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{} {}", "✓ Crew manifest written to".green(), output.display());
    Ok(())
}
