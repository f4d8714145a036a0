// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Overseer CLI
//!
//! The `overseer` binary runs a hierarchical agent crew against an
//! OpenAI-compatible model, under a per-run model call ceiling and a
//! file-based pause switch.
//!
//! ## Commands
//!
//! - `overseer run` - Execute the crew and print the final output
//! - `overseer pause|resume|status` - Operate the pause file
//! - `overseer crew show|validate|generate` - Crew manifest management
//! - `overseer overview` - Write DESIGN-OVERVIEW.md

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::error;

use overseer_cli::commands::{self, ControlArgs, CrewCommand, OverviewArgs, RunArgs};

/// Overseer - Governed multi-agent crews
#[derive(Parser)]
#[command(name = "overseer")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "OVERSEER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the crew under the execution governor
    #[command(name = "run")]
    Run(RunArgs),

    /// Pause model calls of running crews
    #[command(name = "pause")]
    Pause(ControlArgs),

    /// Resume paused crews
    #[command(name = "resume")]
    Resume(ControlArgs),

    /// Report whether crews are paused
    #[command(name = "status")]
    Status(ControlArgs),

    /// Crew manifest management
    #[command(name = "crew")]
    Crew {
        #[command(subcommand)]
        command: CrewCommand,
    },

    /// Write a design overview document
    #[command(name = "overview")]
    Overview(OverviewArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Run(args)) => {
            if let Err(e) = commands::run::handle_command(args).await {
                error!("Execution stopped: {:#}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Pause(args)) => commands::control::pause(args).await,
        Some(Commands::Resume(args)) => commands::control::resume(args).await,
        Some(Commands::Status(args)) => commands::control::status(args).await,
        Some(Commands::Crew { command }) => commands::crew::handle_command(command).await,
        Some(Commands::Overview(args)) => commands::overview::handle_command(args).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
