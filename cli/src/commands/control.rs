// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pause control commands
//!
//! Commands: pause, resume, status. They manage the same file a running crew
//! polls, so they work against runs in other processes.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use overseer_core::domain::governor::PauseSignal;
use overseer_core::infrastructure::pause_signal::FilePauseSignal;

use super::run::{load_manifest, GovernanceArgs, GovernanceSettings};

#[derive(Args, Debug, Clone)]
pub struct ControlArgs {
    /// Crew manifest whose governance.pauseFile should be used
    #[arg(long, env = "OVERSEER_CREW", value_name = "FILE")]
    pub crew: Option<PathBuf>,

    /// Pause file location (default: pause-agents.txt)
    #[arg(long, env = "PAUSE_FILE", value_name = "FILE")]
    pub pause_file: Option<PathBuf>,
}

impl ControlArgs {
    /// Resolve the pause file the same way `run` does.
    pub fn signal(&self) -> Result<FilePauseSignal> {
        let manifest = load_manifest(self.crew.as_deref())?;
        let args = GovernanceArgs {
            pause_file: self.pause_file.clone(),
            ..Default::default()
        };
        let settings = GovernanceSettings::resolve(&args, &manifest.spec.governance());
        Ok(FilePauseSignal::new(settings.pause_file))
    }
}

pub async fn pause(args: ControlArgs) -> Result<()> {
    let signal = args.signal()?;
    signal
        .pause()
        .await
        .with_context(|| format!("Failed to create pause file {}", signal.describe()))?;

    println!(
        "{} Agents will pause before their next model call ({})",
        "⏸".yellow(),
        signal.describe()
    );
    Ok(())
}

pub async fn resume(args: ControlArgs) -> Result<()> {
    let signal = args.signal()?;
    let removed = signal
        .resume()
        .await
        .with_context(|| format!("Failed to remove pause file {}", signal.describe()))?;

    if removed {
        println!("{} Agents resumed ({} removed)", "▶".green(), signal.describe());
    } else {
        println!("{} Agents were not paused", "ℹ".blue());
    }
    Ok(())
}

pub async fn status(args: ControlArgs) -> Result<()> {
    let signal = args.signal()?;
    if signal.is_paused().await {
        println!("{} ({})", "PAUSED".yellow().bold(), signal.describe());
    } else {
        println!("{} ({} absent)", "RUNNING".green().bold(), signal.describe());
    }
    Ok(())
}
