// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Crew execution command
//!
//! Builds the OpenAI-compatible provider, attaches the execution governor and
//! runs the crew to completion.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use overseer_core::application::CrewRunner;
use overseer_core::domain::crew::{CrewManifest, GovernanceConfig, Process};
use overseer_core::domain::governor::{
    ExecutionGovernor, DEFAULT_MAX_CALLS, DEFAULT_PAUSE_FILE, DEFAULT_POLL_INTERVAL,
};
use overseer_core::domain::llm::GenerationOptions;
use overseer_core::infrastructure::crew_manifest_parser::CrewManifestParser;
use overseer_core::infrastructure::llm::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use overseer_core::infrastructure::llm::{GovernedProvider, OpenAIAdapter};
use overseer_core::infrastructure::pause_signal::FilePauseSignal;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Crew manifest (default: built-in report-writing crew)
    #[arg(long, env = "OVERSEER_CREW", value_name = "FILE")]
    pub crew: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "LLM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Model identifier
    #[arg(long, env = "LLM_MODEL_NAME", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API key (omit for local servers without auth)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    #[command(flatten)]
    pub governance: GovernanceArgs,
}

/// Governor settings. Unset values fall back to the crew manifest, then defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct GovernanceArgs {
    /// Hard ceiling on model calls for this run (default: 10)
    #[arg(long, env = "MAX_MODEL_CALLS")]
    pub max_calls: Option<u64>,

    /// File whose presence pauses all model calls (default: pause-agents.txt)
    #[arg(long, env = "PAUSE_FILE", value_name = "FILE")]
    pub pause_file: Option<PathBuf>,

    /// Seconds between pause file checks (default: 5)
    #[arg(long, env = "PAUSE_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GovernanceSettings {
    pub max_calls: u64,
    pub pause_file: PathBuf,
    pub poll_interval: Duration,
}

impl GovernanceSettings {
    pub fn resolve(args: &GovernanceArgs, manifest: &GovernanceConfig) -> Self {
        Self {
            max_calls: args
                .max_calls
                .or(manifest.max_calls)
                .unwrap_or(DEFAULT_MAX_CALLS),
            pause_file: args
                .pause_file
                .clone()
                .or_else(|| manifest.pause_file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PAUSE_FILE)),
            poll_interval: args
                .poll_interval_secs
                .map(Duration::from_secs)
                .or(manifest.poll_interval)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }
}

pub fn load_manifest(path: Option<&Path>) -> Result<CrewManifest> {
    match path {
        Some(path) => CrewManifestParser::parse_file(path)
            .with_context(|| format!("Failed to load crew manifest {}", path.display())),
        None => Ok(CrewManifest::default_crew()),
    }
}

pub async fn handle_command(args: RunArgs) -> Result<()> {
    let manifest = load_manifest(args.crew.as_deref())?;
    let settings = GovernanceSettings::resolve(&args.governance, &manifest.spec.governance());

    info!(
        model = %args.model,
        api_base = %args.api_base,
        max_calls = settings.max_calls,
        pause_file = %settings.pause_file.display(),
        "Configuration loaded"
    );

    let governor = Arc::new(ExecutionGovernor::with_poll_interval(
        settings.max_calls,
        Arc::new(FilePauseSignal::new(settings.pause_file.clone())),
        settings.poll_interval,
    ));
    let adapter = OpenAIAdapter::new(args.api_base, args.api_key, args.model);
    let provider = GovernedProvider::new(Arc::new(adapter)).with_handler(governor.clone());

    let runner = CrewRunner::new(manifest, Arc::new(provider)).with_options(GenerationOptions {
        temperature: Some(args.temperature),
        ..Default::default()
    });

    let process = match runner.manifest().spec.process {
        Process::Hierarchical => "hierarchical",
        Process::Sequential => "sequential",
    };
    info!("🚀 Starting {} crew '{}'...", process, runner.manifest().metadata.name);

    let output = runner.kickoff().await.context("Crew run failed")?;

    info!(
        model_calls = governor.call_count(),
        run_id = %output.run_id,
        "===== FINAL OUTPUT ====="
    );
    println!("{}", "===== FINAL OUTPUT =====".green().bold());
    println!("{}", output);

    Ok(())
}
