// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Design overview generator
//!
//! Writes a markdown document describing the crew and the governance
//! controls that apply to it.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;

use overseer_core::domain::crew::{CrewManifest, Process};

use super::run::{load_manifest, GovernanceArgs, GovernanceSettings};

#[derive(Args, Debug, Clone)]
pub struct OverviewArgs {
    /// Output path
    #[arg(short, long, default_value = "DESIGN-OVERVIEW.md")]
    pub output: PathBuf,

    /// Crew manifest to describe (default: built-in crew)
    #[arg(long, env = "OVERSEER_CREW", value_name = "FILE")]
    pub crew: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub governance: GovernanceArgs,
}

pub async fn handle_command(args: OverviewArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.output.display());
    }

    let manifest = load_manifest(args.crew.as_deref())?;
    let settings = GovernanceSettings::resolve(&args.governance, &manifest.spec.governance());
    let content = render_overview(&manifest, &settings);

    tokio::fs::write(&args.output, content)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let shown = args
        .output
        .canonicalize()
        .unwrap_or_else(|_| args.output.clone());
    println!("{} {}", "✓ Design overview written to".green(), shown.display());
    Ok(())
}

/// Render the overview document.
pub fn render_overview(manifest: &CrewManifest, settings: &GovernanceSettings) -> String {
    let spec = &manifest.spec;
    let mut out = String::new();

    let _ = writeln!(out, "# DESIGN OVERVIEW");
    let _ = writeln!(out, "Governed crew: {}", manifest.metadata.name);
    let _ = writeln!(out);
    if let Some(description) = &manifest.metadata.description {
        let _ = writeln!(out, "{}", description);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## 1. Orchestration");
    let _ = writeln!(out);
    match spec.process {
        Process::Hierarchical => {
            let manager = spec.manager().map(|m| m.role.as_str()).unwrap_or("(none)");
            let _ = writeln!(
                out,
                "The crew runs hierarchically. `{}` plans each task and delegates to its \
                 coworkers, issuing at most {} delegations per task before it must answer.",
                manager, spec.max_delegations
            );
            let _ = writeln!(out);
            let _ = writeln!(out, "```text");
            let _ = writeln!(out, "Task");
            let _ = writeln!(out, "  -> {}", manager);
            for coworker in spec.coworkers() {
                let _ = writeln!(out, "       -> {}", coworker.role);
            }
            let _ = writeln!(out, "  -> Final answer");
            let _ = writeln!(out, "```");
        }
        Process::Sequential => {
            let _ = writeln!(
                out,
                "The crew runs sequentially. Each task goes to its assigned agent and the \
                 previous task's output is passed along as context."
            );
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## 2. Agents");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Role | Goal | Delegates |");
    let _ = writeln!(out, "|------|------|-----------|");
    for agent in &spec.agents {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            agent.role,
            agent.goal,
            if agent.allow_delegation { "yes" } else { "no" }
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## 3. Tasks");
    let _ = writeln!(out);
    for (i, task) in spec.tasks.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, task.description);
        let _ = writeln!(out, "   - Expected output: {}", task.expected_output);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## 4. Execution Governance");
    let _ = writeln!(out);
    let _ = writeln!(out, "### 4.1 Model call ceiling");
    let _ = writeln!(out);
    match settings.max_calls.checked_add(1) {
        Some(first_refused) => {
            let _ = writeln!(
                out,
                "Every model call from every agent passes through one governor. The run stops \
                 with a call-limit error as soon as call number {} is attempted; that call never \
                 reaches the model.",
                first_refused
            );
        }
        None => {
            let _ = writeln!(
                out,
                "Every model call from every agent passes through one governor. The ceiling is \
                 set to its maximum, so no call is refused."
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "- Ceiling: {} calls (`MAX_MODEL_CALLS`)", settings.max_calls);
    let _ = writeln!(out);
    let _ = writeln!(out, "### 4.2 Pause and resume");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Before each model call the governor checks for `{}`. While the file exists the \
         call waits, re-checking every {:?}. Removing the file lets the waiting calls \
         proceed.",
        settings.pause_file.display(),
        settings.poll_interval
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "```sh");
    let _ = writeln!(out, "overseer pause    # create the pause file");
    let _ = writeln!(out, "overseer status   # PAUSED or RUNNING");
    let _ = writeln!(out, "overseer resume   # remove the pause file");
    let _ = writeln!(out, "```");
    let _ = writeln!(out);

    let _ = writeln!(out, "## 5. Configuration");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Variable | Purpose |");
    let _ = writeln!(out, "|----------|---------|");
    for (name, purpose) in [
        ("OPENAI_API_KEY", "API key, optional for local servers"),
        ("LLM_MODEL_NAME", "Model identifier"),
        ("LLM_API_BASE", "Base URL of the OpenAI-compatible API"),
        ("MAX_MODEL_CALLS", "Model call ceiling"),
        ("PAUSE_FILE", "Pause file location"),
        ("PAUSE_POLL_INTERVAL_SECS", "Seconds between pause checks"),
        ("OVERSEER_LOG_LEVEL", "Log filter when RUST_LOG is unset"),
    ] {
        let _ = writeln!(out, "| `{}` | {} |", name, purpose);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## 6. Tradeoffs");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Choice | Benefit | Cost |");
    let _ = writeln!(out, "|--------|---------|------|");
    let _ = writeln!(out, "| Callback-based governor | Sees every model call | One more layer per call |");
    let _ = writeln!(out, "| Hard call ceiling | Bounded spend | A run may stop mid-task |");
    let _ = writeln!(out, "| File-based pause | Works from any shell | Single host only |");
    let _ = writeln!(out, "| Shared model for all agents | Consistent behaviour | No per-agent tuning |");

    out
}
