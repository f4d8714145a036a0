// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Crew Domain Model
//!
//! A **crew** is a set of role-playing agents plus the tasks they work on and
//! the process that coordinates them:
//!
//! - [`Process::Hierarchical`]: a manager agent plans the work and delegates
//!   to coworkers until it can give a final answer.
//! - [`Process::Sequential`]: each task runs on its assigned agent in order.
//!
//! Crews are declared with a Kubernetes-style manifest:
//!
//! ```yaml
//! apiVersion: overseer/v1
//! kind: Crew
//! metadata:
//!   name: multi-agent-report
//! spec:
//!   process: hierarchical
//!   agents:
//!     - role: Project Manager
//!       goal: Break down the objective and delegate work efficiently.
//!       backstory: Experienced technical leader coordinating specialists.
//!       allowDelegation: true
//!   tasks:
//!     - description: Create a structured report about Multi-Agent AI Systems.
//!       expectedOutput: A well-structured markdown report.
//!   governance:
//!     maxCalls: 10
//!     pollInterval: 5s
//! ```

use crate::domain::llm::LLMError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub const CREW_API_VERSION: &str = "overseer/v1";
pub const CREW_KIND: &str = "Crew";

/// Delegation rounds a manager gets per task before it must answer.
pub const DEFAULT_MAX_DELEGATIONS: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("Invalid crew manifest: {0}")]
    InvalidManifest(String),

    #[error("Hierarchical process requires a manager agent")]
    NoManager,

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Model call failed: {0}")]
    Llm(#[from] LLMError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    Sequential,
    #[default]
    Hierarchical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,

    /// Whether this agent may hand work to coworkers
    #[serde(default)]
    pub allow_delegation: bool,

    /// Log each step this agent takes
    #[serde(default)]
    pub verbose: bool,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            verbose: false,
        }
    }

    pub fn with_delegation(mut self) -> Self {
        self.allow_delegation = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn matches_role(&self, role: &str) -> bool {
        self.role.trim().eq_ignore_ascii_case(role.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub description: String,
    pub expected_output: String,

    /// Role of the agent that owns this task (sequential process)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent: None,
        }
    }

    pub fn assigned_to(mut self, role: impl Into<String>) -> Self {
        self.agent = Some(role.into());
        self
    }
}

/// Execution limits applied to every model call the crew makes.
/// Unset fields fall back to command-line/environment values or defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_file: Option<PathBuf>,

    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub poll_interval: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewSpec {
    #[serde(default)]
    pub process: Process,

    /// Role of the managing agent; defaults to the first delegating agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,

    #[serde(default = "default_max_delegations")]
    pub max_delegations: u32,

    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance: Option<GovernanceConfig>,
}

fn default_max_delegations() -> u32 {
    DEFAULT_MAX_DELEGATIONS
}

impl CrewSpec {
    pub fn find_agent(&self, role: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.matches_role(role))
    }

    pub fn manager(&self) -> Option<&Agent> {
        match &self.manager {
            Some(role) => self.find_agent(role),
            None => self.agents.iter().find(|a| a.allow_delegation),
        }
    }

    /// Every agent except the manager.
    pub fn coworkers(&self) -> Vec<&Agent> {
        let manager = self.manager().map(|m| m.role.as_str());
        self.agents
            .iter()
            .filter(|a| Some(a.role.as_str()) != manager)
            .collect()
    }

    pub fn governance(&self) -> GovernanceConfig {
        self.governance.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewManifest {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CrewMetadata,
    pub spec: CrewSpec,
}

impl CrewManifest {
    pub fn new(name: impl Into<String>, spec: CrewSpec) -> Self {
        Self {
            api_version: CREW_API_VERSION.to_string(),
            kind: CREW_KIND.to_string(),
            metadata: CrewMetadata {
                name: name.into(),
                description: None,
            },
            spec,
        }
    }

    /// Three-agent report-writing crew run when no manifest is supplied.
    pub fn default_crew() -> Self {
        let mut manifest = Self::new(
            "multi-agent-report",
            CrewSpec {
                process: Process::Hierarchical,
                manager: None,
                max_delegations: DEFAULT_MAX_DELEGATIONS,
                agents: vec![
                    Agent::new(
                        "Project Manager",
                        "Break down the objective and delegate work efficiently.",
                        "Experienced technical leader coordinating specialists.",
                    )
                    .with_delegation()
                    .verbose(),
                    Agent::new(
                        "Senior Researcher",
                        "Conduct structured research.",
                        "Analytical and detail-oriented expert.",
                    )
                    .verbose(),
                    Agent::new(
                        "Technical Writer",
                        "Turn research into structured documentation.",
                        "Expert at simplifying complex ideas.",
                    )
                    .verbose(),
                ],
                tasks: vec![Task::new(
                    "Create a structured report about Multi-Agent AI Systems. \
                     Include architecture overview, benefits, and challenges.",
                    "A well-structured markdown report.",
                )],
                governance: None,
            },
        );
        manifest.metadata.description =
            Some("Hierarchical crew producing a report on multi-agent systems".to_string());
        manifest
    }

    pub fn validate(&self) -> Result<(), CrewError> {
        let invalid = |msg: String| Err(CrewError::InvalidManifest(msg));

        if self.api_version != CREW_API_VERSION {
            return invalid(format!(
                "apiVersion must be '{}', got '{}'",
                CREW_API_VERSION, self.api_version
            ));
        }
        if self.kind != CREW_KIND {
            return invalid(format!("kind must be '{}', got '{}'", CREW_KIND, self.kind));
        }
        if self.metadata.name.trim().is_empty() {
            return invalid("metadata.name must not be empty".to_string());
        }

        let spec = &self.spec;
        if spec.agents.is_empty() {
            return invalid("at least one agent is required".to_string());
        }
        if spec.tasks.is_empty() {
            return invalid("at least one task is required".to_string());
        }

        let mut roles = HashSet::new();
        for agent in &spec.agents {
            if agent.role.trim().is_empty() {
                return invalid("agent role must not be empty".to_string());
            }
            if !roles.insert(agent.role.trim().to_lowercase()) {
                return invalid(format!("duplicate agent role '{}'", agent.role));
            }
        }

        for task in &spec.tasks {
            if task.description.trim().is_empty() {
                return invalid("task description must not be empty".to_string());
            }
            if let Some(role) = &task.agent {
                if spec.find_agent(role).is_none() {
                    return Err(CrewError::UnknownAgent(role.clone()));
                }
            }
        }

        if spec.process == Process::Hierarchical {
            if let Some(role) = &spec.manager {
                if spec.find_agent(role).is_none() {
                    return Err(CrewError::UnknownAgent(role.clone()));
                }
            }
            if spec.manager().is_none() {
                return Err(CrewError::NoManager);
            }
            if spec.coworkers().is_empty() {
                return invalid("hierarchical process requires at least one coworker".to_string());
            }
        }

        Ok(())
    }
}
