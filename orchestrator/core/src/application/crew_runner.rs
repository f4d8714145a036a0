// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Crew Runner
//!
//! Executes a [`CrewManifest`] task by task, chaining each task's output into
//! the next as context.
//!
//! ## Hierarchical Loop
//! | Manager reply | Action |
//! |---------------|--------|
//! | `DELEGATE TO <role>: ...` | Run the coworker, append result to the delegation log |
//! | `DELEGATE TO <unknown>: ...` | Append a correction to the log |
//! | `FINAL ANSWER: ...` or no directive | Task output |
//! | delegation budget spent | One last prompt demanding a final answer |
//!
//! Every model call goes through the provider handed to the runner. Attach the
//! execution governor to that provider (`GovernedProvider`) and a call-limit
//! breach surfaces here as [`CrewError::Llm`], ending the run.

use crate::application::prompts::{self, Delegation, ManagerDirective};
use crate::domain::crew::{Agent, CrewError, CrewManifest, Process, Task};
use crate::domain::llm::{ChatMessage, GenerationOptions, LLMProvider};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub description: String,
    /// Role of the agent that produced the final text
    pub agent: String,
    pub raw: String,
    pub delegations: Vec<Delegation>,
}

#[derive(Debug, Clone)]
pub struct CrewOutput {
    pub run_id: Uuid,
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub struct CrewRunner {
    manifest: CrewManifest,
    provider: Arc<dyn LLMProvider>,
    options: GenerationOptions,
}

impl CrewRunner {
    pub fn new(manifest: CrewManifest, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            manifest,
            provider,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn manifest(&self) -> &CrewManifest {
        &self.manifest
    }

    pub async fn kickoff(&self) -> Result<CrewOutput, CrewError> {
        self.manifest.validate()?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "crew_run",
            run_id = %run_id,
            crew = %self.manifest.metadata.name
        );
        self.run(run_id).instrument(span).await
    }

    async fn run(&self, run_id: Uuid) -> Result<CrewOutput, CrewError> {
        let spec = &self.manifest.spec;
        let started_at = Utc::now();
        info!(
            process = ?spec.process,
            agents = spec.agents.len(),
            tasks = spec.tasks.len(),
            "Crew kickoff"
        );

        let mut tasks_output: Vec<TaskOutput> = Vec::with_capacity(spec.tasks.len());
        for (index, task) in spec.tasks.iter().enumerate() {
            let context = tasks_output.last().map(|t| t.raw.as_str());
            info!(task = index + 1, "Working on task: {}", task.description);

            let output = match spec.process {
                Process::Hierarchical => self.run_hierarchical(task, context).await?,
                Process::Sequential => self.run_sequential(task, context).await?,
            };
            tasks_output.push(output);
        }

        let raw = tasks_output
            .last()
            .map(|t| t.raw.clone())
            .unwrap_or_default();
        let finished_at = Utc::now();
        info!(
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Crew finished"
        );

        Ok(CrewOutput {
            run_id,
            raw,
            tasks_output,
            started_at,
            finished_at,
        })
    }

    async fn run_sequential(&self, task: &Task, context: Option<&str>) -> Result<TaskOutput, CrewError> {
        let spec = &self.manifest.spec;
        let agent = match &task.agent {
            Some(role) => spec
                .find_agent(role)
                .ok_or_else(|| CrewError::UnknownAgent(role.clone()))?,
            None => spec
                .agents
                .first()
                .ok_or_else(|| CrewError::InvalidManifest("crew has no agents".to_string()))?,
        };

        let instructions = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}",
            task.description.trim(),
            task.expected_output.trim()
        );
        let raw = self.execute_agent(agent, &instructions, context).await?;

        Ok(TaskOutput {
            description: task.description.clone(),
            agent: agent.role.clone(),
            raw,
            delegations: Vec::new(),
        })
    }

    async fn run_hierarchical(&self, task: &Task, context: Option<&str>) -> Result<TaskOutput, CrewError> {
        let spec = &self.manifest.spec;
        let manager = spec.manager().ok_or(CrewError::NoManager)?;
        let coworkers = spec.coworkers();
        let budget = spec.max_delegations as usize;

        let mut delegations: Vec<Delegation> = Vec::new();
        loop {
            let must_finish = delegations.len() >= budget;
            let messages =
                prompts::manager_messages(manager, &coworkers, task, context, &delegations, must_finish);
            let reply = self.call(manager, &messages).await?;

            let directive = prompts::parse_manager_reply(&reply);
            let (coworker, instructions) = match directive {
                ManagerDirective::Final(answer) => {
                    return Ok(self.finish(task, manager, answer, delegations));
                }
                ManagerDirective::Delegate { .. } if must_finish => {
                    warn!(
                        manager = %manager.role,
                        "Delegation budget spent; using manager reply as final answer"
                    );
                    return Ok(self.finish(task, manager, reply.trim().to_string(), delegations));
                }
                ManagerDirective::Delegate {
                    coworker,
                    instructions,
                } => (coworker, instructions),
            };

            let result = match coworkers.iter().find(|a| a.matches_role(&coworker)) {
                Some(agent) => {
                    if manager.verbose {
                        info!(manager = %manager.role, coworker = %agent.role, "Delegating work");
                    }
                    let assignment = format!(
                        "{}\n\nThis is part of the overall task: {}",
                        instructions,
                        task.description.trim()
                    );
                    self.execute_agent(agent, &assignment, context).await?
                }
                None => {
                    warn!(manager = %manager.role, coworker = %coworker, "Manager delegated to unknown coworker");
                    let available: Vec<&str> = coworkers.iter().map(|a| a.role.as_str()).collect();
                    format!(
                        "Error: there is no coworker named '{}'. Available coworkers: {}.",
                        coworker,
                        available.join(", ")
                    )
                }
            };

            delegations.push(Delegation {
                coworker,
                instructions,
                result,
            });
        }
    }

    fn finish(&self, task: &Task, manager: &Agent, raw: String, delegations: Vec<Delegation>) -> TaskOutput {
        if manager.verbose {
            info!(
                manager = %manager.role,
                delegations = delegations.len(),
                "Final answer ready"
            );
        }
        TaskOutput {
            description: task.description.clone(),
            agent: manager.role.clone(),
            raw,
            delegations,
        }
    }

    async fn execute_agent(
        &self,
        agent: &Agent,
        instructions: &str,
        context: Option<&str>,
    ) -> Result<String, CrewError> {
        if agent.verbose {
            info!(agent = %agent.role, "Agent started: {}", first_line(instructions));
        }
        let messages = prompts::worker_messages(agent, instructions, context);
        let answer = self.call(agent, &messages).await?;
        if agent.verbose {
            info!(agent = %agent.role, "Agent finished");
        }
        Ok(answer)
    }

    async fn call(&self, agent: &Agent, messages: &[ChatMessage]) -> Result<String, CrewError> {
        debug!(agent = %agent.role, messages = messages.len(), "Calling model");
        let response = self.provider.generate(messages, &self.options).await?;
        Ok(response.text.trim().to_string())
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::{FinishReason, GenerationResponse, LLMError, TokenUsage};
    use tokio::sync::Mutex;

    /// Replies are handed out in order; every request is recorded.
    struct ScriptedProvider {
        replies: Mutex<Vec<String>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn generate(
            &self,
            messages: &[ChatMessage],
            _options: &GenerationOptions,
        ) -> Result<GenerationResponse, LLMError> {
            self.requests.lock().await.push(messages.to_vec());
            let text = self
                .replies
                .lock()
                .await
                .pop()
                .ok_or_else(|| LLMError::Provider("script exhausted".to_string()))?;
            Ok(GenerationResponse {
                text,
                usage: TokenUsage::default(),
                provider: "scripted".to_string(),
                model: "scripted".to_string(),
                finish_reason: FinishReason::Stop,
            })
        }

        async fn health_check(&self) -> Result<(), LLMError> {
            Ok(())
        }
    }

    fn system_of(request: &[ChatMessage]) -> &str {
        &request[0].content
    }

    #[tokio::test]
    async fn test_hierarchical_delegates_then_finishes() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "DELEGATE TO Senior Researcher: Gather facts on agent architectures",
            "Facts: planners, workers, critics.",
            "DELEGATE TO technical writer: Turn the facts into a report",
            "# Report\nPlanners and workers.",
            "FINAL ANSWER: # Multi-Agent Systems\nPlanners and workers.",
        ]));
        let runner = CrewRunner::new(CrewManifest::default_crew(), provider.clone());

        let output = runner.kickoff().await.unwrap();

        assert_eq!(output.raw, "# Multi-Agent Systems\nPlanners and workers.");
        assert_eq!(output.to_string(), output.raw);
        assert_eq!(output.tasks_output.len(), 1);
        let task = &output.tasks_output[0];
        assert_eq!(task.agent, "Project Manager");
        assert_eq!(task.delegations.len(), 2);
        assert_eq!(task.delegations[0].result, "Facts: planners, workers, critics.");
        assert_eq!(task.delegations[1].coworker, "technical writer");

        let requests = provider.requests.lock().await;
        assert_eq!(requests.len(), 5);
        assert!(system_of(&requests[0]).contains("You are Project Manager."));
        assert!(system_of(&requests[1]).contains("You are Senior Researcher."));
        assert!(system_of(&requests[3]).contains("You are Technical Writer."));
        // The manager sees earlier results on its next turn.
        assert!(requests[2][1].content.contains("Result: Facts: planners, workers, critics."));
    }

    #[tokio::test]
    async fn test_unknown_coworker_is_corrected_in_log() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "DELEGATE TO Designer: draw diagrams",
            "FINAL ANSWER: done without diagrams",
        ]));
        let runner = CrewRunner::new(CrewManifest::default_crew(), provider.clone());

        let output = runner.kickoff().await.unwrap();

        assert_eq!(output.raw, "done without diagrams");
        let log = &output.tasks_output[0].delegations;
        assert_eq!(log.len(), 1);
        assert!(log[0].result.contains("no coworker named 'Designer'"));
        assert_eq!(provider.requests.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_delegation_budget_forces_final_answer() {
        let mut manifest = CrewManifest::default_crew();
        manifest.spec.max_delegations = 1;
        let provider = Arc::new(ScriptedProvider::new(&[
            "DELEGATE TO Senior Researcher: research",
            "research notes",
            "DELEGATE TO Technical Writer: write",
        ]));
        let runner = CrewRunner::new(manifest, provider.clone());

        let output = runner.kickoff().await.unwrap();

        assert_eq!(output.raw, "DELEGATE TO Technical Writer: write");
        let requests = provider.requests.lock().await;
        assert_eq!(requests.len(), 3);
        assert!(requests[2][1].content.contains("You have no delegations left"));
    }

    #[tokio::test]
    async fn test_sequential_chains_context() {
        let mut manifest = CrewManifest::default_crew();
        manifest.spec.process = Process::Sequential;
        manifest.spec.tasks = vec![
            Task::new("Research agents", "Notes").assigned_to("Senior Researcher"),
            Task::new("Write the report", "Markdown").assigned_to("Technical Writer"),
        ];
        let provider = Arc::new(ScriptedProvider::new(&["notes on agents", "# Report"]));
        let runner = CrewRunner::new(manifest, provider.clone());

        let output = runner.kickoff().await.unwrap();

        assert_eq!(output.raw, "# Report");
        assert_eq!(output.tasks_output[0].agent, "Senior Researcher");
        assert_eq!(output.tasks_output[1].agent, "Technical Writer");

        let requests = provider.requests.lock().await;
        assert!(requests[1][1].content.contains("notes on agents"));
        assert!(requests[1][1].content.contains("expected criteria for your final answer: Markdown"));
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_run() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "DELEGATE TO Senior Researcher: research",
        ]));
        let runner = CrewRunner::new(CrewManifest::default_crew(), provider);

        let err = runner.kickoff().await.unwrap_err();
        assert!(matches!(err, CrewError::Llm(LLMError::Provider(_))));
    }

    #[tokio::test]
    async fn test_invalid_manifest_makes_no_calls() {
        let mut manifest = CrewManifest::default_crew();
        manifest.spec.tasks.clear();
        let provider = Arc::new(ScriptedProvider::new(&[]));
        let runner = CrewRunner::new(manifest, provider.clone());

        assert!(matches!(
            runner.kickoff().await,
            Err(CrewError::InvalidManifest(_))
        ));
        assert!(provider.requests.lock().await.is_empty());
    }
}
