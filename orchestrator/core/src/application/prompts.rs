// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Prompt construction and manager reply parsing for crew runs.

use crate::domain::crew::{Agent, Task};
use crate::domain::llm::ChatMessage;
use std::fmt::Write;

const DELEGATE_PREFIX: &str = "DELEGATE TO ";
const FINAL_PREFIX: &str = "FINAL ANSWER:";

/// One coworker hand-off recorded during a hierarchical task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub coworker: String,
    pub instructions: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerDirective {
    Delegate { coworker: String, instructions: String },
    Final(String),
}

fn agent_persona(agent: &Agent) -> ChatMessage {
    ChatMessage::system(format!(
        "You are {}. {}\nYour personal goal is: {}",
        agent.role, agent.backstory, agent.goal
    ))
}

/// Conversation for a specialist working on a single assignment.
pub fn worker_messages(agent: &Agent, instructions: &str, context: Option<&str>) -> Vec<ChatMessage> {
    let mut body = format!("Current task: {}\n", instructions.trim());
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        let _ = write!(body, "\nContext you can use:\n{}\n", context.trim());
    }
    body.push_str("\nGive your complete answer. It must be your own work, not a plan.");

    vec![agent_persona(agent), ChatMessage::user(body)]
}

/// Conversation for a manager deciding the next step of a task.
pub fn manager_messages(
    manager: &Agent,
    coworkers: &[&Agent],
    task: &Task,
    context: Option<&str>,
    delegations: &[Delegation],
    must_finish: bool,
) -> Vec<ChatMessage> {
    let mut body = String::new();
    let _ = writeln!(body, "Task: {}", task.description.trim());
    let _ = writeln!(body, "Expected output: {}", task.expected_output.trim());

    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        let _ = write!(body, "\nContext from earlier work:\n{}\n", context.trim());
    }

    body.push_str("\nYour coworkers:\n");
    for coworker in coworkers {
        let _ = writeln!(body, "- {}: {}", coworker.role, coworker.goal);
    }

    if !delegations.is_empty() {
        body.push_str("\nDelegation log:\n");
        for (i, d) in delegations.iter().enumerate() {
            let _ = writeln!(body, "{}. {} was asked: {}", i + 1, d.coworker, d.instructions);
            let _ = writeln!(body, "   Result: {}", d.result);
        }
    }

    if must_finish {
        body.push_str(
            "\nYou have no delegations left. Reply with\n\
             FINAL ANSWER: <the complete deliverable>",
        );
    } else {
        body.push_str(
            "\nReply with exactly one of:\n\
             DELEGATE TO <coworker role>: <instructions for that coworker>\n\
             FINAL ANSWER: <the complete deliverable>",
        );
    }

    vec![agent_persona(manager), ChatMessage::user(body)]
}

/// Strip `prefix` from the start of `line`, ignoring ASCII case.
fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

/// Interpret a manager reply. The first directive line wins; a reply with no
/// directive is taken as the final answer.
pub fn parse_manager_reply(reply: &str) -> ManagerDirective {
    let lines: Vec<&str> = reply.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim_start();
        let rest_of_reply = || lines[i + 1..].join("\n");

        if let Some(answer) = strip_prefix_ignore_case(line, FINAL_PREFIX) {
            let mut text = answer.trim().to_string();
            let rest = rest_of_reply();
            if !rest.trim().is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&rest);
            }
            return ManagerDirective::Final(text.trim().to_string());
        }

        if let Some(target) = strip_prefix_ignore_case(line, DELEGATE_PREFIX) {
            if let Some((coworker, first)) = target.split_once(':') {
                let mut instructions = first.trim().to_string();
                let rest = rest_of_reply();
                if !rest.trim().is_empty() {
                    if !instructions.is_empty() {
                        instructions.push('\n');
                    }
                    instructions.push_str(rest.trim());
                }
                return ManagerDirective::Delegate {
                    coworker: coworker.trim().to_string(),
                    instructions,
                };
            }
        }
    }

    ManagerDirective::Final(reply.trim().to_string())
}
