// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod crew_runner;
pub mod prompts;

// Re-export use cases for convenience
pub use crew_runner::{CrewOutput, CrewRunner, TaskOutput};
