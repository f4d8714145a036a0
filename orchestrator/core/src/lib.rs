// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `overseer-core`
//!
//! Governed execution of role-playing agent crews.
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `ExecutionGovernor`, `LLMProvider`, crew model |
//! | [`application`] | Application | `CrewRunner`, prompt construction |
//! | [`infrastructure`] | Infrastructure | OpenAI adapter, pause signals, manifest parser |

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
