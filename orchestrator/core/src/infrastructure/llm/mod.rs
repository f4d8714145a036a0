// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// openai: OpenAI-compatible chat completions adapter.
// governed: callback dispatch wrapper used to attach the execution governor.

pub mod openai;
pub mod governed;

pub use governed::GovernedProvider;
pub use openai::OpenAIAdapter;
