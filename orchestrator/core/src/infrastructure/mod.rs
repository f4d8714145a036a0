// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod llm;
pub mod pause_signal;
pub mod crew_manifest_parser;

pub use pause_signal::{FilePauseSignal, FlagPauseSignal};
