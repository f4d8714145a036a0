// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Pure types and traits for governed crew execution.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Governor, LLM provider interface, callbacks, crew model

pub mod governor;
pub mod llm;
pub mod callbacks;
pub mod crew;
