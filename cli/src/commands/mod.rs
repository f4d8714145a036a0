// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the overseer CLI

pub mod control;
pub mod crew;
pub mod overview;
pub mod run;

pub use self::control::ControlArgs;
pub use self::crew::CrewCommand;
pub use self::overview::OverviewArgs;
pub use self::run::RunArgs;
