// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Callback hooks invoked around every model call.
//!
//! Handlers are attached to a provider through
//! `infrastructure::llm::GovernedProvider`. A handler that returns an error
//! from `on_llm_start` stops the call before the provider is reached.

use crate::domain::governor::{ExecutionGovernor, GovernorError};
use crate::domain::llm::GenerationResponse;
use async_trait::async_trait;

#[async_trait]
pub trait LlmCallbackHandler: Send + Sync {
    async fn on_llm_start(&self, prompts: &[String]) -> Result<(), GovernorError>;
    async fn on_llm_end(&self, response: &GenerationResponse);
}

#[async_trait]
impl LlmCallbackHandler for ExecutionGovernor {
    async fn on_llm_start(&self, prompts: &[String]) -> Result<(), GovernorError> {
        self.on_call_start(prompts).await
    }

    async fn on_llm_end(&self, response: &GenerationResponse) {
        self.on_call_end(response);
    }
}
