// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Governed Provider - Callback Dispatch Around Model Calls
//
// Wraps any LLMProvider so every generate() call is bracketed by the attached
// LlmCallbackHandlers: all on_llm_start hooks run in order before the request,
// all on_llm_end hooks after a successful response. The first start hook that
// refuses aborts the call; the provider is never contacted.

use crate::domain::callbacks::LlmCallbackHandler;
use crate::domain::llm::{ChatMessage, GenerationOptions, GenerationResponse, LLMError, LLMProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub struct GovernedProvider {
    inner: Arc<dyn LLMProvider>,
    handlers: Vec<Arc<dyn LlmCallbackHandler>>,
}

impl GovernedProvider {
    pub fn new(inner: Arc<dyn LLMProvider>) -> Self {
        Self {
            inner,
            handlers: Vec::new(),
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn LlmCallbackHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Flatten a conversation into the prompt strings handed to callbacks.
    pub fn render_prompts(messages: &[ChatMessage]) -> Vec<String> {
        messages.iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl LLMProvider for GovernedProvider {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        let prompts = Self::render_prompts(messages);
        for handler in &self.handlers {
            handler.on_llm_start(&prompts).await?;
        }

        let response = self.inner.generate(messages, options).await?;

        for handler in &self.handlers {
            handler.on_llm_end(&response).await;
        }
        Ok(response)
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        self.inner.health_check().await
    }
}
