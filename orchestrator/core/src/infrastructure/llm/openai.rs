// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI chat completions API.
// Also works with OpenAI-compatible APIs (LM Studio, vLLM, proxies, etc.)

use crate::domain::llm::{
    ChatMessage, ChatRole, FinishReason, GenerationOptions, GenerationResponse, LLMError,
    LLMProvider, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAIAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: ChatRole,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAIAdapter {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            // An empty key means "no auth", as with local servers.
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIAdapter {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        if messages.is_empty() {
            return Err(LLMError::InvalidInput("No messages to send".into()));
        }

        // Translate our domain types to OpenAI's types
        let request = OpenAIRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role,
                    content: Some(m.content.clone()),
                })
                .collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stop: options.stop_sequences.clone(),
        };

        let response = self
            .authorize(self.client.post(self.url("chat/completions")))
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => LLMError::Authentication(error_text),
                429 => LLMError::RateLimit,
                404 => LLMError::ModelNotFound(self.model.clone()),
                _ => LLMError::Provider(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse response: {}", e)))?;

        // Translate OpenAI's response to our domain types
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::Provider("No response from model".into()))?;

        let usage = openai_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(GenerationResponse {
            text: choice.message.content.unwrap_or_default(),
            usage,
            provider: "openai".to_string(),
            model: self.model.clone(),
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
        })
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        let response = self
            .authorize(self.client.get(self.url("models")))
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(LLMError::Authentication("Invalid API key".into()))
        } else {
            Err(LLMError::Network(format!("HTTP {}", status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are Senior Researcher."),
            ChatMessage::user("Summarize agent architectures."),
        ]
    }

    #[tokio::test]
    async fn test_generate_translates_request_and_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.5,
                "messages": [
                    {"role": "system", "content": "You are Senior Researcher."},
                    {"role": "user", "content": "Summarize agent architectures."}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [{"message": {"role": "assistant", "content": "Agents coordinate."}, "finish_reason": "length"}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
                }"#,
            )
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(
            format!("{}/", server.url()),
            Some("sk-test".to_string()),
            "gpt-4o-mini".to_string(),
        );
        let options = GenerationOptions {
            temperature: Some(0.5),
            ..Default::default()
        };

        let response = adapter.generate(&messages(), &options).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.text, "Agents coordinate.");
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert_eq!(response.usage.total_tokens, 15);
        assert_eq!(response.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_missing_key_sends_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#)
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), Some(String::new()), "local".to_string());
        let response = adapter
            .generate(&messages(), &GenerationOptions::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text, "ok");
        assert_eq!(response.usage, TokenUsage::default());
    }

    async fn error_for_status(status: usize) -> LLMError {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(status)
            .with_body("nope")
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), None, DEFAULT_MODEL.to_string());
        adapter
            .generate(&messages(), &GenerationOptions::default())
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_status_codes_map_to_errors() {
        assert!(matches!(error_for_status(401).await, LLMError::Authentication(_)));
        assert!(matches!(error_for_status(403).await, LLMError::Authentication(_)));
        assert!(matches!(error_for_status(429).await, LLMError::RateLimit));
        assert!(matches!(error_for_status(404).await, LLMError::ModelNotFound(_)));
        assert!(matches!(error_for_status(500).await, LLMError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), None, "gpt-4o-mini".to_string());
        let err = adapter
            .generate(&messages(), &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let adapter = OpenAIAdapter::new(DEFAULT_API_BASE.to_string(), None, DEFAULT_MODEL.to_string());
        let err = adapter
            .generate(&[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_health_check_hits_models_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/models")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), Some("sk".to_string()), DEFAULT_MODEL.to_string());
        adapter.health_check().await.unwrap();
        mock.assert_async().await;
    }
}
