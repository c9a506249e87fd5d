//! Completion API Client
//!
//! Provider-agnostic chat completion interface plus an implementation for
//! any OpenAI-compatible `/chat/completions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompletionSettings;
use crate::domain::ChatRole;

/// One prior turn sent as conversation context.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionTurn {
    pub role: ChatRole,
    pub content: String,
}

impl CompletionTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A full completion request: system preamble followed by the turns in order.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub turns: Vec<CompletionTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request timed out")]
    Timeout,

    #[error("completion server unreachable: {0}")]
    Unreachable(String),

    #[error("completion request failed: {0}")]
    RequestFailed(String),

    #[error("completion response parse error: {0}")]
    ParseError(String),
}

/// Chat completion provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the request and return the assistant reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompletionClient {
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CompletionError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            model: settings.model.clone(),
        })
    }

    fn to_wire(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: request.system.clone(),
        });
        messages.extend(request.turns.iter().map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: turn.content.clone(),
        }));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self.client.post(&url).json(&self.to_wire(request));
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else if e.is_connect() {
                CompletionError::Unreachable(e.to_string())
            } else {
                CompletionError::RequestFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::RequestFailed(format!("HTTP {status}: {body}")));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::ParseError("no content in response".to_string()))
    }
}
