/// LLM Client: the single point of entry for completion calls in Folio.
///
/// Handlers never talk to a provider API directly. The backend (OpenAI or
/// Anthropic) is picked once at startup and hidden behind `CompletionProvider`;
/// `LlmClient` adds the hard request timeout on top.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AiProviderKind, Config};
use crate::models::history::ChatRole;

pub mod anthropic;
pub mod openai;

#[cfg(test)]
pub mod stub;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Hard ceiling on a single completion call, network included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI request timed out. Please try again.")]
    Timeout,
}

/// Request mode. Each backend maps it to its own model: chat gets the cheaper
/// model, analysis the stronger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Chat,
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CompletionInput {
    /// One instruction, sent as a single user message.
    Single(String),
    /// Multi-turn conversation, forwarded in order with roles intact.
    Conversation(Vec<ChatMessage>),
}

impl CompletionInput {
    fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            CompletionInput::Single(text) => vec![ChatMessage::user(text)],
            CompletionInput::Conversation(messages) => messages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub mode: Mode,
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Performs one completion. No retries.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Builds the provider selected by `AI_PROVIDER`.
pub fn provider_from_config(config: &Config) -> Arc<dyn CompletionProvider> {
    match config.ai_provider {
        AiProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config.openai_api_key.clone())),
        AiProviderKind::Anthropic => {
            Arc::new(AnthropicProvider::new(config.anthropic_api_key.clone()))
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Runs one completion under the request timeout.
    ///
    /// The provider future is dropped on timeout, which aborts the outbound
    /// request. Dropping this future (caller went away) has the same effect.
    pub async fn complete(
        &self,
        input: CompletionInput,
        system: &str,
        mode: Mode,
    ) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            mode,
            system: system.to_string(),
            messages: input.into_messages(),
        };

        match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-2xx provider response into `ProviderError::Api`, preferring the
/// provider's own error message over the raw body.
async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    ProviderError::Api { status, message }
}
