use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{api_error, CompletionProvider, CompletionRequest, Mode, ProviderError, MAX_TOKENS};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const CHAT_MODEL: &str = "gpt-4o-mini";
const ANALYSIS_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiResponse {
    /// First choice's content, or empty when the model returned none.
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}

/// OpenAI chat-completions backend. The system prompt travels as the first
/// message.
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    pub fn model(mode: Mode) -> &'static str {
        match mode {
            Mode::Chat => CHAT_MODEL,
            Mode::Analysis => ANALYSIS_MODEL,
        }
    }
}

fn build_messages(request: &CompletionRequest) -> Vec<OpenAiMessage<'_>> {
    std::iter::once(OpenAiMessage {
        role: "system",
        content: &request.system,
    })
    .chain(request.messages.iter().map(|m| OpenAiMessage {
        role: m.role.as_str(),
        content: &m.content,
    }))
    .collect()
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("OpenAI"))?;

        let body = OpenAiRequest {
            model: Self::model(request.mode),
            messages: build_messages(request),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: OpenAiResponse = response.json().await?;
        Ok(parsed.into_text())
    }
}
