//! Conversational endpoint: request validation and the `/api/chat` handler.

pub mod handlers;

use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::ChatMessage;
use crate::models::history::ChatRole;
use crate::session::is_valid_session_id;

pub const MAX_MESSAGES: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// A chat request that passed every shape check.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Validates a raw body. Checks run in a fixed order and the first failure
    /// wins: messages present, session id shape, message count, then each
    /// message's role, content and length.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let raw_messages = payload
            .get("messages")
            .and_then(Value::as_array)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::validation("Messages array is required"))?;

        let session_id = match payload.get("sessionId") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) if id.is_empty() => None,
            Some(Value::String(id)) if is_valid_session_id(id) => Some(id.clone()),
            Some(_) => return Err(AppError::validation("Invalid session ID format")),
        };

        if raw_messages.len() > MAX_MESSAGES {
            return Err(AppError::validation("Too many messages (max 50)"));
        }

        let messages = raw_messages
            .iter()
            .map(parse_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            messages,
            session_id,
        })
    }

    /// Content of the most recent user-role message.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

fn parse_message(raw: &Value) -> Result<ChatMessage, AppError> {
    let role = raw
        .get("role")
        .and_then(Value::as_str)
        .and_then(ChatRole::parse)
        .ok_or_else(|| AppError::validation("Invalid message role"))?;

    let content = raw
        .get("content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("Invalid message content"))?;

    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::validation(
            "Message too long (max 2000 characters)",
        ));
    }

    Ok(ChatMessage {
        role,
        content: content.to_string(),
    })
}
