use axum::{extract::State, Json};
use bytes::Bytes;
use serde::Serialize;

use crate::chat::ChatRequest;
use crate::context::{build_chat_prompt, ProfileContext};
use crate::errors::AppError;
use crate::extract::ClientIp;
use crate::llm_client::{CompletionInput, Mode};
use crate::rate_limit::Endpoint;
use crate::session::ensure_session_id;
use crate::state::AppState;
use crate::store::load_chat_context;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

/// POST /api/chat
///
/// Rate limit first, then validation, then the completion. The session id is
/// only resolved once the provider has answered, so a failed turn leaves no
/// history behind.
pub async fn handle_chat(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    if !state.rate_limiter.check(Endpoint::Chat, &client_ip).await {
        return Err(AppError::RateLimited);
    }

    let request = ChatRequest::from_body(&body)?;

    let ctx = match state.store.as_deref() {
        Some(store) => load_chat_context(store)
            .await
            .map_err(|e| AppError::store("Chat failed. Please try again.", e))?,
        None => ProfileContext::default(),
    };

    let system_prompt = build_chat_prompt(&ctx);
    let reply = state
        .llm
        .complete(
            CompletionInput::Conversation(request.messages.clone()),
            &system_prompt,
            Mode::Chat,
        )
        .await
        .map_err(|e| AppError::llm(Mode::Chat, e))?;

    let session_id = ensure_session_id(request.session_id.as_deref())
        .map_err(|e| AppError::validation(e.to_string()))?;

    state.history.record_exchange(
        &session_id,
        request.last_user_message().map(str::to_string),
        reply.clone(),
        &client_ip,
    );

    Ok(Json(ChatResponse {
        response: reply,
        session_id,
    }))
}
