use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::MalformedResponseError;
use crate::cache::CacheError;
use crate::llm_client::{Mode, ProviderError};
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Clients get a fixed message per variant; the underlying cause is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("LLM error: {source}")]
    Llm {
        mode: Mode,
        #[source]
        source: ProviderError,
    },

    #[error("Malformed completion: {0}")]
    MalformedResponse(#[from] MalformedResponseError),

    #[error("Database not configured")]
    StoreUnavailable,

    #[error("Database error: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Cache error: {source}")]
    Cache {
        message: &'static str,
        #[source]
        source: CacheError,
    },
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn llm(mode: Mode, source: ProviderError) -> Self {
        AppError::Llm { mode, source }
    }

    pub fn store(message: &'static str, source: StoreError) -> Self {
        AppError::Store { message, source }
    }

    pub fn cache(message: &'static str, source: CacheError) -> Self {
        AppError::Cache { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded. Try again later.".to_string(),
            ),
            AppError::Llm { mode, source } => {
                tracing::error!("LLM error ({mode:?}): {source}");
                let message = match mode {
                    Mode::Analysis => "Analysis failed. Please try again.",
                    Mode::Chat => "Chat failed. Please try again.",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    message.to_string(),
                )
            }
            AppError::MalformedResponse(e) => {
                let message = match e {
                    MalformedResponseError::Parse(_) => "Failed to parse analysis results",
                    MalformedResponseError::InvalidVerdict => "Invalid analysis response",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_RESPONSE",
                    message.to_string(),
                )
            }
            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Database not available".to_string(),
            ),
            AppError::Store { message, source } => {
                tracing::error!("Database error: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    message.to_string(),
                )
            }
            AppError::Cache { message, source } => {
                tracing::error!("Cache error: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    message.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
