//! Session ids, caller-IP hashing and best-effort history persistence.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::error;

use crate::models::history::{ChatRole, NewAnalysis, NewChatTurn};
use crate::store::PortfolioStore;

pub const MAX_SESSION_ID_LEN: usize = 64;
/// Stored JD text is capped independently of the 10,000-char request limit.
pub const MAX_STORED_JD_CHARS: usize = 5000;
const SESSION_RANDOM_BYTES: usize = 12;

static SESSION_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^session_[0-9]+_[a-f0-9]{9,24}$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid session ID format")]
pub struct InvalidSessionId;

/// `session_<unix millis>_<24 hex chars from the OS RNG>`.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!(
        "session_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        hex::encode(bytes)
    )
}

pub fn is_valid_session_id(id: &str) -> bool {
    id.len() <= MAX_SESSION_ID_LEN && SESSION_ID_PATTERN.is_match(id)
}

/// Returns `existing` untouched when well-formed, a fresh id when absent.
/// A malformed id is an error, never replaced.
pub fn ensure_session_id(existing: Option<&str>) -> Result<String, InvalidSessionId> {
    match existing {
        Some(id) if is_valid_session_id(id) => Ok(id.to_string()),
        Some(_) => Err(InvalidSessionId),
        None => Ok(generate_session_id()),
    }
}

/// First 16 hex chars of sha256("{salt}:{ip}").
pub fn hash_ip(salt: &str, ip: &str) -> String {
    let digest = Sha256::digest(format!("{salt}:{ip}").as_bytes());
    let mut hashed = hex::encode(digest);
    hashed.truncate(16);
    hashed
}

/// Cuts `s` to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Writes chat turns and analyses in the background. Failures are logged and
/// dropped: the caller already has its answer.
#[derive(Clone)]
pub struct HistoryTracker {
    store: Option<Arc<dyn PortfolioStore>>,
    salt: Arc<str>,
}

impl HistoryTracker {
    pub fn new(store: Option<Arc<dyn PortfolioStore>>, salt: &str) -> Self {
        Self {
            store,
            salt: Arc::from(salt),
        }
    }

    pub fn hash_ip(&self, ip: &str) -> String {
        hash_ip(&self.salt, ip)
    }

    /// Persists one turn, swallowing any storage error.
    pub async fn record_turn(&self, turn: NewChatTurn) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if let Err(e) = store.insert_chat_turn(&turn).await {
            error!(
                "Failed to save chat turn ({}): {e}",
                turn.role.as_str()
            );
        }
    }

    /// Spawns the user turn (when there is one) then the assistant reply, in
    /// that order.
    pub fn record_exchange(
        &self,
        session_id: &str,
        user_content: Option<String>,
        reply: String,
        client_ip: &str,
    ) -> Option<JoinHandle<()>> {
        self.store.as_ref()?;

        let user_turn = user_content.map(|content| NewChatTurn {
            session_id: session_id.to_string(),
            role: ChatRole::User,
            content,
            metadata: json!({ "ip": self.hash_ip(client_ip) }),
        });
        let assistant_turn = NewChatTurn {
            session_id: session_id.to_string(),
            role: ChatRole::Assistant,
            content: reply,
            metadata: json!({}),
        };

        let tracker = self.clone();
        Some(tokio::spawn(async move {
            if let Some(turn) = user_turn {
                tracker.record_turn(turn).await;
            }
            tracker.record_turn(assistant_turn).await;
        }))
    }

    /// Spawns the analysis insert. The stored JD is truncated to
    /// `MAX_STORED_JD_CHARS`.
    pub fn record_analysis(&self, mut record: NewAnalysis) -> Option<JoinHandle<()>> {
        let store = self.store.clone()?;

        let kept = truncate_chars(&record.job_description, MAX_STORED_JD_CHARS).len();
        record.job_description.truncate(kept);

        Some(tokio::spawn(async move {
            if let Err(e) = store.insert_analysis(&record).await {
                error!("Failed to save analysis: {e}");
            }
        }))
    }
}
