//! Append-only analytics records written by the session tracker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Fit verdict returned by the analysis provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongFit,
    WorthConversation,
    ProbablyNot,
}

impl Verdict {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "strong_fit" => Some(Verdict::StrongFit),
            "worth_conversation" => Some(Verdict::WorthConversation),
            "probably_not" => Some(Verdict::ProbablyNot),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::StrongFit => "strong_fit",
            Verdict::WorthConversation => "worth_conversation",
            Verdict::ProbablyNot => "probably_not",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatTurn {
    pub session_id: String,
    pub role: ChatRole,
    pub content: String,
    pub metadata: Value,
}

/// A JD analysis row. Live rows carry a hashed caller identity in `session_id`;
/// demo rows come from the seed bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnalysis {
    pub job_description: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub where_i_dont_fit: Vec<String>,
    #[serde(default)]
    pub what_transfers: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub opening_paragraph: String,
    #[serde(default)]
    pub is_demo: bool,
    pub demo_type: Option<String>,
    pub session_id: Option<String>,
}
