use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::models::history::Verdict;

const LOGGED_RESPONSE_CHARS: usize = 200;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap());

#[derive(Debug, Error)]
pub enum MalformedResponseError {
    #[error("completion is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("completion has a missing or unknown verdict")]
    InvalidVerdict,
}

/// Fit analysis as returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verdict: Verdict,
    pub opening_paragraph: String,
    pub where_i_dont_fit: Vec<String>,
    pub what_transfers: Vec<String>,
    pub recommendation: String,
}

/// Parses a completion into an `AnalysisResult`.
///
/// A fenced code block, if present, is parsed instead of the whole text. Only
/// `verdict` is required; the other fields default to empty.
pub fn parse_verdict(raw: &str) -> Result<AnalysisResult, MalformedResponseError> {
    let body = FENCED_BLOCK
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str());

    let parsed: Value = serde_json::from_str(body.trim()).map_err(|e| {
        error!("Failed to parse AI response: {}", truncate_for_log(raw));
        MalformedResponseError::Parse(e)
    })?;

    let verdict = parsed
        .get("verdict")
        .and_then(Value::as_str)
        .and_then(Verdict::parse)
        .ok_or(MalformedResponseError::InvalidVerdict)?;

    Ok(AnalysisResult {
        verdict,
        opening_paragraph: string_field(&parsed, "openingParagraph"),
        where_i_dont_fit: string_list(&parsed, "whereIDontFit"),
        what_transfers: string_list(&parsed, "whatTransfers"),
        recommendation: string_field(&parsed, "recommendation"),
    })
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn truncate_for_log(raw: &str) -> String {
    if raw.chars().count() > LOGGED_RESPONSE_CHARS {
        let head: String = raw.chars().take(LOGGED_RESPONSE_CHARS).collect();
        format!("{head} [TRUNCATED]")
    } else {
        raw.to_string()
    }
}
