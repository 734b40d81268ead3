use axum::{extract::State, Json};
use bytes::Bytes;
use serde_json::Value;
use tracing::info;

use crate::analysis::{parse_verdict, AnalysisResult};
use crate::context::{build_analysis_prompt, format_analysis_user_message, ProfileContext};
use crate::errors::AppError;
use crate::extract::ClientIp;
use crate::llm_client::{CompletionInput, Mode};
use crate::models::history::NewAnalysis;
use crate::rate_limit::Endpoint;
use crate::state::AppState;
use crate::store::load_analysis_context;

pub const MAX_JOB_DESCRIPTION_CHARS: usize = 10_000;

/// POST /api/analyze-jd
///
/// The body is taken as raw bytes so the rate limit is charged before any
/// parsing or validation.
pub async fn handle_analyze_jd(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    body: Bytes,
) -> Result<Json<AnalysisResult>, AppError> {
    if !state.rate_limiter.check(Endpoint::AnalyzeJd, &client_ip).await {
        return Err(AppError::RateLimited);
    }

    let job_description = job_description_from_body(&body)?;

    let ctx = match state.store.as_deref() {
        Some(store) => load_analysis_context(store)
            .await
            .map_err(|e| AppError::store("Analysis failed. Please try again.", e))?,
        None => ProfileContext::default(),
    };

    let system_prompt = build_analysis_prompt(&ctx);
    let raw = state
        .llm
        .complete(
            CompletionInput::Single(format_analysis_user_message(&job_description)),
            &system_prompt,
            Mode::Analysis,
        )
        .await
        .map_err(|e| AppError::llm(Mode::Analysis, e))?;

    let result = parse_verdict(&raw)?;
    info!("JD analysis complete: verdict={}", result.verdict.as_str());

    state.history.record_analysis(NewAnalysis {
        job_description,
        verdict: result.verdict,
        where_i_dont_fit: result.where_i_dont_fit.clone(),
        what_transfers: result.what_transfers.clone(),
        recommendation: result.recommendation.clone(),
        opening_paragraph: result.opening_paragraph.clone(),
        is_demo: false,
        demo_type: None,
        session_id: Some(state.history.hash_ip(&client_ip)),
    });

    Ok(Json(result))
}

fn job_description_from_body(body: &[u8]) -> Result<String, AppError> {
    let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let job_description = payload
        .get("jobDescription")
        .and_then(Value::as_str)
        .filter(|jd| !jd.is_empty())
        .ok_or_else(|| AppError::validation("Job description is required"))?;

    if job_description.chars().count() > MAX_JOB_DESCRIPTION_CHARS {
        return Err(AppError::validation(
            "Job description is too long (max 10000 characters)",
        ));
    }

    Ok(job_description.to_string())
}
