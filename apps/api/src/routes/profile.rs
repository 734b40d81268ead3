use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::profile::{CandidateProfile, Experience, Skill, SuggestedQuestion};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: Option<CandidateProfile>,
    pub experiences: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub suggested_questions: Vec<SuggestedQuestion>,
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let store = state.require_store()?;

    let (profile, experiences, skills, suggested_questions) = tokio::try_join!(
        store.profile(),
        store.experiences(),
        store.skills(),
        store.suggested_questions(),
    )
    .map_err(|e| AppError::store("Failed to fetch profile", e))?;

    Ok(Json(ProfileResponse {
        profile,
        experiences,
        skills,
        suggested_questions,
    }))
}
