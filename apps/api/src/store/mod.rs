//! Persistent store seam. Handlers only see `PortfolioStore`; the Postgres
//! implementation is chosen at startup and tests substitute `MemoryStore`.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::{ProfileContext, SkillsByProficiency};
use crate::models::history::{NewAnalysis, NewChatTurn};
use crate::models::profile::{
    AiInstruction, CandidateProfile, Experience, FaqResponse, GapWeakness, InstructionCategory,
    Skill, SuggestedQuestion,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write contract the core consumes. Reads are ordered by `display_order`
/// (skills by proficiency first); instruction reads return active rows only,
/// priority descending.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn profile(&self) -> Result<Option<CandidateProfile>, StoreError>;

    async fn experiences(&self) -> Result<Vec<Experience>, StoreError>;

    async fn skills(&self) -> Result<Vec<Skill>, StoreError>;

    /// Dealbreakers first.
    async fn gaps(&self) -> Result<Vec<GapWeakness>, StoreError>;

    async fn faqs(&self) -> Result<Vec<FaqResponse>, StoreError>;

    async fn suggested_questions(&self) -> Result<Vec<SuggestedQuestion>, StoreError>;

    async fn active_instructions(
        &self,
        category: Option<InstructionCategory>,
    ) -> Result<Vec<AiInstruction>, StoreError>;

    async fn insert_chat_turn(&self, turn: &NewChatTurn) -> Result<(), StoreError>;

    async fn insert_analysis(&self, record: &NewAnalysis) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Fetches everything the chat prompt renders. The reads run concurrently and
/// any single failure fails the whole load.
pub async fn load_chat_context(store: &dyn PortfolioStore) -> Result<ProfileContext, StoreError> {
    let (profile, experiences, skills, gaps, faqs, instructions) = tokio::try_join!(
        store.profile(),
        store.experiences(),
        store.skills(),
        store.gaps(),
        store.faqs(),
        store.active_instructions(None),
    )?;

    Ok(ProfileContext {
        profile,
        experiences,
        skills: SkillsByProficiency::partition(skills),
        gaps,
        faqs,
        instructions,
    })
}

/// Fetches the subset the analysis prompt renders: no experiences or FAQs,
/// anti-sycophancy instructions only.
pub async fn load_analysis_context(
    store: &dyn PortfolioStore,
) -> Result<ProfileContext, StoreError> {
    let (profile, skills, gaps, instructions) = tokio::try_join!(
        store.profile(),
        store.skills(),
        store.gaps(),
        store.active_instructions(Some(InstructionCategory::AntiSycophancy)),
    )?;

    Ok(ProfileContext {
        profile,
        skills: SkillsByProficiency::partition(skills),
        gaps,
        instructions,
        ..ProfileContext::default()
    })
}
