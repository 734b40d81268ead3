use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::history::{NewAnalysis, NewChatTurn};
use crate::models::profile::{
    AiInstruction, CandidateProfile, Experience, FaqResponse, GapWeakness, InstructionCategory,
    Skill, SuggestedQuestion,
};
use crate::store::{PortfolioStore, StoreError};

/// `PortfolioStore` backed by the Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PortfolioStore for PgStore {
    async fn profile(&self) -> Result<Option<CandidateProfile>, StoreError> {
        let profile = sqlx::query_as::<_, CandidateProfile>("SELECT * FROM candidate_profile LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn experiences(&self) -> Result<Vec<Experience>, StoreError> {
        let rows = sqlx::query_as::<_, Experience>(
            "SELECT * FROM experiences ORDER BY display_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn skills(&self) -> Result<Vec<Skill>, StoreError> {
        let rows = sqlx::query_as::<_, Skill>(
            "SELECT * FROM skills ORDER BY proficiency, display_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn gaps(&self) -> Result<Vec<GapWeakness>, StoreError> {
        let rows = sqlx::query_as::<_, GapWeakness>(
            "SELECT * FROM gaps_weaknesses ORDER BY is_dealbreaker DESC, display_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn faqs(&self) -> Result<Vec<FaqResponse>, StoreError> {
        let rows = sqlx::query_as::<_, FaqResponse>(
            "SELECT * FROM faq_responses ORDER BY display_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn suggested_questions(&self) -> Result<Vec<SuggestedQuestion>, StoreError> {
        let rows = sqlx::query_as::<_, SuggestedQuestion>(
            "SELECT question, answer FROM faq_responses WHERE is_suggested = TRUE ORDER BY display_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn active_instructions(
        &self,
        category: Option<InstructionCategory>,
    ) -> Result<Vec<AiInstruction>, StoreError> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, AiInstruction>(
                    "SELECT * FROM ai_instructions WHERE is_active = TRUE AND category = $1 ORDER BY priority DESC",
                )
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AiInstruction>(
                    "SELECT * FROM ai_instructions WHERE is_active = TRUE ORDER BY priority DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn insert_chat_turn(&self, turn: &NewChatTurn) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO chat_history (session_id, role, content, metadata) VALUES ($1, $2, $3, $4)",
        )
        .bind(&turn.session_id)
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(&turn.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_analysis(&self, record: &NewAnalysis) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jd_analyses
                (job_description, verdict, where_i_dont_fit, what_transfers,
                 recommendation, opening_paragraph, is_demo, demo_type, session_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.job_description)
        .bind(record.verdict.as_str())
        .bind(&record.where_i_dont_fit)
        .bind(&record.what_transfers)
        .bind(&record.recommendation)
        .bind(&record.opening_paragraph)
        .bind(record.is_demo)
        .bind(&record.demo_type)
        .bind(&record.session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Unavailable("connection pool is closed".to_string()));
        }
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
