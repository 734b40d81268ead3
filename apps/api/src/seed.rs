//! Seed bundle loading and idempotent application.
//!
//! Sources, first match wins: `SEED_DATA_BASE64` (one JSON object), then
//! `SEED_DATA_DIR` (one JSON file per table). Every present table is truncated
//! and refilled inside a single transaction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::config::Config;
use crate::models::history::NewAnalysis;
use crate::models::profile::{
    AiInstruction, CandidateProfile, Experience, FaqResponse, GapWeakness, Skill,
};

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    pub profile: Option<CandidateProfile>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub gaps: Vec<GapWeakness>,
    #[serde(default)]
    pub faq: Vec<FaqResponse>,
    #[serde(default)]
    pub ai_instructions: Vec<AiInstruction>,
    #[serde(default)]
    pub demo_jds: Vec<NewAnalysis>,
}

impl SeedData {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.experiences.is_empty()
            && self.skills.is_empty()
            && self.gaps.is_empty()
            && self.faq.is_empty()
            && self.ai_instructions.is_empty()
            && self.demo_jds.is_empty()
    }
}

/// Resolves the configured seed source. `Ok(None)` means nothing to seed.
pub fn load(config: &Config) -> Result<Option<SeedData>> {
    if let Some(encoded) = &config.seed_data_base64 {
        info!("Loading seed data from SEED_DATA_BASE64");
        return decode_base64(encoded).map(Some);
    }

    if let Some(dir) = &config.seed_data_dir {
        if dir.is_dir() {
            info!("Loading seed data from {}", dir.display());
            return load_dir(dir).map(Some);
        }
        info!("Seed directory {} not found, skipping", dir.display());
    }

    Ok(None)
}

pub fn decode_base64(encoded: &str) -> Result<SeedData> {
    let bytes = BASE64
        .decode(encoded.trim())
        .context("SEED_DATA_BASE64 is not valid base64")?;
    serde_json::from_slice(&bytes).context("SEED_DATA_BASE64 is not a valid seed bundle")
}

pub fn load_dir(dir: &Path) -> Result<SeedData> {
    Ok(SeedData {
        profile: read_optional(dir, "profile.json")?,
        experiences: read_optional(dir, "experiences.json")?.unwrap_or_default(),
        skills: read_optional(dir, "skills.json")?.unwrap_or_default(),
        gaps: read_optional(dir, "gaps.json")?.unwrap_or_default(),
        faq: read_optional(dir, "faq.json")?.unwrap_or_default(),
        ai_instructions: read_optional(dir, "ai_instructions.json")?.unwrap_or_default(),
        demo_jds: read_optional(dir, "demo_jds.json")?.unwrap_or_default(),
    })
}

fn read_optional<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Option<T>> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(parsed))
}

/// Writes the bundle. Demo analyses replace only earlier demo rows; live
/// analyses are kept. Any failure rolls everything back.
pub async fn apply(pool: &PgPool, data: &SeedData) -> Result<()> {
    let mut tx = pool.begin().await?;

    if let Some(profile) = &data.profile {
        truncate(&mut tx, "candidate_profile").await?;
        sqlx::query(
            r#"
            INSERT INTO candidate_profile
                (name, title, taglines, bio, location, status,
                 preferred_roles, preferred_company_stages, years_experience, education_summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.title)
        .bind(&profile.taglines)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.status)
        .bind(&profile.preferred_roles)
        .bind(&profile.preferred_company_stages)
        .bind(profile.years_experience)
        .bind(&profile.education_summary)
        .execute(&mut *tx)
        .await?;
        info!("Seeded candidate_profile");
    }

    if !data.experiences.is_empty() {
        truncate(&mut tx, "experiences").await?;
        for exp in &data.experiences {
            sqlx::query(
                r#"
                INSERT INTO experiences
                    (company, role, start_date, end_date, location, description,
                     situation, approach, technical_work, lessons_learned, highlights, display_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(&exp.company)
            .bind(&exp.role)
            .bind(exp.start_date)
            .bind(exp.end_date)
            .bind(&exp.location)
            .bind(&exp.description)
            .bind(&exp.situation)
            .bind(&exp.approach)
            .bind(&exp.technical_work)
            .bind(&exp.lessons_learned)
            .bind(&exp.highlights)
            .bind(exp.display_order)
            .execute(&mut *tx)
            .await?;
        }
        info!("Seeded {} experiences", data.experiences.len());
    }

    if !data.skills.is_empty() {
        truncate(&mut tx, "skills").await?;
        for skill in &data.skills {
            sqlx::query(
                r#"
                INSERT INTO skills
                    (name, category, icon, proficiency, years_used, context, display_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&skill.name)
            .bind(&skill.category)
            .bind(&skill.icon)
            .bind(&skill.proficiency)
            .bind(skill.years_used)
            .bind(&skill.context)
            .bind(skill.display_order)
            .execute(&mut *tx)
            .await?;
        }
        info!("Seeded {} skills", data.skills.len());
    }

    if !data.gaps.is_empty() {
        truncate(&mut tx, "gaps_weaknesses").await?;
        for gap in &data.gaps {
            sqlx::query(
                r#"
                INSERT INTO gaps_weaknesses
                    (area, description, is_dealbreaker, mitigation, display_order)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&gap.area)
            .bind(&gap.description)
            .bind(gap.is_dealbreaker)
            .bind(&gap.mitigation)
            .bind(gap.display_order)
            .execute(&mut *tx)
            .await?;
        }
        info!("Seeded {} gaps", data.gaps.len());
    }

    if !data.faq.is_empty() {
        truncate(&mut tx, "faq_responses").await?;
        for faq in &data.faq {
            sqlx::query(
                r#"
                INSERT INTO faq_responses
                    (question, answer, category, is_suggested, display_order)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&faq.question)
            .bind(&faq.answer)
            .bind(&faq.category)
            .bind(faq.is_suggested)
            .bind(faq.display_order)
            .execute(&mut *tx)
            .await?;
        }
        info!("Seeded {} FAQ responses", data.faq.len());
    }

    if !data.ai_instructions.is_empty() {
        truncate(&mut tx, "ai_instructions").await?;
        for instruction in &data.ai_instructions {
            sqlx::query(
                "INSERT INTO ai_instructions (category, instruction, priority, is_active) VALUES ($1, $2, $3, $4)",
            )
            .bind(&instruction.category)
            .bind(&instruction.instruction)
            .bind(instruction.priority)
            .bind(instruction.is_active)
            .execute(&mut *tx)
            .await?;
        }
        info!("Seeded {} AI instructions", data.ai_instructions.len());
    }

    if !data.demo_jds.is_empty() {
        sqlx::query("DELETE FROM jd_analyses WHERE is_demo = TRUE")
            .execute(&mut *tx)
            .await?;
        for jd in &data.demo_jds {
            sqlx::query(
                r#"
                INSERT INTO jd_analyses
                    (job_description, verdict, where_i_dont_fit, what_transfers,
                     recommendation, opening_paragraph, is_demo, demo_type)
                VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
                "#,
            )
            .bind(&jd.job_description)
            .bind(jd.verdict.as_str())
            .bind(&jd.where_i_dont_fit)
            .bind(&jd.what_transfers)
            .bind(&jd.recommendation)
            .bind(&jd.opening_paragraph)
            .bind(&jd.demo_type)
            .execute(&mut *tx)
            .await?;
        }
        info!("Seeded {} demo JD analyses", data.demo_jds.len());
    }

    tx.commit().await?;
    info!("Seed completed");
    Ok(())
}

async fn truncate(tx: &mut Transaction<'_, Postgres>, table: &'static str) -> Result<()> {
    sqlx::query(&format!("TRUNCATE {table} RESTART IDENTITY CASCADE"))
        .execute(&mut **tx)
        .await
        .with_context(|| format!("truncating {table}"))?;
    Ok(())
}
