//! Read-mostly profile records. Seeded out of band and rendered into prompts.
//!
//! Enumerated columns (`status`, `proficiency`, `category`) are stored as text
//! and exposed through typed accessors, so an unexpected value in the table
//! degrades one record instead of failing the whole query.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Open,
    NotLooking,
    Selective,
}

impl ProfileStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(ProfileStatus::Open),
            "not_looking" => Some(ProfileStatus::NotLooking),
            "selective" => Some(ProfileStatus::Selective),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Strong,
    Moderate,
    Gap,
}

impl Proficiency {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "strong" => Some(Proficiency::Strong),
            "moderate" => Some(Proficiency::Moderate),
            "gap" => Some(Proficiency::Gap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionCategory {
    Identity,
    AntiSycophancy,
    Tone,
    Boundaries,
    Examples,
}

impl InstructionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionCategory::Identity => "identity",
            InstructionCategory::AntiSycophancy => "anti_sycophancy",
            InstructionCategory::Tone => "tone",
            InstructionCategory::Boundaries => "boundaries",
            InstructionCategory::Examples => "examples",
        }
    }
}

/// Singleton profile row. At most one is expected in the table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateProfile {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub taglines: Vec<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub status: String,
    #[serde(default)]
    pub preferred_roles: Vec<String>,
    #[serde(default)]
    pub preferred_company_stages: Vec<String>,
    pub years_experience: Option<i32>,
    pub education_summary: Option<String>,
}

impl CandidateProfile {
    pub fn status(&self) -> Option<ProfileStatus> {
        ProfileStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experience {
    #[serde(default)]
    pub id: i32,
    pub company: String,
    pub role: String,
    pub start_date: NaiveDate,
    /// `None` means the role is current.
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub situation: Option<String>,
    pub approach: Option<String>,
    pub technical_work: Option<String>,
    pub lessons_learned: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    pub category: String,
    pub icon: Option<String>,
    pub proficiency: String,
    pub years_used: Option<i32>,
    pub context: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

impl Skill {
    pub fn proficiency(&self) -> Option<Proficiency> {
        Proficiency::parse(&self.proficiency)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GapWeakness {
    #[serde(default)]
    pub id: i32,
    pub area: String,
    pub description: String,
    #[serde(default)]
    pub is_dealbreaker: bool,
    pub mitigation: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FaqResponse {
    #[serde(default)]
    pub id: i32,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    #[serde(default)]
    pub is_suggested: bool,
    #[serde(default)]
    pub display_order: i32,
}

/// The `{question, answer}` pair surfaced to the chat widget.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SuggestedQuestion {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiInstruction {
    #[serde(default)]
    pub id: i32,
    pub category: String,
    pub instruction: String,
    /// Higher renders first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AiInstruction {
    pub fn is_category(&self, category: InstructionCategory) -> bool {
        self.category == category.as_str()
    }
}
