//! Context Assembler: renders already-fetched profile records into the chat
//! system prompt and the JD-analysis system prompt. No I/O happens here.

pub mod assembler;
pub mod prompts;

use tracing::warn;

use crate::models::profile::{
    AiInstruction, CandidateProfile, Experience, FaqResponse, GapWeakness, Proficiency, Skill,
};

pub use assembler::{build_analysis_prompt, build_chat_prompt, format_analysis_user_message};

/// Skills split into the three disjoint proficiency buckets.
#[derive(Debug, Clone, Default)]
pub struct SkillsByProficiency {
    pub strong: Vec<Skill>,
    pub moderate: Vec<Skill>,
    pub gap: Vec<Skill>,
}

impl SkillsByProficiency {
    /// Buckets skills by proficiency, preserving input order within a bucket.
    /// Rows with an unrecognised proficiency are dropped.
    pub fn partition(skills: Vec<Skill>) -> Self {
        let mut buckets = Self::default();
        for skill in skills {
            match skill.proficiency() {
                Some(Proficiency::Strong) => buckets.strong.push(skill),
                Some(Proficiency::Moderate) => buckets.moderate.push(skill),
                Some(Proficiency::Gap) => buckets.gap.push(skill),
                None => warn!(
                    "Skipping skill '{}' with unknown proficiency '{}'",
                    skill.name, skill.proficiency
                ),
            }
        }
        buckets
    }
}

/// Everything a prompt builder may render. `profile == None` selects the
/// fallback prompt.
#[derive(Debug, Clone, Default)]
pub struct ProfileContext {
    pub profile: Option<CandidateProfile>,
    pub experiences: Vec<Experience>,
    pub skills: SkillsByProficiency,
    pub gaps: Vec<GapWeakness>,
    pub faqs: Vec<FaqResponse>,
    pub instructions: Vec<AiInstruction>,
}
