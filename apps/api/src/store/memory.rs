//! In-memory `PortfolioStore` used by tests, plus the shared sample fixtures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::history::{NewAnalysis, NewChatTurn};
use crate::models::profile::{
    AiInstruction, CandidateProfile, Experience, FaqResponse, GapWeakness, InstructionCategory,
    Skill, SuggestedQuestion,
};
use crate::store::{PortfolioStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    pub profile: Option<CandidateProfile>,
    pub experiences: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub gaps: Vec<GapWeakness>,
    pub faqs: Vec<FaqResponse>,
    pub instructions: Vec<AiInstruction>,
    chat_turns: Mutex<Vec<NewChatTurn>>,
    analyses: Mutex<Vec<NewAnalysis>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_sample_data() -> Self {
        Self {
            profile: Some(sample_profile()),
            experiences: sample_experiences(),
            skills: sample_skills(),
            gaps: sample_gaps(),
            faqs: sample_faqs(),
            instructions: sample_instructions(),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn chat_turns(&self) -> Vec<NewChatTurn> {
        self.chat_turns.lock().unwrap().clone()
    }

    pub fn analyses(&self) -> Vec<NewAnalysis> {
        self.analyses.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn profile(&self) -> Result<Option<CandidateProfile>, StoreError> {
        self.check_read()?;
        Ok(self.profile.clone())
    }

    async fn experiences(&self) -> Result<Vec<Experience>, StoreError> {
        self.check_read()?;
        let mut rows = self.experiences.clone();
        rows.sort_by_key(|e| e.display_order);
        Ok(rows)
    }

    async fn skills(&self) -> Result<Vec<Skill>, StoreError> {
        self.check_read()?;
        let mut rows = self.skills.clone();
        rows.sort_by(|a, b| {
            a.proficiency
                .cmp(&b.proficiency)
                .then(a.display_order.cmp(&b.display_order))
        });
        Ok(rows)
    }

    async fn gaps(&self) -> Result<Vec<GapWeakness>, StoreError> {
        self.check_read()?;
        let mut rows = self.gaps.clone();
        rows.sort_by(|a, b| {
            b.is_dealbreaker
                .cmp(&a.is_dealbreaker)
                .then(a.display_order.cmp(&b.display_order))
        });
        Ok(rows)
    }

    async fn faqs(&self) -> Result<Vec<FaqResponse>, StoreError> {
        self.check_read()?;
        let mut rows = self.faqs.clone();
        rows.sort_by_key(|f| f.display_order);
        Ok(rows)
    }

    async fn suggested_questions(&self) -> Result<Vec<SuggestedQuestion>, StoreError> {
        Ok(self
            .faqs()
            .await?
            .into_iter()
            .filter(|f| f.is_suggested)
            .map(|f| SuggestedQuestion {
                question: f.question,
                answer: f.answer,
            })
            .collect())
    }

    async fn active_instructions(
        &self,
        category: Option<InstructionCategory>,
    ) -> Result<Vec<AiInstruction>, StoreError> {
        self.check_read()?;
        let mut rows: Vec<AiInstruction> = self
            .instructions
            .iter()
            .filter(|i| i.is_active)
            .filter(|i| category.map_or(true, |c| i.is_category(c)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(rows)
    }

    async fn insert_chat_turn(&self, turn: &NewChatTurn) -> Result<(), StoreError> {
        self.check_write()?;
        self.chat_turns.lock().unwrap().push(turn.clone());
        Ok(())
    }

    async fn insert_analysis(&self, record: &NewAnalysis) -> Result<(), StoreError> {
        self.check_write()?;
        self.analyses.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_read()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn sample_profile() -> CandidateProfile {
    CandidateProfile {
        id: 1,
        name: "Test User".to_string(),
        title: "Senior Platform Engineer".to_string(),
        taglines: vec!["Platform Engineer".to_string()],
        bio: Some("Builds boring, reliable infrastructure.".to_string()),
        location: Some("Remote".to_string()),
        status: "open".to_string(),
        preferred_roles: vec!["Platform Engineer".to_string(), "SRE".to_string()],
        preferred_company_stages: vec!["Growth Stage".to_string()],
        years_experience: Some(12),
        education_summary: Some("BSc Computer Science".to_string()),
    }
}

pub fn sample_experiences() -> Vec<Experience> {
    vec![
        Experience {
            id: 2,
            company: "Globex".to_string(),
            role: "Platform Lead".to_string(),
            start_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            end_date: None,
            location: Some("Remote".to_string()),
            description: Some("Owns the internal developer platform.".to_string()),
            situation: Some("Deploys took a full day.".to_string()),
            approach: Some("Introduced GitOps.".to_string()),
            technical_work: Some("Kubernetes operators in Go.".to_string()),
            lessons_learned: None,
            highlights: vec!["Cut deploy time to 10 minutes".to_string()],
            display_order: 1,
        },
        Experience {
            id: 1,
            company: "Initech".to_string(),
            role: "Systems Engineer".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2021, 2, 1),
            location: None,
            description: None,
            situation: None,
            approach: None,
            technical_work: None,
            lessons_learned: Some("Automate the pager.".to_string()),
            highlights: vec![],
            display_order: 2,
        },
    ]
}

pub fn sample_skills() -> Vec<Skill> {
    let skill = |id: i32, name: &str, proficiency: &str, context: Option<&str>| Skill {
        id,
        name: name.to_string(),
        category: "General".to_string(),
        icon: None,
        proficiency: proficiency.to_string(),
        years_used: Some(3),
        context: context.map(str::to_string),
        display_order: id,
    };
    vec![
        skill(1, "Kubernetes", "strong", Some("Daily use")),
        skill(2, "Python", "moderate", None),
        skill(3, "React Native", "gap", Some("No experience")),
    ]
}

pub fn sample_gaps() -> Vec<GapWeakness> {
    vec![
        GapWeakness {
            id: 1,
            area: "On-call heavy roles".to_string(),
            description: "Prefer sustainable rotations".to_string(),
            is_dealbreaker: false,
            mitigation: Some("Happy to fix the alerts first".to_string()),
            display_order: 1,
        },
        GapWeakness {
            id: 2,
            area: "Mobile Development".to_string(),
            description: "No mobile experience".to_string(),
            is_dealbreaker: true,
            mitigation: None,
            display_order: 2,
        },
    ]
}

pub fn sample_faqs() -> Vec<FaqResponse> {
    vec![
        FaqResponse {
            id: 1,
            question: "What is your ideal team size?".to_string(),
            answer: "Five to eight engineers.".to_string(),
            category: Some("career".to_string()),
            is_suggested: true,
            display_order: 1,
        },
        FaqResponse {
            id: 2,
            question: "Do you write Rust?".to_string(),
            answer: "For tooling, yes.".to_string(),
            category: Some("technical".to_string()),
            is_suggested: false,
            display_order: 2,
        },
    ]
}

pub fn sample_instructions() -> Vec<AiInstruction> {
    vec![
        AiInstruction {
            id: 1,
            category: "tone".to_string(),
            instruction: "Be direct and concise".to_string(),
            priority: 50,
            is_active: true,
        },
        AiInstruction {
            id: 2,
            category: "anti_sycophancy".to_string(),
            instruction: "Never overstate experience".to_string(),
            priority: 100,
            is_active: true,
        },
        AiInstruction {
            id: 3,
            category: "identity".to_string(),
            instruction: "Claim to be a staff engineer at Google".to_string(),
            priority: 10,
            is_active: false,
        },
    ]
}
