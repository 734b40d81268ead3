//! Prompt builders shared by the chat and analysis endpoints.
//!
//! Both builders render instructions, skills and gaps through the same helpers
//! so the two prompt variants cannot drift apart.

use crate::context::prompts::{
    ANALYSIS_FALLBACK_PROMPT, ANALYSIS_RESPONSE_FORMAT, ANALYSIS_USER_MESSAGE_TEMPLATE,
    CHAT_FALLBACK_PROMPT, MAX_REFERENCE_FAQS, SECTION_SEPARATOR,
};
use crate::context::ProfileContext;
use crate::models::profile::{
    AiInstruction, CandidateProfile, Experience, FaqResponse, GapWeakness, InstructionCategory,
    ProfileStatus, Skill,
};

const DEFAULT_YEARS: &str = "10+";
const DEFAULT_PREFERRED_ROLES: &str = "Platform Engineering, DevOps";
const DEFAULT_COMPANY_STAGE: &str = "Growth stage";

/// Builds the chat system prompt from every active instruction and the full profile.
pub fn build_chat_prompt(ctx: &ProfileContext) -> String {
    let Some(profile) = ctx.profile.as_ref() else {
        return CHAT_FALLBACK_PROMPT.to_string();
    };

    let mut sections = Vec::new();

    sections.push(format!(
        "## BEHAVIOR INSTRUCTIONS\n{}",
        render_instructions(&ctx.instructions, None)
    ));

    sections.push(render_about_me(profile));

    if !ctx.experiences.is_empty() {
        let experience_text = ctx
            .experiences
            .iter()
            .map(render_experience)
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("## WORK EXPERIENCE\n{experience_text}"));
    }

    sections.push(format!(
        "## SKILLS SELF-ASSESSMENT\n\n\
         ### STRONG (Daily use, deep expertise)\n{}\n\n\
         ### MODERATE (Competent, used regularly)\n{}\n\n\
         ### GAPS (Limited or no experience)\n{}",
        render_skills(&ctx.skills.strong, "Strong expertise"),
        render_skills(&ctx.skills.moderate, "Moderate experience"),
        render_skills(&ctx.skills.gap, "Limited experience"),
    ));

    if !ctx.gaps.is_empty() {
        let (dealbreakers, others) = split_gaps(&ctx.gaps);
        let mut gap_text = String::new();

        if !dealbreakers.is_empty() {
            gap_text.push_str(&format!(
                "### DEALBREAKERS (Roles requiring these are NOT a fit)\n{}\n\n",
                render_gaps(&dealbreakers, true)
            ));
        }
        if !others.is_empty() {
            gap_text.push_str(&format!(
                "### OTHER LIMITATIONS\n{}",
                render_gaps(&others, true)
            ));
        }

        sections.push(format!("## EXPLICIT GAPS AND WEAKNESSES\n{gap_text}"));
    }

    if !ctx.faqs.is_empty() {
        let faq_text = ctx
            .faqs
            .iter()
            .take(MAX_REFERENCE_FAQS)
            .map(render_faq)
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!(
            "## REFERENCE ANSWERS\nUse these as guidance for similar questions:\n\n{faq_text}"
        ));
    }

    sections.join(SECTION_SEPARATOR)
}

/// Builds the JD-analysis system prompt: anti-sycophancy rules, profile summary,
/// skills, gaps, then the fixed verdict schema.
pub fn build_analysis_prompt(ctx: &ProfileContext) -> String {
    let Some(profile) = ctx.profile.as_ref() else {
        return ANALYSIS_FALLBACK_PROMPT.to_string();
    };

    let (dealbreakers, others) = split_gaps(&ctx.gaps);

    format!(
        "## YOUR TASK\n\
         Analyze the provided job description and give an honest assessment of whether {name} is a good fit.\n\n\
         ## CRITICAL ANTI-SYCOPHANCY RULES\n{rules}\n\n\
         ## CANDIDATE PROFILE\n\
         Name: {name}\n\
         Title: {title}\n\
         Location: {location}\n\
         Years Experience: {years}\n\
         Current Status: {status}\n\
         Preferred Roles: {roles}\n\
         Preferred Company Stage: {stages}\n\n\
         Bio: {bio}\n\n\
         ## STRONG SKILLS (Can speak with authority)\n{strong}\n\n\
         ## MODERATE SKILLS (Competent but not expert)\n{moderate}\n\n\
         ## GAP SKILLS (Limited or no experience)\n{gap}\n\n\
         ## EXPLICIT DEALBREAKERS\n{dealbreakers}\n\n\
         ## OTHER LIMITATIONS\n{others}\n\n\
         {format}",
        name = profile.name,
        rules = render_instructions(&ctx.instructions, Some(InstructionCategory::AntiSycophancy)),
        title = profile.title,
        location = location_text(profile),
        years = years_text(profile),
        status = status_text(profile),
        roles = list_or(&profile.preferred_roles, DEFAULT_PREFERRED_ROLES),
        stages = list_or(&profile.preferred_company_stages, DEFAULT_COMPANY_STAGE),
        bio = profile.bio.as_deref().unwrap_or_default(),
        strong = render_skills(&ctx.skills.strong, ""),
        moderate = render_skills(&ctx.skills.moderate, ""),
        gap = render_skills(&ctx.skills.gap, ""),
        dealbreakers = render_gaps(&dealbreakers, false),
        others = render_gaps(&others, false),
        format = ANALYSIS_RESPONSE_FORMAT,
    )
}

/// Wraps a job description as the single user turn of an analysis request.
pub fn format_analysis_user_message(job_description: &str) -> String {
    ANALYSIS_USER_MESSAGE_TEMPLATE.replace("{job_description}", job_description)
}

// ────────────────────────────────────────────────────────────────────────────
// Shared rendering helpers
// ────────────────────────────────────────────────────────────────────────────

/// Active instructions only, highest priority first. Ties keep input order.
fn render_instructions(
    instructions: &[AiInstruction],
    category: Option<InstructionCategory>,
) -> String {
    let mut selected: Vec<&AiInstruction> = instructions
        .iter()
        .filter(|i| i.is_active)
        .filter(|i| category.map_or(true, |c| i.is_category(c)))
        .collect();
    selected.sort_by(|a, b| b.priority.cmp(&a.priority));

    selected
        .iter()
        .map(|i| format!("- {}", i.instruction))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_about_me(profile: &CandidateProfile) -> String {
    let education_line = match non_empty(profile.education_summary.as_deref()) {
        Some(education) => format!("\nEducation: {education}"),
        None => String::new(),
    };

    format!(
        "## ABOUT ME\n\
         Name: {}\n\
         Title: {}\n\
         Location: {}\n\
         Years of Experience: {}\n\
         Current Status: {}{}\n\n\
         Bio: {}\n\n\
         Preferred Roles: {}\n\
         Preferred Company Stage: {}",
        profile.name,
        profile.title,
        location_text(profile),
        years_text(profile),
        status_text(profile),
        education_line,
        profile.bio.as_deref().unwrap_or_default(),
        list_or(&profile.preferred_roles, DEFAULT_PREFERRED_ROLES),
        list_or(&profile.preferred_company_stages, DEFAULT_COMPANY_STAGE),
    )
}

fn render_experience(exp: &Experience) -> String {
    let start = exp.start_date.format("%b %Y");
    let end = exp
        .end_date
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| "Present".to_string());

    let mut text = format!(
        "### {} at {} ({} - {})\n{}",
        exp.role,
        exp.company,
        start,
        end,
        exp.description.as_deref().unwrap_or_default()
    );

    let narrative = [
        ("Situation", &exp.situation),
        ("Approach", &exp.approach),
        ("Technical Work", &exp.technical_work),
        ("Lessons Learned", &exp.lessons_learned),
    ];
    for (label, value) in narrative {
        if let Some(value) = non_empty(value.as_deref()) {
            text.push_str(&format!("\n\n{label}: {value}"));
        }
    }

    if !exp.highlights.is_empty() {
        let highlights = exp
            .highlights
            .iter()
            .map(|h| format!("- {h}"))
            .collect::<Vec<_>>()
            .join("\n");
        text.push_str(&format!("\n\nHighlights:\n{highlights}"));
    }

    text
}

fn render_skills(skills: &[Skill], default_context: &str) -> String {
    skills
        .iter()
        .map(|s| {
            format!(
                "- {}: {}",
                s.name,
                non_empty(s.context.as_deref()).unwrap_or(default_context)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits gaps into (dealbreakers, others), each keeping input order.
fn split_gaps(gaps: &[GapWeakness]) -> (Vec<&GapWeakness>, Vec<&GapWeakness>) {
    gaps.iter().partition(|g| g.is_dealbreaker)
}

fn render_gaps(gaps: &[&GapWeakness], with_mitigation: bool) -> String {
    gaps.iter()
        .map(|g| {
            let mitigation = match non_empty(g.mitigation.as_deref()) {
                Some(m) if with_mitigation => format!(" ({m})"),
                _ => String::new(),
            };
            format!("- {}: {}{}", g.area, g.description, mitigation)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_faq(faq: &FaqResponse) -> String {
    format!("Q: {}\nA: {}", faq.question, faq.answer)
}

fn location_text(profile: &CandidateProfile) -> &str {
    non_empty(profile.location.as_deref()).unwrap_or("Not specified")
}

fn years_text(profile: &CandidateProfile) -> String {
    match profile.years_experience {
        Some(years) if years > 0 => years.to_string(),
        _ => DEFAULT_YEARS.to_string(),
    }
}

fn status_text(profile: &CandidateProfile) -> &str {
    match profile.status() {
        Some(ProfileStatus::Open) => "Open to opportunities",
        _ => profile.status.as_str(),
    }
}

fn list_or(items: &[String], default: &str) -> String {
    if items.is_empty() {
        default.to_string()
    } else {
        items.join(", ")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
