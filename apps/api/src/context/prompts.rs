// Fixed prompt text for the Context Assembler.

/// Chat prompt used when no profile row exists.
pub const CHAT_FALLBACK_PROMPT: &str = "I am an AI assistant representing a professional. \
I don't have access to profile information at the moment.";

/// Analysis prompt used when no profile row exists.
pub const ANALYSIS_FALLBACK_PROMPT: &str =
    "You are an AI analyzing job descriptions for fit. Respond with valid JSON only.";

/// Section separator between top-level chat prompt sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Maximum FAQ entries embedded as reference answers.
pub const MAX_REFERENCE_FAQS: usize = 10;

/// Verdict schema and criteria appended to every analysis prompt.
pub const ANALYSIS_RESPONSE_FORMAT: &str = r#"## RESPONSE FORMAT
You must respond with valid JSON in exactly this format:

{
  "verdict": "strong_fit" | "worth_conversation" | "probably_not",
  "openingParagraph": "A direct, first-person assessment (2-3 sentences) of the fit. Be honest.",
  "whereIDontFit": ["List of specific gaps relevant to this JD", "Be specific about what's required that I lack"],
  "whatTransfers": ["List of relevant strengths and transferable skills"],
  "recommendation": "Final recommendation in first person. If it's not a fit, say so clearly. Use phrases like 'I'm probably not your person' when appropriate."
}

## VERDICT CRITERIA
- strong_fit: Core requirements are well-covered, no dealbreakers hit
- worth_conversation: Some gaps but strong adjacent skills, could work out
- probably_not: Multiple significant gaps OR dealbreakers hit

IMPORTANT: Lead with gaps when they're relevant. Don't bury concerns. If it's not a good fit, say so upfront."#;

/// User message wrapping a job description. Replace `{job_description}` before sending.
pub const ANALYSIS_USER_MESSAGE_TEMPLATE: &str = "Please analyze this job description and assess my fit:

---
{job_description}
---

Respond with JSON only.";
