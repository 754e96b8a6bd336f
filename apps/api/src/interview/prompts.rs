// All LLM prompt constants and builders for the interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::interview::state::InterviewState;
use crate::models::interview::CompanyPersona;
use crate::models::profile::CandidateProfile;

/// Resume text beyond this many chars is truncated out of the system prompt.
const RESUME_EXCERPT_CAP: usize = 3000;

/// User prompt opening an interview when a resume is on file.
pub const START_PROMPT_WITH_RESUME: &str = r#"The candidate has uploaded their resume (see system prompt).

CRITICAL: You MUST return ONLY valid JSON. No other text.

Return this exact JSON structure:
{
  "greeting": "1 sentence greeting",
  "profileSummary": "mention a specific project/company/tech from their resume",
  "question": "ask about specific experience from their resume",
  "category": "behavioral|technical|situational|culture"
}

Do NOT include any text before or after the JSON.
Do NOT ask follow-up questions.
ONLY return the JSON object."#;

/// User prompt opening an interview without resume context.
pub const START_PROMPT_NO_RESUME: &str = r#"Start the interview. Return ONLY valid JSON with no other text:
{
  "greeting": "1 sentence greeting",
  "profileSummary": "1 sentence about their background",
  "question": "first question",
  "category": "behavioral|technical|situational|culture"
}"#;

/// Per-turn prompt template. Replace: {previous_question}, {previous_answer},
/// {word_count}, {confidence_pct}.
pub const NEXT_QUESTION_PROMPT_TEMPLATE: &str = r#"Here is the candidate's answer to your question:

Question: "{previous_question}"
Candidate's exact response: "{previous_answer}"
Word count: {word_count}
Confidence: {confidence_pct}%

INSTRUCTIONS:
1. You MUST read and process their answer BEFORE responding
2. Your acknowledgement should be a specific, contextual reaction to what they said (NOT generic)
3. If the answer is under 15 words, ask them to elaborate instead of moving on
4. Make your response feel like a natural conversation - reference something they mentioned
5. Keep responses 1-3 sentences maximum

Evaluate THIS specific answer:
1. Score (0-100)
2. ONE specific strength from what they actually said
3. ONE specific improvement for THIS answer
4. Brief contextual feedback (1-2 sentences referencing their answer)
5. Contextual acknowledgement (e.g., "So you focused on X..." or "I see you handled that by...")
6. Next question (NEW topic) OR follow-up if the answer was too short

IMPORTANT:
- Do NOT give generic replies like "Got it" or "Interesting" - be specific
- Do NOT say "clear communication" unless truly exceptional
- If the answer is vague or short, ask for elaboration: "Can you tell me more about..."
- Reference their actual words in your acknowledgement

Return JSON:
{
  "score": 0-100,
  "strength": "specific strength from THIS answer",
  "improvement": "specific actionable improvement",
  "feedback": "1-2 sentences about THIS answer",
  "ack": "contextual acknowledgement referencing their answer",
  "question": "next question on NEW topic OR follow-up if too short",
  "category": "behavioral|technical|situational|culture"
}"#;

/// Final summary prompt template. Replace: {answer_count}, {avg_score},
/// {answer_lines}.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Interview: {answer_count} questions, avg {avg_score}.

Answers:
{answer_lines}

JSON:
{
  "overallScore": 0-100,
  "summary": "2 paragraphs",
  "keyStrengths": ["3 items"],
  "areasForImprovement": ["3 items"],
  "nextSteps": ["3 items"]
}"#;

/// Compact system prompt: role, experience, persona framing, topic tracking,
/// and the resume excerpt when one is on file.
pub fn build_system_prompt(
    profile: &CandidateProfile,
    persona: CompanyPersona,
    state: &InterviewState,
) -> String {
    let resume_context = if profile.has_resume() {
        let excerpt: String = profile.resume_text.chars().take(RESUME_EXCERPT_CAP).collect();
        format!(
            "\n\nCANDIDATE'S RESUME:\n{excerpt}\n\nCRITICAL INSTRUCTIONS:\n\
            1. Identify the candidate's name, experience, skills, projects, companies, education\n\
            2. Ask SPECIFIC questions about their actual projects and technologies\n\
            3. Reference real company names, project names, and technologies from the document\n\
            4. Make questions personalized and engaging based on their actual background\n\
            5. Do NOT ask generic questions - be specific to their experience"
        )
    } else {
        "\n\n(No resume provided - ask general questions based on role)".to_string()
    };

    let skills = profile
        .skills
        .iter()
        .take(5)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "HR interviewer for {role}. {years}yr exp, skills: {skills}.{resume_context}\n\n\
        {persona_context}\n\n\
        {topics}\n\n\
        Style:\n\
        - Natural, conversational, 1-3 sentences MAX\n\
        - ALWAYS paraphrase or reference their specific answer: \"So you handled that by...\" or \"I see you focused on...\"\n\
        - Do NOT use generic acknowledgements like \"Got it\" or \"Interesting\"\n\
        - Do NOT repeat their filler words\n\
        - If the answer is under 15 words, ask them to elaborate before moving on\n\
        - Make every response contextual and specific to what they said\n\n\
        IMPORTANT:\n\
        - Pick NEW topics from the remaining list. Avoid repeating earlier questions.\n\
        - Your replies should feel like you actually listened to them\n\
        - Reference their resume when asking questions to make it personalized",
        role = profile.target_role,
        years = profile.years_of_experience,
        persona_context = persona_context(persona),
        topics = state.topics_summary(),
    )
}

/// Company-style framing injected into the system prompt.
pub fn persona_context(persona: CompanyPersona) -> &'static str {
    match persona {
        CompanyPersona::BigTech => {
            "Company Style: Large tech company (Google, Meta, Amazon style). \
            Focus on scale, system design, leadership principles, and data-driven decisions."
        }
        CompanyPersona::Startup => {
            "Company Style: Fast-paced startup. Focus on adaptability, wearing multiple hats, \
            ownership, and scrappy problem-solving."
        }
        CompanyPersona::Finance => {
            "Company Style: Financial services firm. Focus on attention to detail, \
            risk management, compliance, and working under pressure."
        }
        CompanyPersona::Consulting => {
            "Company Style: Management consulting. Focus on structured thinking, \
            client communication, and business impact."
        }
        CompanyPersona::General => {
            "Company Style: General professional environment. Balanced focus on skills, \
            culture fit, and growth potential."
        }
    }
}

pub fn build_next_question_prompt(
    previous_question: &str,
    previous_answer: &str,
    confidence: f64,
) -> String {
    let word_count = previous_answer.split_whitespace().count();
    NEXT_QUESTION_PROMPT_TEMPLATE
        .replace("{previous_question}", previous_question)
        .replace("{previous_answer}", previous_answer)
        .replace("{word_count}", &word_count.to_string())
        .replace("{confidence_pct}", &((confidence * 100.0).round() as i64).to_string())
}
