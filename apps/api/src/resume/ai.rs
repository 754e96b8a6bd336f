//! AI-powered resume content suggestions.
//!
//! Error posture mirrors how each result is consumed: enhancement failures
//! surface to the caller, while skill suggestions and ATS analysis degrade
//! to empty results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{parse_reply, CallOptions, ChatMessage, LlmClient, LlmRole};
use crate::resume::prompts::{
    ATS_SCORE_PROMPT_TEMPLATE, ENHANCE_BULLET_PROMPT_TEMPLATE, ENHANCE_PROJECT_PROMPT_TEMPLATE,
    SUGGEST_SKILLS_PROMPT_TEMPLATE,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementSuggestion {
    pub original: String,
    pub enhanced: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    pub score: u32,
    pub suggestions: Vec<String>,
    pub keywords: Vec<String>,
}

impl AtsReport {
    fn empty() -> Self {
        Self { score: 0, suggestions: vec![], keywords: vec![] }
    }
}

/// Rewrites an experience bullet to be more impactful and ATS-friendly.
pub async fn enhance_bullet(
    llm: &LlmClient,
    bullet: &str,
    position: &str,
    company: &str,
) -> Result<EnhancementSuggestion, AppError> {
    let prompt = ENHANCE_BULLET_PROMPT_TEMPLATE
        .replace("{position}", position)
        .replace("{company}", company)
        .replace("{bullet}", bullet);

    enhancement_call(llm, bullet, &prompt, "bullet point").await
}

/// Rewrites a project description to highlight complexity and impact.
pub async fn enhance_project(
    llm: &LlmClient,
    description: &str,
    project_name: &str,
    tech_stack: &[String],
) -> Result<EnhancementSuggestion, AppError> {
    let prompt = ENHANCE_PROJECT_PROMPT_TEMPLATE
        .replace("{project_name}", project_name)
        .replace("{tech_stack}", &tech_stack.join(", "))
        .replace("{description}", description);

    enhancement_call(llm, description, &prompt, "project description").await
}

/// The reply shape both enhancement prompts request.
#[derive(Debug, Deserialize)]
struct EnhancementReply {
    enhanced: String,
    #[serde(default)]
    reason: String,
}

async fn enhancement_call(
    llm: &LlmClient,
    original: &str,
    prompt: &str,
    what: &str,
) -> Result<EnhancementSuggestion, AppError> {
    let messages = [ChatMessage::system(JSON_ONLY_SYSTEM), ChatMessage::user(prompt)];
    let reply: EnhancementReply = llm
        .call_json(
            LlmRole::ResumeAnalyzer,
            &messages,
            CallOptions { temperature: 0.7, max_tokens: 512 },
        )
        .await
        .map_err(|e| AppError::Llm(format!("Failed to enhance {what}: {e}")))?;

    if reply.enhanced.trim().is_empty() {
        return Err(AppError::Llm(format!(
            "Enhancement reply for {what} carried no content"
        )));
    }

    Ok(EnhancementSuggestion {
        original: original.to_string(),
        enhanced: reply.enhanced,
        reason: reply.reason,
    })
}

/// Suggests skills to add for a target position. Degrades to an empty list.
pub async fn suggest_skills(
    llm: &LlmClient,
    current_skills: &[String],
    position: &str,
    experience: &[String],
) -> Vec<String> {
    let prompt = SUGGEST_SKILLS_PROMPT_TEMPLATE
        .replace("{position}", position)
        .replace("{current_skills}", &current_skills.join(", "))
        .replace("{experience_summary}", &experience.join("; "));

    let messages = [ChatMessage::system(JSON_ONLY_SYSTEM), ChatMessage::user(prompt)];
    match llm
        .call(
            LlmRole::ResumeAnalyzer,
            &messages,
            CallOptions { temperature: 0.7, max_tokens: 256 },
        )
        .await
    {
        Ok(completion) => {
            let parsed = parse_reply(&completion.content);
            parsed
                .get("skills")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        }
        Err(e) => {
            warn!("Skill suggestion call failed: {e}");
            Vec::new()
        }
    }
}

/// ATS compatibility analysis of the rendered resume text.
/// Degrades to a zero report.
pub async fn ats_score(llm: &LlmClient, resume_text: &str, target_role: &str) -> AtsReport {
    let prompt = ATS_SCORE_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{resume_text}", resume_text);

    let messages = [ChatMessage::system(JSON_ONLY_SYSTEM), ChatMessage::user(prompt)];
    match llm
        .call(
            LlmRole::ResumeAnalyzer,
            &messages,
            CallOptions { temperature: 0.3, max_tokens: 512 },
        )
        .await
    {
        Ok(completion) => {
            let parsed = parse_reply(&completion.content);
            AtsReport {
                score: parsed
                    .get("score")
                    .and_then(Value::as_u64)
                    .map(|s| s.min(100) as u32)
                    .unwrap_or(0),
                suggestions: string_list(&parsed, "suggestions"),
                keywords: string_list(&parsed, "keywords"),
            }
        }
        Err(e) => {
            warn!("ATS analysis call failed: {e}");
            AtsReport::empty()
        }
    }
}

fn string_list(parsed: &Value, key: &str) -> Vec<String> {
    parsed
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhancement_suggestion_serde_shape() {
        let json = r#"{
            "original": "Worked on the API",
            "enhanced": "Designed and shipped a public REST API serving 2M requests/day",
            "reason": "Added scope and a concrete metric"
        }"#;
        let suggestion: EnhancementSuggestion = serde_json::from_str(json).unwrap();
        assert!(suggestion.enhanced.contains("2M"));
    }

    #[test]
    fn test_ats_report_empty_shape() {
        let report = AtsReport::empty();
        assert_eq!(report.score, 0);
        assert!(report.suggestions.is_empty());
        assert!(report.keywords.is_empty());
    }

    #[test]
    fn test_string_list_missing_key_is_empty() {
        let parsed = serde_json::json!({});
        assert!(string_list(&parsed, "keywords").is_empty());
    }
}
