//! Candidate profile extraction — one structured LLM call over the resume
//! text, with a heuristic fallback for every field so an unreachable
//! provider still produces a usable profile.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::llm_client::{parse_reply, CallOptions, ChatMessage, LlmClient, LlmRole};
use crate::models::profile::CandidateProfile;
use crate::resume::prompts::{PROFILE_EXTRACT_PROMPT_TEMPLATE, PROFILE_EXTRACT_SYSTEM};

/// Resume text beyond this is truncated out of the extraction prompt.
const RESUME_PROMPT_CAP: usize = 4000;
/// Job description cap in the extraction prompt.
const JD_PROMPT_CAP: usize = 2000;

const MAX_FALLBACK_SKILLS: usize = 10;
const DEFAULT_YEARS: u32 = 3;
const MAX_ESTIMATED_YEARS: u32 = 15;

/// Skills scanned for when the model can't be reached.
const COMMON_SKILLS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "Python",
    "Java",
    "Rust",
    "Go",
    "React",
    "Node.js",
    "AWS",
    "Docker",
    "Kubernetes",
    "SQL",
    "MongoDB",
    "Git",
    "Leadership",
    "Communication",
    "Problem Solving",
    "Agile",
    "Scrum",
];

static YEARS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\+?\s*years?").expect("years pattern compiles"));

static DATE_RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{4}\s*[-–]\s*(\d{4}|present|current)").expect("date range pattern compiles")
});

/// Extracts a structured candidate profile from resume text. The model reply
/// is advisory: each field individually falls back to a heuristic.
pub async fn extract_candidate_profile(
    llm: &LlmClient,
    resume_text: &str,
    job_description: Option<&str>,
    target_role: Option<&str>,
) -> CandidateProfile {
    let resume_excerpt: String = resume_text.chars().take(RESUME_PROMPT_CAP).collect();
    let jd_section = job_description
        .map(|jd| {
            let excerpt: String = jd.chars().take(JD_PROMPT_CAP).collect();
            format!("\nJob Description:\n{excerpt}\n")
        })
        .unwrap_or_default();
    let role_section = target_role
        .map(|role| format!("\nTarget Role: {role}\n"))
        .unwrap_or_default();

    let prompt = PROFILE_EXTRACT_PROMPT_TEMPLATE
        .replace("{resume_text}", &resume_excerpt)
        .replace("{jd_section}", &jd_section)
        .replace("{role_section}", &role_section);

    let messages = [
        ChatMessage::system(PROFILE_EXTRACT_SYSTEM),
        ChatMessage::user(prompt),
    ];

    let parsed = match llm
        .call(
            LlmRole::ResumeAnalyzer,
            &messages,
            CallOptions { temperature: 0.3, max_tokens: 512 },
        )
        .await
    {
        Ok(completion) => parse_reply(&completion.content),
        Err(e) => {
            warn!("Profile extraction call failed, using heuristic fallback: {e}");
            Value::Object(serde_json::Map::new())
        }
    };

    CandidateProfile {
        skills: string_list(&parsed, "skills")
            .unwrap_or_else(|| fallback_skills(resume_text)),
        years_of_experience: parsed
            .get("yearsOfExperience")
            .and_then(Value::as_u64)
            .map(|y| y as u32)
            .unwrap_or_else(|| fallback_years(resume_text)),
        domains: string_list(&parsed, "domains")
            .unwrap_or_else(|| vec!["General".to_string()]),
        strengths: string_list(&parsed, "strengths")
            .unwrap_or_else(|| vec!["Professional experience".to_string()]),
        gaps: string_list(&parsed, "gaps").unwrap_or_default(),
        target_role: parsed
            .get("targetRole")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(String::from)
            .or_else(|| target_role.map(String::from))
            .unwrap_or_else(|| "Professional".to_string()),
        resume_text: resume_text.to_string(),
        job_description: job_description.map(String::from),
    }
}

/// One-line profile summary for display.
pub fn profile_summary(profile: &CandidateProfile) -> String {
    format!(
        "{} with {} years of experience in {}. Key skills: {}.",
        profile.target_role,
        profile.years_of_experience,
        profile.domains.join(", "),
        profile.skills.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
    )
}

fn string_list(parsed: &Value, key: &str) -> Option<Vec<String>> {
    parsed
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
}

/// Substring scan over a fixed skill list.
pub fn fallback_skills(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    COMMON_SKILLS
        .iter()
        .filter(|skill| text_lower.contains(&skill.to_lowercase()))
        .take(MAX_FALLBACK_SKILLS)
        .map(|s| s.to_string())
        .collect()
}

/// "N+ years" regex first, then a rough date-range count, then a default.
pub fn fallback_years(text: &str) -> u32 {
    if let Some(captures) = YEARS_PATTERN.captures(text) {
        if let Ok(years) = captures[1].parse::<u32>() {
            return years;
        }
    }

    let ranges = DATE_RANGE_PATTERN.find_iter(text).count() as u32;
    if ranges > 0 {
        return (ranges * 2).min(MAX_ESTIMATED_YEARS);
    }

    DEFAULT_YEARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_skills_finds_mentions() {
        let text = "Shipped services in Rust and Go, deployed with Docker on AWS.";
        let skills = fallback_skills(text);
        assert!(skills.contains(&"Rust".to_string()));
        assert!(skills.contains(&"Go".to_string()));
        assert!(skills.contains(&"Docker".to_string()));
        assert!(skills.contains(&"AWS".to_string()));
    }

    #[test]
    fn test_fallback_skills_capped_at_ten() {
        let text = COMMON_SKILLS.join(" ");
        assert_eq!(fallback_skills(&text).len(), MAX_FALLBACK_SKILLS);
    }

    #[test]
    fn test_fallback_years_from_explicit_mention() {
        assert_eq!(fallback_years("Engineer with 7+ years of experience"), 7);
        assert_eq!(fallback_years("over 12 years building systems"), 12);
    }

    #[test]
    fn test_fallback_years_from_date_ranges() {
        let text = "Acme 2018-2021\nGlobex 2021-present";
        assert_eq!(fallback_years(text), 4);
    }

    #[test]
    fn test_fallback_years_date_ranges_capped() {
        let text = "2001-2002 2003-2004 2005-2006 2007-2008 2009-2010 \
            2011-2012 2013-2014 2015-2016 2017-2018";
        assert_eq!(fallback_years(text), MAX_ESTIMATED_YEARS);
    }

    #[test]
    fn test_fallback_years_default() {
        assert_eq!(fallback_years("no dates anywhere"), DEFAULT_YEARS);
    }

    #[test]
    fn test_profile_summary_mentions_role_and_skills() {
        let profile = CandidateProfile {
            skills: vec!["Rust".into(), "Postgres".into()],
            years_of_experience: 6,
            domains: vec!["Payments".into()],
            strengths: vec![],
            gaps: vec![],
            target_role: "Backend Engineer".into(),
            resume_text: String::new(),
            job_description: None,
        };
        let summary = profile_summary(&profile);
        assert!(summary.contains("Backend Engineer"));
        assert!(summary.contains("6 years"));
        assert!(summary.contains("Rust"));
    }

    #[test]
    fn test_string_list_rejects_empty_arrays() {
        let parsed = serde_json::json!({ "skills": [] });
        assert!(string_list(&parsed, "skills").is_none());
    }
}
