use serde::{Deserialize, Serialize};

/// Structured candidate profile, extracted once from resume text before an
/// interview starts. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub skills: Vec<String>,
    pub years_of_experience: u32,
    pub domains: Vec<String>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub target_role: String,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

impl CandidateProfile {
    /// Whether enough resume text is present to personalize questions.
    /// Very short extractions are treated the same as no resume at all.
    pub fn has_resume(&self) -> bool {
        self.resume_text.trim().len() > 50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile(resume_text: &str) -> CandidateProfile {
        CandidateProfile {
            skills: vec!["Rust".to_string()],
            years_of_experience: 4,
            domains: vec!["FinTech".to_string()],
            strengths: vec![],
            gaps: vec![],
            target_role: "Backend Engineer".to_string(),
            resume_text: resume_text.to_string(),
            job_description: None,
        }
    }

    #[test]
    fn test_short_resume_text_counts_as_absent() {
        assert!(!make_profile("John Doe").has_resume());
    }

    #[test]
    fn test_long_resume_text_counts_as_present() {
        let text = "Senior engineer with eight years building payment systems in Rust and Go.";
        assert!(make_profile(text).has_resume());
    }

    #[test]
    fn test_profile_deserializes_without_optional_fields() {
        let json = serde_json::json!({
            "skills": ["Rust", "Postgres"],
            "years_of_experience": 6,
            "domains": ["Payments"],
            "strengths": ["System design"],
            "gaps": [],
            "target_role": "Staff Engineer"
        });
        let profile: CandidateProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.resume_text, "");
        assert!(profile.job_description.is_none());
    }
}
