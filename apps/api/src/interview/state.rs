//! Interview state — tracks topics and asked questions so the conversation
//! keeps moving to new ground instead of circling.

use crate::models::profile::CandidateProfile;

/// Behavioral topics every interview draws from, regardless of profile.
const BEHAVIORAL_TOPICS: &[&str] = &[
    "leadership",
    "teamwork",
    "problem-solving",
    "conflict-resolution",
    "time-management",
    "communication",
    "adaptability",
    "decision-making",
];

/// Jaccard similarity above this marks a question as a repeat.
const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Words this short carry no topical signal and are ignored when comparing
/// questions.
const MIN_WORD_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct InterviewState {
    /// Insertion-ordered; also consulted for membership.
    pub asked_topics: Vec<String>,
    pub remaining_topics: Vec<String>,
    pub asked_questions: Vec<String>,
}

impl InterviewState {
    /// Derives the topic pool from the profile: top skills and strengths,
    /// gaps to probe, plus the fixed behavioral set.
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        let mut topics: Vec<String> = Vec::new();

        for skill in profile.skills.iter().take(8) {
            topics.push(format!("skill:{skill}"));
        }
        for strength in profile.strengths.iter().take(5) {
            topics.push(strength.clone());
        }
        for gap in profile.gaps.iter().take(3) {
            topics.push(format!("gap:{gap}"));
        }
        for topic in BEHAVIORAL_TOPICS {
            topics.push(topic.to_string());
        }

        let mut unique = Vec::with_capacity(topics.len());
        for topic in topics {
            if !unique.contains(&topic) {
                unique.push(topic);
            }
        }

        Self {
            asked_topics: Vec::new(),
            remaining_topics: unique,
            asked_questions: Vec::new(),
        }
    }

    pub fn mark_topic_asked(&mut self, topic: &str) {
        if !self.asked_topics.iter().any(|t| t == topic) {
            self.asked_topics.push(topic.to_string());
        }
        self.remaining_topics.retain(|t| t != topic);
    }

    pub fn add_question(&mut self, question: &str) {
        self.asked_questions.push(question.to_string());
    }

    /// Covered/remaining topic lists for the system prompt, truncated to
    /// keep the prompt compact.
    pub fn topics_summary(&self) -> String {
        let asked = if self.asked_topics.is_empty() {
            "none yet".to_string()
        } else {
            self.asked_topics
                .iter()
                .take(10)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        let remaining = if self.remaining_topics.is_empty() {
            "all covered".to_string()
        } else {
            self.remaining_topics
                .iter()
                .take(10)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("Topics covered: {asked}\nRemaining topics: {remaining}")
    }

    /// Best-effort topic attribution for a generated question: first a scan
    /// of the remaining pool, then a fixed keyword table.
    pub fn infer_topic(&self, question: &str) -> String {
        let question_lower = question.to_lowercase();

        for topic in &self.remaining_topics {
            let stripped = topic
                .to_lowercase()
                .replace("skill:", "")
                .replace("gap:", "");
            if stripped
                .split('-')
                .any(|word| !word.is_empty() && question_lower.contains(word))
            {
                return topic.clone();
            }
        }

        if question_lower.contains("lead") {
            return "leadership".to_string();
        }
        if question_lower.contains("team") {
            return "teamwork".to_string();
        }
        if question_lower.contains("conflict") {
            return "conflict-resolution".to_string();
        }
        if question_lower.contains("problem") || question_lower.contains("challenge") {
            return "problem-solving".to_string();
        }
        if question_lower.contains("time") || question_lower.contains("deadline") {
            return "time-management".to_string();
        }
        if question_lower.contains("communicate") {
            return "communication".to_string();
        }

        "general".to_string()
    }
}

/// True when the new question shares more than half its content words with
/// any previously asked question (Jaccard over words longer than 3 chars).
pub fn is_question_similar(new_question: &str, existing: &[String]) -> bool {
    if existing.is_empty() {
        return false;
    }

    let new_words = content_words(new_question);
    if new_words.is_empty() {
        return false;
    }

    for question in existing {
        let existing_words = content_words(question);
        let intersection = new_words.iter().filter(|w| existing_words.contains(*w)).count();
        let union = new_words
            .iter()
            .chain(existing_words.iter())
            .collect::<std::collections::HashSet<_>>()
            .len();
        let similarity = if union > 0 {
            intersection as f64 / union as f64
        } else {
            0.0
        };
        if similarity > SIMILARITY_THRESHOLD {
            return true;
        }
    }

    false
}

fn content_words(text: &str) -> std::collections::HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > MIN_WORD_LEN)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile() -> CandidateProfile {
        CandidateProfile {
            skills: vec!["Rust".into(), "Postgres".into(), "Kubernetes".into()],
            years_of_experience: 5,
            domains: vec!["Payments".into()],
            strengths: vec!["system design".into()],
            gaps: vec!["public speaking".into()],
            target_role: "Backend Engineer".into(),
            resume_text: String::new(),
            job_description: None,
        }
    }

    #[test]
    fn test_topic_pool_built_from_profile() {
        let state = InterviewState::from_profile(&make_profile());
        assert!(state.remaining_topics.contains(&"skill:Rust".to_string()));
        assert!(state.remaining_topics.contains(&"system design".to_string()));
        assert!(state.remaining_topics.contains(&"gap:public speaking".to_string()));
        assert!(state.remaining_topics.contains(&"leadership".to_string()));
        assert!(state.asked_topics.is_empty());
    }

    #[test]
    fn test_topic_pool_deduplicated() {
        let mut profile = make_profile();
        profile.strengths = vec!["leadership".into()];
        let state = InterviewState::from_profile(&profile);
        let leadership_count = state
            .remaining_topics
            .iter()
            .filter(|t| t.as_str() == "leadership")
            .count();
        assert_eq!(leadership_count, 1);
    }

    #[test]
    fn test_mark_topic_asked_moves_topic() {
        let mut state = InterviewState::from_profile(&make_profile());
        state.mark_topic_asked("teamwork");
        assert!(state.asked_topics.contains(&"teamwork".to_string()));
        assert!(!state.remaining_topics.contains(&"teamwork".to_string()));
    }

    #[test]
    fn test_add_question_recorded() {
        let mut state = InterviewState::from_profile(&make_profile());
        state.add_question("Tell me about a hard bug.");
        assert_eq!(state.asked_questions.len(), 1);
    }

    #[test]
    fn test_similar_questions_detected() {
        let existing = vec!["Tell me about a time you handled conflict with a team member".to_string()];
        assert!(is_question_similar(
            "Tell me about a time you handled conflict with a difficult team member",
            &existing
        ));
    }

    #[test]
    fn test_different_questions_pass() {
        let existing = vec!["Tell me about a time you handled conflict".to_string()];
        assert!(!is_question_similar(
            "What database migrations have you designed recently?",
            &existing
        ));
    }

    #[test]
    fn test_no_history_is_never_similar() {
        assert!(!is_question_similar("Anything at all", &[]));
    }

    #[test]
    fn test_infer_topic_from_remaining_pool() {
        let state = InterviewState::from_profile(&make_profile());
        assert_eq!(state.infer_topic("How have you used Rust in production?"), "skill:Rust");
    }

    #[test]
    fn test_infer_topic_keyword_fallback() {
        let mut state = InterviewState::from_profile(&make_profile());
        state.remaining_topics.clear();
        assert_eq!(state.infer_topic("How do you lead a struggling team?"), "leadership");
        assert_eq!(state.infer_topic("Describe a tight deadline."), "time-management");
        assert_eq!(state.infer_topic("What is your favorite color?"), "general");
    }

    #[test]
    fn test_topics_summary_placeholders() {
        let mut state = InterviewState::from_profile(&make_profile());
        let summary = state.topics_summary();
        assert!(summary.contains("none yet"));

        state.remaining_topics.clear();
        let summary = state.topics_summary();
        assert!(summary.contains("all covered"));
    }
}
