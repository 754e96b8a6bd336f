use serde::{Deserialize, Serialize};

/// Question category, as produced by the interviewer LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Behavioral,
    Technical,
    Situational,
    Culture,
}

impl QuestionCategory {
    /// Parses the category label from a model reply. Anything unrecognized
    /// falls back to behavioral, matching the defensive defaults applied to
    /// every other field of the reply.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "technical" => QuestionCategory::Technical,
            "situational" => QuestionCategory::Situational,
            "culture" => QuestionCategory::Culture,
            _ => QuestionCategory::Behavioral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    pub is_follow_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Confident,
    Neutral,
    Nervous,
    Thinking,
}

/// A single emotion sample taken while the candidate was speaking. Supplied
/// by the capture client when available, synthesized by the fallback sampler
/// otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSnapshot {
    pub timestamp: i64,
    pub emotion: Emotion,
    pub confidence: f64,
    pub eye_contact: f64,
    pub smile_intensity: f64,
}

/// Speech and behavior metrics computed from a finished answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerMetrics {
    pub word_count: usize,
    /// Words per minute.
    pub speaking_speed: u32,
    pub filler_words: usize,
    pub pause_count: usize,
    pub avg_pause_length: f64,
    /// 0.0 – 1.0
    pub confidence: f64,
    /// 0.0 – 1.0
    pub engagement: f64,
    /// 0.0 – 1.0
    pub eye_contact: f64,
    pub emotion_timeline: Vec<EmotionSnapshot>,
}

/// Per-answer scoring produced by the heuristic gate and enriched by the
/// interviewer LLM once the next-question call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerAnalysis {
    /// 0 – 100
    pub overall_score: u32,
    /// 0 – 10
    pub relevance: u8,
    /// 0 – 10
    pub structure: u8,
    /// 0 – 10
    pub depth: u8,
    /// 0 – 10
    pub clarity: u8,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default)]
    pub ideal_answer_outline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub transcript: String,
    pub started_at: i64,
    pub ended_at: i64,
    pub metrics: AnswerMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnswerAnalysis>,
}

/// Rolling view of the candidate's delivery at the moment an answer ends.
/// Drives adaptive difficulty in the chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub confidence: f64,
    pub engagement: f64,
    pub emotion: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompanyPersona {
    BigTech,
    Startup,
    Finance,
    Consulting,
    #[default]
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub question_id: String,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub overall_score: u32,
    pub summary: String,
    pub key_strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub next_steps: Vec<String>,
    pub detailed_feedback: Vec<QuestionFeedback>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_known_labels() {
        assert_eq!(QuestionCategory::parse("technical"), QuestionCategory::Technical);
        assert_eq!(QuestionCategory::parse("Situational"), QuestionCategory::Situational);
        assert_eq!(QuestionCategory::parse("culture"), QuestionCategory::Culture);
    }

    #[test]
    fn test_category_parse_unknown_defaults_to_behavioral() {
        assert_eq!(QuestionCategory::parse("puzzles"), QuestionCategory::Behavioral);
        assert_eq!(QuestionCategory::parse(""), QuestionCategory::Behavioral);
    }

    #[test]
    fn test_persona_serde_uses_kebab_case() {
        let json = serde_json::to_string(&CompanyPersona::BigTech).unwrap();
        assert_eq!(json, "\"big-tech\"");
        let parsed: CompanyPersona = serde_json::from_str("\"startup\"").unwrap();
        assert_eq!(parsed, CompanyPersona::Startup);
    }

    #[test]
    fn test_emotion_serde_roundtrip() {
        let snapshot = EmotionSnapshot {
            timestamp: 1_700_000_000_000,
            emotion: Emotion::Confident,
            confidence: 0.72,
            eye_contact: 0.6,
            smile_intensity: 0.3,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"confident\""));
        let back: EmotionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.emotion, Emotion::Confident);
    }

    #[test]
    fn test_difficulty_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
    }
}
