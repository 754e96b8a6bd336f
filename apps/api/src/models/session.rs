use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-answer score breakdown carried into the persisted history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerScores {
    pub clarity: u32,
    pub relevance: u32,
    pub completeness: u32,
    pub technical_accuracy: u32,
    pub communication: u32,
    pub overall: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAnswer {
    pub question_id: String,
    pub question_text: String,
    pub transcription: String,
    /// Seconds spent on this answer.
    pub time_spent: f64,
    pub scores: AnswerScores,
}

/// A finished interview, as persisted to the history store. Created once at
/// interview completion and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub template: String,
    pub template_name: String,
    pub score: f64,
    pub questions_answered: u32,
    /// Total seconds across all answers.
    pub total_time: f64,
    pub answers: Vec<SessionAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_record_roundtrips_through_json() {
        let record = SessionRecord {
            id: Uuid::new_v4(),
            date: Utc::now(),
            template: "behavioral".to_string(),
            template_name: "Behavioral Interview".to_string(),
            score: 78.5,
            questions_answered: 6,
            total_time: 540.0,
            answers: vec![SessionAnswer {
                question_id: "q-0".to_string(),
                question_text: "Tell me about yourself.".to_string(),
                transcription: "I am a backend engineer.".to_string(),
                time_spent: 45.0,
                scores: AnswerScores {
                    clarity: 80,
                    relevance: 70,
                    completeness: 60,
                    technical_accuracy: 60,
                    communication: 80,
                    overall: 72,
                },
            }],
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.answers.len(), 1);
        assert_eq!(back.answers[0].scores.overall, 72);
    }
}
