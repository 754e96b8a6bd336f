//! Interview chat session — per-turn orchestration against the interviewer LLM.
//!
//! Flow per turn: build compact system prompt → call the model → defensively
//! parse the JSON-shaped reply → novelty-gate the generated question.
//! Three fallback layers keep the interview moving when the model misbehaves:
//! per-field defaults, a canned question list, and a default score of 70.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::interview::prompts::{
    build_next_question_prompt, build_system_prompt, START_PROMPT_NO_RESUME,
    START_PROMPT_WITH_RESUME, SUMMARY_PROMPT_TEMPLATE,
};
use crate::interview::state::{is_question_similar, InterviewState};
use crate::llm_client::{parse_reply, CallOptions, ChatMessage, LlmClient, LlmError, LlmRole};
use crate::models::interview::{
    Answer, AnswerAnalysis, CompanyPersona, Difficulty, InterviewSummary, MetricsSnapshot,
    Question, QuestionCategory, QuestionFeedback,
};
use crate::models::profile::CandidateProfile;

/// Questions substituted when the model repeats itself.
const FALLBACK_QUESTIONS: &[&str] = &[
    "Tell me about a time you had to learn something new quickly.",
    "Describe a situation where you had to work with a difficult team member.",
    "What's your approach to handling tight deadlines?",
];

const DEFAULT_SCORE: u32 = 70;
const DEFAULT_QUESTION: &str = "Tell me more about your experience.";
const DEFAULT_STRENGTH: &str = "Provided relevant information";
const DEFAULT_IMPROVEMENT: &str = "Add more specific examples";
const DEFAULT_FEEDBACK: &str = "Good answer.";

static STAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)situation|task|action|result").expect("STAR pattern compiles"));

#[derive(Debug, Clone, Serialize)]
pub struct InterviewOpening {
    pub greeting: String,
    pub profile_summary: String,
    pub first_question: Question,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnFeedback {
    pub strength: String,
    pub improvement: String,
    pub feedback_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextTurn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    pub acknowledgement: String,
    pub should_end: bool,
    pub score: u32,
    pub feedback: TurnFeedback,
}

pub struct InterviewChatSession {
    profile: CandidateProfile,
    persona: CompanyPersona,
    adaptive_difficulty: bool,
    current_difficulty: Difficulty,
    question_count: u32,
    total_questions: u32,
    state: InterviewState,
}

impl InterviewChatSession {
    pub fn new(
        profile: CandidateProfile,
        persona: CompanyPersona,
        adaptive_difficulty: bool,
        total_questions: u32,
    ) -> Self {
        let state = InterviewState::from_profile(&profile);
        Self {
            profile,
            persona,
            adaptive_difficulty,
            current_difficulty: Difficulty::Medium,
            question_count: 0,
            total_questions,
            state,
        }
    }

    /// Opens the interview with a greeting, a one-line profile summary, and
    /// the first question.
    pub async fn start(&mut self, llm: &LlmClient) -> Result<InterviewOpening, LlmError> {
        let system = build_system_prompt(&self.profile, self.persona, &self.state);
        let user = if self.profile.has_resume() {
            START_PROMPT_WITH_RESUME
        } else {
            START_PROMPT_NO_RESUME
        };

        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let completion = llm
            .call(
                LlmRole::Interviewer,
                &messages,
                CallOptions { temperature: 0.7, max_tokens: 256 },
            )
            .await?;
        let parsed = parse_reply(&completion.content);

        let question_text =
            field_or(&parsed, "question", "Tell me about yourself.").to_string();
        let question = self.make_question(
            &question_text,
            QuestionCategory::parse(field_or(&parsed, "category", "behavioral")),
        );
        self.state.add_question(&question.question);
        let topic = self.state.infer_topic(&question.question);
        self.state.mark_topic_asked(&topic);

        Ok(InterviewOpening {
            greeting: field_or(&parsed, "greeting", "Hello! Thanks for joining me today.")
                .to_string(),
            profile_summary: field_or(
                &parsed,
                "profileSummary",
                "I see you have great experience.",
            )
            .to_string(),
            first_question: question,
        })
    }

    /// Scores the previous answer and produces the next question in one call.
    /// `question_number` is 1-based; reaching `total_questions` ends the
    /// interview without calling the model.
    pub async fn next_question(
        &mut self,
        llm: &LlmClient,
        previous_question: &str,
        previous_answer: &str,
        snapshot: &MetricsSnapshot,
        question_number: u32,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<NextTurn, LlmError> {
        if self.adaptive_difficulty {
            self.adjust_difficulty(snapshot.confidence);
        }

        if question_number >= self.total_questions {
            return Ok(NextTurn {
                question: None,
                acknowledgement: "Thanks! Let me prepare your feedback.".to_string(),
                should_end: true,
                score: DEFAULT_SCORE,
                feedback: TurnFeedback {
                    strength: String::new(),
                    improvement: String::new(),
                    feedback_text: String::new(),
                },
            });
        }

        let system = build_system_prompt(&self.profile, self.persona, &self.state);
        let user = build_next_question_prompt(previous_question, previous_answer, snapshot.confidence);
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];

        let completion = llm
            .call_stream(
                LlmRole::Interviewer,
                &messages,
                CallOptions { temperature: 0.7, max_tokens: 400 },
                on_chunk,
            )
            .await?;
        let parsed = parse_reply(&completion.content);

        let score = parsed
            .get("score")
            .and_then(Value::as_u64)
            .map(|s| s.min(100) as u32)
            .unwrap_or(DEFAULT_SCORE);
        let feedback = TurnFeedback {
            strength: field_or(&parsed, "strength", DEFAULT_STRENGTH).to_string(),
            improvement: field_or(&parsed, "improvement", DEFAULT_IMPROVEMENT).to_string(),
            feedback_text: field_or(&parsed, "feedback", DEFAULT_FEEDBACK).to_string(),
        };

        let question_text = field_or(&parsed, "question", DEFAULT_QUESTION).to_string();

        // Novelty gate: a repeat gets replaced from the canned list
        if is_question_similar(&question_text, &self.state.asked_questions) {
            warn!("Generated question too similar to an earlier one, using fallback");
            let fallback =
                FALLBACK_QUESTIONS[self.question_count as usize % FALLBACK_QUESTIONS.len()];
            self.state.add_question(fallback);
            let question = self.make_question(fallback, QuestionCategory::Behavioral);

            return Ok(NextTurn {
                question: Some(question),
                acknowledgement: field_or(&parsed, "ack", "Got it").to_string(),
                should_end: false,
                score,
                feedback,
            });
        }

        self.state.add_question(&question_text);
        let topic = self.state.infer_topic(&question_text);
        self.state.mark_topic_asked(&topic);

        let question = self.make_question(
            &question_text,
            QuestionCategory::parse(field_or(&parsed, "category", "behavioral")),
        );

        Ok(NextTurn {
            question: Some(question),
            acknowledgement: field_or(&parsed, "ack", "").to_string(),
            should_end: false,
            score,
            feedback,
        })
    }

    /// Heuristic quality gates applied before any model-based scoring.
    pub fn quick_score(&self, answer: &str, snapshot: &MetricsSnapshot) -> AnswerAnalysis {
        let trimmed = answer.trim();
        let word_count = trimmed.split_whitespace().count();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("pass") {
            return AnswerAnalysis {
                overall_score: 0,
                relevance: 0,
                structure: 0,
                depth: 0,
                clarity: 0,
                feedback: "Question was skipped or unanswered.".to_string(),
                strengths: vec![],
                improvements: vec![
                    "Provide an answer to demonstrate your experience".to_string()
                ],
                ideal_answer_outline: String::new(),
            };
        }

        if word_count < 20 {
            return AnswerAnalysis {
                overall_score: 30,
                relevance: 3,
                structure: 3,
                depth: 2,
                clarity: 4,
                feedback: "Answer is too short. Expand using the STAR method: describe the \
                    Situation, Task, Action you took, and Result."
                    .to_string(),
                strengths: vec![],
                improvements: vec!["Provide more detail and specific examples".to_string()],
                ideal_answer_outline: String::new(),
            };
        }

        let has_star = STAR_PATTERN.is_match(trimmed);
        let relevance: u8 = if word_count > 30 { 7 } else { 5 };
        let structure: u8 = if has_star { 8 } else { 6 };
        let depth: u8 = if word_count > 80 {
            8
        } else if word_count > 40 {
            6
        } else {
            4
        };
        let clarity: u8 = if snapshot.confidence > 0.7 { 8 } else { 6 };
        let overall_score =
            ((relevance + structure + depth + clarity) as f64 * 2.5).round() as u32;

        AnswerAnalysis {
            overall_score,
            relevance,
            structure,
            depth,
            clarity,
            feedback: String::new(), // filled by the LLM turn
            strengths: vec![],
            improvements: vec![],
            ideal_answer_outline: String::new(),
        }
    }

    /// Final interview summary. The model reply is optional: every field has
    /// a computed fallback, so a dead provider still yields a usable report.
    pub async fn final_summary(
        &self,
        llm: &LlmClient,
        answers: &[Answer],
    ) -> InterviewSummary {
        let avg_score = average_score(answers);

        let answer_lines = answers
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let excerpt: String = a.transcript.chars().take(100).collect();
                format!("Q{}: \"{excerpt}\"", i + 1)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = SUMMARY_PROMPT_TEMPLATE
            .replace("{answer_count}", &answers.len().to_string())
            .replace("{avg_score}", &(avg_score.round() as i64).to_string())
            .replace("{answer_lines}", &answer_lines);

        let messages = [ChatMessage::user(prompt)];
        let parsed = match llm
            .call(LlmRole::Interviewer, &messages, CallOptions { temperature: 0.7, max_tokens: 512 })
            .await
        {
            Ok(completion) => parse_reply(&completion.content),
            Err(e) => {
                warn!("Summary generation failed, using computed fallback: {e}");
                Value::Object(serde_json::Map::new())
            }
        };

        let detailed_feedback = answers
            .iter()
            .map(|a| match &a.analysis {
                Some(analysis) if !analysis.feedback.is_empty() => QuestionFeedback {
                    question_id: a.question_id.clone(),
                    feedback: analysis.feedback.clone(),
                    strengths: analysis.strengths.clone(),
                    improvements: analysis.improvements.clone(),
                },
                _ => QuestionFeedback {
                    question_id: a.question_id.clone(),
                    feedback: "Consider providing more concrete examples and measurable \
                        results to strengthen your answer."
                        .to_string(),
                    strengths: vec!["Provided a response to the question".to_string()],
                    improvements: vec![
                        "Add more specific examples from your experience".to_string()
                    ],
                },
            })
            .collect();

        InterviewSummary {
            overall_score: parsed
                .get("overallScore")
                .and_then(Value::as_u64)
                .map(|s| s.min(100) as u32)
                .unwrap_or(avg_score.round() as u32),
            summary: field_or(&parsed, "summary", "Good overall performance.").to_string(),
            key_strengths: string_list_or(&parsed, "keyStrengths", &["Clear communication"]),
            areas_for_improvement: string_list_or(
                &parsed,
                "areasForImprovement",
                &["Add more structure"],
            ),
            next_steps: string_list_or(&parsed, "nextSteps", &["Practice the STAR method"]),
            detailed_feedback,
        }
    }

    pub fn current_difficulty(&self) -> Difficulty {
        self.current_difficulty
    }

    fn adjust_difficulty(&mut self, confidence: f64) {
        self.current_difficulty = if confidence > 0.8 {
            Difficulty::Hard
        } else if confidence < 0.5 {
            Difficulty::Easy
        } else {
            Difficulty::Medium
        };
    }

    fn make_question(&mut self, text: &str, category: QuestionCategory) -> Question {
        let question = Question {
            id: format!("q-{}", self.question_count),
            question: text.to_string(),
            category,
            difficulty: self.current_difficulty,
            is_follow_up: false,
        };
        self.question_count += 1;
        question
    }

}

pub fn average_score(answers: &[Answer]) -> f64 {
    if answers.is_empty() {
        return 0.0;
    }
    answers
        .iter()
        .map(|a| {
            a.analysis
                .as_ref()
                .map(|x| x.overall_score as f64)
                .unwrap_or(DEFAULT_SCORE as f64)
        })
        .sum::<f64>()
        / answers.len() as f64
}

fn field_or<'a>(parsed: &'a Value, key: &str, default: &'a str) -> &'a str {
    parsed
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

fn string_list_or(parsed: &Value, key: &str, default: &[&str]) -> Vec<String> {
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
        .filter(|v: &Vec<String>| !v.is_empty())
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::AnswerMetrics;

    fn make_profile() -> CandidateProfile {
        CandidateProfile {
            skills: vec!["Rust".into()],
            years_of_experience: 5,
            domains: vec![],
            strengths: vec![],
            gaps: vec![],
            target_role: "Backend Engineer".into(),
            resume_text: String::new(),
            job_description: None,
        }
    }

    fn make_session() -> InterviewChatSession {
        InterviewChatSession::new(make_profile(), CompanyPersona::General, true, 10)
    }

    fn snapshot(confidence: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            confidence,
            engagement: 0.6,
            emotion: "neutral".to_string(),
            timestamp: 0,
        }
    }

    fn make_answer(score: Option<u32>) -> Answer {
        Answer {
            question_id: "q-0".to_string(),
            transcript: "transcript".to_string(),
            started_at: 0,
            ended_at: 30_000,
            metrics: AnswerMetrics {
                word_count: 50,
                speaking_speed: 120,
                filler_words: 1,
                pause_count: 2,
                avg_pause_length: 0.5,
                confidence: 0.7,
                engagement: 0.6,
                eye_contact: 0.5,
                emotion_timeline: vec![],
            },
            analysis: score.map(|overall_score| AnswerAnalysis {
                overall_score,
                relevance: 7,
                structure: 6,
                depth: 6,
                clarity: 8,
                feedback: String::new(),
                strengths: vec![],
                improvements: vec![],
                ideal_answer_outline: String::new(),
            }),
        }
    }

    #[test]
    fn test_quick_score_skipped_answer_is_zero() {
        let session = make_session();
        let analysis = session.quick_score("pass", &snapshot(0.8));
        assert_eq!(analysis.overall_score, 0);
        assert!(analysis.feedback.contains("skipped"));
    }

    #[test]
    fn test_quick_score_short_answer_gated() {
        let session = make_session();
        let analysis = session.quick_score("I wrote some Rust once.", &snapshot(0.8));
        assert_eq!(analysis.overall_score, 30);
        assert!(analysis.feedback.contains("STAR"));
    }

    #[test]
    fn test_quick_score_star_structure_bonus() {
        let session = make_session();
        let with_star = "The situation was a failing deploy. My task was rollback. \
            The action I took was reverting the migration and the result was a clean release. \
            Everyone was satisfied with that outcome overall.";
        let without_star = "We had a failing deploy so I reverted the migration and shipped \
            a clean release. Everyone was satisfied with how it went for the whole team there.";
        let a = session.quick_score(with_star, &snapshot(0.8));
        let b = session.quick_score(without_star, &snapshot(0.8));
        assert_eq!(a.structure, 8);
        assert_eq!(b.structure, 6);
        assert!(a.overall_score > b.overall_score);
    }

    #[test]
    fn test_quick_score_overall_is_scaled_sum() {
        let session = make_session();
        // 43 words, no STAR keywords, high confidence: 7 + 6 + 6 + 8 = 27 → 68
        let answer = "We migrated the billing pipeline to a new queue system without \
            downtime by mirroring live traffic for a full week and comparing outputs \
            nightly before cutting over, which caught two serialization bugs early and \
            kept every customer invoice correct during the eventual switch.";
        assert_eq!(answer.split_whitespace().count(), 43);
        let analysis = session.quick_score(answer, &snapshot(0.9));
        assert_eq!(analysis.overall_score, 68);
    }

    #[test]
    fn test_difficulty_thresholds() {
        let mut session = make_session();
        session.adjust_difficulty(0.85);
        assert_eq!(session.current_difficulty(), Difficulty::Hard);
        session.adjust_difficulty(0.3);
        assert_eq!(session.current_difficulty(), Difficulty::Easy);
        session.adjust_difficulty(0.65);
        assert_eq!(session.current_difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_question_ids_increment() {
        let mut session = make_session();
        let first = session.make_question("One?", QuestionCategory::Behavioral);
        let second = session.make_question("Two?", QuestionCategory::Technical);
        assert_eq!(first.id, "q-0");
        assert_eq!(second.id, "q-1");
    }

    #[test]
    fn test_average_score_defaults_unanalyzed_answers() {
        let answers = vec![make_answer(Some(90)), make_answer(None)];
        // (90 + 70) / 2
        assert_eq!(average_score(&answers), 80.0);
    }

    #[test]
    fn test_average_score_empty_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn test_field_or_skips_blank_strings() {
        let parsed = serde_json::json!({ "question": "   " });
        assert_eq!(field_or(&parsed, "question", "fallback"), "fallback");
    }

    #[test]
    fn test_string_list_or_uses_default_when_missing() {
        let parsed = serde_json::json!({});
        let list = string_list_or(&parsed, "keyStrengths", &["a", "b"]);
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn test_string_list_or_reads_present_list() {
        let parsed = serde_json::json!({ "nextSteps": ["practice", "record yourself"] });
        let list = string_list_or(&parsed, "nextSteps", &["x"]);
        assert_eq!(list, vec!["practice", "record yourself"]);
    }
}
