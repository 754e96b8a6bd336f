//! Axum route handlers for running interviews and browsing interview history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::session::{average_score, InterviewChatSession, NextTurn, TurnFeedback};
use crate::metrics::emotion::{
    combine_confidence_signals, emotion_to_confidence, FallbackSampler,
};
use crate::metrics::transcript::deduplicate_repeats;
use crate::metrics::{
    analyze_transcript, filler_score, length_score, pace_score, pace_trend, weakest_competency,
    PaceTrend, WeakestCompetency,
};
use crate::models::interview::{
    Answer, AnswerAnalysis, AnswerMetrics, CompanyPersona, EmotionSnapshot, InterviewSummary,
    MetricsSnapshot, Question,
};
use crate::models::profile::CandidateProfile;
use crate::models::session::{AnswerScores, SessionAnswer, SessionRecord};
use crate::state::AppState;
use crate::storage::sessions::{SessionStatistics, TrendPoint};

const DEFAULT_TOTAL_QUESTIONS: u32 = 10;

/// An interview in flight: the chat session plus the bookkeeping needed to
/// assemble the persisted record at completion.
pub struct ActiveInterview {
    pub session: InterviewChatSession,
    pub template: String,
    pub template_name: String,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub profile: CandidateProfile,
    #[serde(default)]
    pub persona: CompanyPersona,
    #[serde(default = "default_adaptive")]
    pub adaptive_difficulty: bool,
    #[serde(default = "default_total_questions")]
    pub total_questions: u32,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_template_name")]
    pub template_name: String,
}

fn default_adaptive() -> bool {
    true
}

fn default_total_questions() -> u32 {
    DEFAULT_TOTAL_QUESTIONS
}

fn default_template() -> String {
    "general".to_string()
}

fn default_template_name() -> String {
    "General Interview".to_string()
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub interview_id: Uuid,
    pub greeting: String,
    pub profile_summary: String,
    pub question: Question,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub transcript: String,
    /// Unix milliseconds.
    pub started_at: i64,
    pub ended_at: i64,
    /// Camera-side samples; synthesized when absent.
    #[serde(default)]
    pub emotion_timeline: Vec<EmotionSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub metrics: AnswerMetrics,
    pub analysis: AnswerAnalysis,
    pub acknowledgement: String,
    pub score: u32,
    pub feedback: TurnFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<Question>,
    pub should_end: bool,
}

#[derive(Debug, Serialize)]
pub struct FinishInterviewResponse {
    pub summary: InterviewSummary,
    pub record: SessionRecord,
    pub pace: PaceTrend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest_competency: Option<WeakestCompetency>,
}

// ────────────────────────────────────────────────────────────────────────────
// Interview lifecycle handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Builds the chat session from the profile and returns the opening turn.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    if request.profile.target_role.trim().is_empty() {
        return Err(AppError::Validation("profile.target_role cannot be empty".to_string()));
    }
    if request.total_questions == 0 {
        return Err(AppError::Validation("total_questions must be at least 1".to_string()));
    }

    let mut session = InterviewChatSession::new(
        request.profile,
        request.persona,
        request.adaptive_difficulty,
        request.total_questions,
    );

    let opening = session
        .start(&state.llm)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to start interview: {e}")))?;

    let interview_id = Uuid::new_v4();
    let active = ActiveInterview {
        session,
        template: request.template,
        template_name: request.template_name,
        questions: vec![opening.first_question.clone()],
        answers: Vec::new(),
    };
    state.interviews.lock().expect("interview map lock").insert(interview_id, active);

    tracing::info!("Started interview {interview_id}");

    Ok(Json(StartInterviewResponse {
        interview_id,
        greeting: opening.greeting,
        profile_summary: opening.profile_summary,
        question: opening.first_question,
    }))
}

/// POST /api/v1/interviews/:id/answers
///
/// Scores the submitted answer, advances the session, and returns the next
/// question (or the end-of-interview marker).
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    if request.ended_at < request.started_at {
        return Err(AppError::Validation("ended_at precedes started_at".to_string()));
    }

    // The session moves out of the map for the duration of the turn; one
    // in-flight answer per interview, like a single browser tab.
    let mut active = take_interview(&state, interview_id)?;

    let transcript = deduplicate_repeats(request.transcript.trim());

    let timeline = if request.emotion_timeline.is_empty() {
        FallbackSampler::sample_timeline(request.started_at, request.ended_at)
    } else {
        request.emotion_timeline
    };

    let metrics =
        analyze_transcript(&transcript, request.started_at, request.ended_at, timeline);

    // Blend text emotion with the delivery heuristics into the rolling
    // confidence the session uses for adaptive difficulty.
    let text_emotion = state.emotion.analyze(&transcript).await;
    let confidence = combine_confidence_signals(
        emotion_to_confidence(&text_emotion.dominant_emotion, text_emotion.confidence_score),
        pace_score(metrics.speaking_speed as f64),
        filler_score(metrics.filler_words, metrics.word_count),
        length_score(metrics.word_count),
    );
    let snapshot = MetricsSnapshot {
        confidence,
        engagement: metrics.engagement,
        emotion: text_emotion.dominant_emotion.clone(),
        timestamp: request.ended_at,
    };

    let current_question = active
        .questions
        .last()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("interview has no open question")))?;
    let question_number = active.answers.len() as u32 + 1;

    let mut quick = active.session.quick_score(&transcript, &snapshot);

    let mut chunk_sink = |chunk: &str| {
        tracing::trace!(target: "interviewer_stream", "{chunk}");
    };
    let turn = active
        .session
        .next_question(
            &state.llm,
            &current_question.question,
            &transcript,
            &snapshot,
            question_number,
            &mut chunk_sink,
        )
        .await;

    let turn = match turn {
        Ok(turn) => turn,
        Err(e) => {
            // Put the session back so the client can retry the turn
            state.interviews.lock().expect("interview map lock").insert(interview_id, active);
            return Err(AppError::Llm(format!("Next-question call failed: {e}")));
        }
    };

    apply_turn_feedback(&mut quick, &turn);

    active.answers.push(Answer {
        question_id: current_question.id.clone(),
        transcript: transcript.clone(),
        started_at: request.started_at,
        ended_at: request.ended_at,
        metrics: metrics.clone(),
        analysis: Some(quick.clone()),
    });
    if let Some(question) = &turn.question {
        active.questions.push(question.clone());
    }

    state.interviews.lock().expect("interview map lock").insert(interview_id, active);

    Ok(Json(SubmitAnswerResponse {
        metrics,
        analysis: quick,
        acknowledgement: turn.acknowledgement,
        score: turn.score,
        feedback: turn.feedback,
        next_question: turn.question,
        should_end: turn.should_end,
    }))
}

/// POST /api/v1/interviews/:id/finish
///
/// Generates the final summary, persists the session record, and drops the
/// active session.
pub async fn handle_finish_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<FinishInterviewResponse>, AppError> {
    let active = take_interview(&state, interview_id)?;

    let summary = active.session.final_summary(&state.llm, &active.answers).await;

    let speeds: Vec<f64> = active
        .answers
        .iter()
        .map(|a| a.metrics.speaking_speed as f64)
        .collect();
    let pace = pace_trend(&speeds);

    let competency_items: Vec<_> = active
        .answers
        .iter()
        .map(|answer| {
            let category = active
                .questions
                .iter()
                .find(|q| q.id == answer.question_id)
                .map(|q| q.category)
                .unwrap_or(crate::models::interview::QuestionCategory::Behavioral);
            let score = answer
                .analysis
                .as_ref()
                .map(|a| a.overall_score)
                .unwrap_or(70);
            (category, answer.question_id.clone(), score)
        })
        .collect();
    let weakest = weakest_competency(&competency_items);

    let record = build_session_record(&active);
    state
        .store
        .save_session(&record)
        .map_err(|e| AppError::Storage(format!("Failed to persist session: {e}")))?;

    tracing::info!(
        "Finished interview {interview_id}: {} answers, score {:.1}",
        record.questions_answered,
        record.score
    );

    Ok(Json(FinishInterviewResponse {
        summary,
        record,
        pace,
        weakest_competency: weakest,
    }))
}

fn take_interview(state: &AppState, interview_id: Uuid) -> Result<ActiveInterview, AppError> {
    state
        .interviews
        .lock()
        .expect("interview map lock")
        .remove(&interview_id)
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
}

/// The LLM turn refines the heuristic gate: its score and targeted feedback
/// replace the placeholder fields, the numeric sub-scores stay heuristic.
fn apply_turn_feedback(analysis: &mut AnswerAnalysis, turn: &NextTurn) {
    analysis.overall_score = turn.score;
    if !turn.feedback.feedback_text.is_empty() {
        analysis.feedback = turn.feedback.feedback_text.clone();
    }
    if !turn.feedback.strength.is_empty() {
        analysis.strengths = vec![turn.feedback.strength.clone()];
    }
    if !turn.feedback.improvement.is_empty() {
        analysis.improvements = vec![turn.feedback.improvement.clone()];
    }
}

fn build_session_record(active: &ActiveInterview) -> SessionRecord {
    let answers: Vec<SessionAnswer> = active
        .answers
        .iter()
        .map(|answer| {
            let question_text = active
                .questions
                .iter()
                .find(|q| q.id == answer.question_id)
                .map(|q| q.question.clone())
                .unwrap_or_default();
            let time_spent = (answer.ended_at - answer.started_at) as f64 / 1000.0;

            let scores = match &answer.analysis {
                Some(a) => AnswerScores {
                    clarity: a.clarity as u32 * 10,
                    relevance: a.relevance as u32 * 10,
                    completeness: a.depth as u32 * 10,
                    technical_accuracy: a.structure as u32 * 10,
                    communication: (answer.metrics.engagement * 100.0).round() as u32,
                    overall: a.overall_score,
                },
                None => AnswerScores {
                    clarity: 70,
                    relevance: 70,
                    completeness: 70,
                    technical_accuracy: 70,
                    communication: 70,
                    overall: 70,
                },
            };

            SessionAnswer {
                question_id: answer.question_id.clone(),
                question_text,
                transcription: answer.transcript.clone(),
                time_spent,
                scores,
            }
        })
        .collect();

    let total_time: f64 = answers.iter().map(|a| a.time_spent).sum();
    let score = (average_score(&active.answers) * 10.0).round() / 10.0;

    SessionRecord {
        id: Uuid::new_v4(),
        date: chrono::Utc::now(),
        template: active.template.clone(),
        template_name: active.template_name.clone(),
        score,
        questions_answered: active.answers.len() as u32,
        total_time: total_time.round(),
        answers,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// History handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionRecord>>, AppError> {
    Ok(Json(state.store.list_sessions()))
}

/// GET /api/v1/sessions/statistics
pub async fn handle_session_statistics(
    State(state): State<AppState>,
) -> Result<Json<SessionStatistics>, AppError> {
    Ok(Json(state.store.session_statistics()))
}

/// GET /api/v1/sessions/trend
pub async fn handle_score_trend(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    Ok(Json(state.store.score_trend()))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionRecord>, AppError> {
    state
        .store
        .get_session(session_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .delete_session(session_id)
        .map_err(|e| AppError::Storage(format!("Failed to delete session: {e}")))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sessions
pub async fn handle_clear_sessions(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .clear_sessions()
        .map_err(|e| AppError::Storage(format!("Failed to clear sessions: {e}")))?;
    Ok(StatusCode::NO_CONTENT)
}
