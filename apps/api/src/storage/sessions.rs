//! Interview session history: a newest-first list capped at 20 records,
//! plus the aggregates the progress views are built from.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::models::session::SessionRecord;
use crate::storage::JsonStore;

const SESSIONS_FILE: &str = "sessions.json";

/// Oldest records beyond this are dropped on save.
const MAX_SESSIONS: usize = 20;

/// Sessions feeding each side of the improvement-rate comparison.
const IMPROVEMENT_WINDOW: usize = 5;

/// Sessions shown in the score trend chart.
const TREND_WINDOW: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatistics {
    pub total_interviews: usize,
    pub average_score: f64,
    pub total_questions: u32,
    /// Minutes.
    pub total_time: i64,
    /// Percent change of the newest five sessions over the oldest five.
    pub improvement_rate: f64,
    pub category_scores: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub session: usize,
    pub score: f64,
    pub date: String,
    pub template: String,
}

impl JsonStore {
    /// All sessions, newest first.
    pub fn list_sessions(&self) -> Vec<SessionRecord> {
        self.read_list(SESSIONS_FILE)
    }

    pub fn get_session(&self, id: Uuid) -> Option<SessionRecord> {
        self.list_sessions().into_iter().find(|s| s.id == id)
    }

    /// Prepends the record and enforces the retention cap.
    pub fn save_session(&self, record: &SessionRecord) -> Result<()> {
        let mut sessions = self.list_sessions();
        sessions.insert(0, record.clone());
        sessions.truncate(MAX_SESSIONS);
        self.write_list(SESSIONS_FILE, &sessions)
    }

    pub fn delete_session(&self, id: Uuid) -> Result<()> {
        let sessions: Vec<SessionRecord> = self
            .list_sessions()
            .into_iter()
            .filter(|s| s.id != id)
            .collect();
        self.write_list(SESSIONS_FILE, &sessions)
    }

    pub fn clear_sessions(&self) -> Result<()> {
        self.write_list::<SessionRecord>(SESSIONS_FILE, &[])
    }

    pub fn session_statistics(&self) -> SessionStatistics {
        let sessions = self.list_sessions();
        if sessions.is_empty() {
            return SessionStatistics {
                total_interviews: 0,
                average_score: 0.0,
                total_questions: 0,
                total_time: 0,
                improvement_rate: 0.0,
                category_scores: HashMap::new(),
            };
        }

        let total_interviews = sessions.len();
        let average_score =
            sessions.iter().map(|s| s.score).sum::<f64>() / total_interviews as f64;
        let total_questions = sessions.iter().map(|s| s.questions_answered).sum();
        let total_seconds: f64 = sessions.iter().map(|s| s.total_time).sum();

        // Newest five vs oldest five, only meaningful with ten or more
        let improvement_rate = if sessions.len() >= IMPROVEMENT_WINDOW * 2 {
            let recent_avg = sessions[..IMPROVEMENT_WINDOW]
                .iter()
                .map(|s| s.score)
                .sum::<f64>()
                / IMPROVEMENT_WINDOW as f64;
            let older_avg = sessions[sessions.len() - IMPROVEMENT_WINDOW..]
                .iter()
                .map(|s| s.score)
                .sum::<f64>()
                / IMPROVEMENT_WINDOW as f64;
            if older_avg > 0.0 {
                (recent_avg - older_avg) / older_avg * 100.0
            } else {
                0.0
            }
        } else {
            0.0
        };

        let mut totals: HashMap<String, (f64, usize)> = HashMap::new();
        for session in &sessions {
            let entry = totals.entry(session.template.clone()).or_insert((0.0, 0));
            entry.0 += session.score;
            entry.1 += 1;
        }
        let category_scores = totals
            .into_iter()
            .map(|(template, (sum, count))| (template, sum / count as f64))
            .collect();

        SessionStatistics {
            total_interviews,
            average_score: round1(average_score),
            total_questions,
            total_time: (total_seconds / 60.0).round() as i64,
            improvement_rate: round1(improvement_rate),
            category_scores,
        }
    }

    /// The newest sessions in chronological order, for charting.
    pub fn score_trend(&self) -> Vec<TrendPoint> {
        let sessions = self.list_sessions();
        sessions
            .iter()
            .take(TREND_WINDOW)
            .rev()
            .enumerate()
            .map(|(index, session)| TrendPoint {
                session: index + 1,
                score: session.score,
                date: session.date.format("%Y-%m-%d").to_string(),
                template: session.template_name.clone(),
            })
            .collect()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
