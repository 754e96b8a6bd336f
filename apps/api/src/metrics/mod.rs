//! Metrics Engine — pure speech and behavior heuristics over finished answers.
//!
//! Every sub-score is a linear combination of heuristic counts against fixed
//! thresholds (120–150 WPM is the ideal pace, a filler ratio above 10% is too
//! many, and so on). No model calls happen here.

pub mod emotion;
pub mod transcript;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::interview::{AnswerMetrics, Emotion, EmotionSnapshot, QuestionCategory};

static FILLER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bum+\b",
        r"\buh+\b",
        r"\blike\b",
        r"\byou know\b",
        r"\bbasically\b",
        r"\bactually\b",
        r"\bliterally\b",
        r"\bkind of\b",
        r"\bsort of\b",
        r"\bi mean\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("filler pattern compiles"))
    .collect()
});

static PAUSE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"\s{2,}", r"\.\.\.", r"[.!?]\s+"]
        .iter()
        .map(|p| Regex::new(p).expect("pause pattern compiles"))
        .collect()
});

/// Raw counts feeding the confidence formula.
#[derive(Debug, Clone, Copy)]
pub struct SpeechCounts {
    pub speaking_speed: f64,
    pub filler_words: usize,
    pub word_count: usize,
    pub avg_pause_length: f64,
}

/// Analyzes a finished transcript and computes the full answer metrics.
/// `started_at`/`ended_at` are Unix milliseconds.
pub fn analyze_transcript(
    transcript: &str,
    started_at: i64,
    ended_at: i64,
    emotion_timeline: Vec<EmotionSnapshot>,
) -> AnswerMetrics {
    let duration = (ended_at - started_at) as f64 / 1000.0;
    let word_count = transcript.split_whitespace().count();

    let speaking_speed = if duration > 0.0 {
        word_count as f64 / duration * 60.0
    } else {
        0.0
    };

    let filler_words = count_filler_words(transcript);
    let pause_count = detect_pauses(transcript);

    // Rough estimate: anything beyond ~0.3s per spoken word is pause time.
    let avg_pause_length = if duration > 0.0 {
        (duration - word_count as f64 * 0.3) / pause_count.max(1) as f64
    } else {
        0.0
    };

    let avg_eye_contact = if emotion_timeline.is_empty() {
        0.5
    } else {
        emotion_timeline.iter().map(|e| e.eye_contact).sum::<f64>()
            / emotion_timeline.len() as f64
    };

    let counts = SpeechCounts {
        speaking_speed,
        filler_words,
        word_count,
        avg_pause_length,
    };

    let confidence = confidence_score(&counts);
    let engagement = engagement_score(
        speaking_speed,
        filler_words,
        word_count,
        avg_eye_contact,
        &emotion_timeline,
    );

    AnswerMetrics {
        word_count,
        speaking_speed: speaking_speed.round() as u32,
        filler_words,
        pause_count,
        avg_pause_length: (avg_pause_length * 10.0).round() / 10.0,
        confidence: round2(confidence),
        engagement: round2(engagement),
        eye_contact: round2(avg_eye_contact),
        emotion_timeline,
    }
}

/// Confidence from delivery counts, 0.0 – 1.0. Starts from a base of 70/100
/// and applies pace, filler, length, and pause bonuses/penalties.
pub fn confidence_score(counts: &SpeechCounts) -> f64 {
    let mut score: f64 = 70.0;

    let speed = counts.speaking_speed;
    if (120.0..=150.0).contains(&speed) {
        score += 10.0; // good pace
    } else if speed < 80.0 {
        score -= 15.0; // too slow
    } else if speed > 180.0 {
        score -= 10.0; // too fast
    } else if speed < 120.0 {
        score -= 5.0;
    } else {
        score -= 5.0; // 150–180 band
    }

    if counts.word_count > 0 {
        let filler_ratio = counts.filler_words as f64 / counts.word_count as f64;
        if filler_ratio > 0.1 {
            score -= 20.0;
        } else if filler_ratio > 0.05 {
            score -= 10.0;
        }
    }

    if counts.word_count < 20 {
        score -= 15.0;
    } else if counts.word_count < 40 {
        score -= 5.0;
    } else if counts.word_count > 200 {
        score -= 5.0; // rambling
    }

    if counts.avg_pause_length > 2.0 {
        score -= 10.0; // long hesitations
    } else if counts.avg_pause_length > 1.5 {
        score -= 5.0;
    }

    score.clamp(0.0, 100.0) / 100.0
}

/// Engagement as an equal-weight blend of pace, filler discipline, eye
/// contact, and positive-emotion share.
pub fn engagement_score(
    speaking_speed: f64,
    filler_words: usize,
    word_count: usize,
    eye_contact: f64,
    emotion_timeline: &[EmotionSnapshot],
) -> f64 {
    let speed_component = pace_score(speaking_speed);
    let filler_component = filler_score(filler_words, word_count);

    let emotion_component = if emotion_timeline.is_empty() {
        0.5
    } else {
        let positive = emotion_timeline
            .iter()
            .filter(|e| matches!(e.emotion, Emotion::Happy | Emotion::Confident))
            .count();
        positive as f64 / emotion_timeline.len() as f64
    };

    speed_component * 0.25 + filler_component * 0.25 + eye_contact * 0.25 + emotion_component * 0.25
}

/// Pace sub-signal: full marks within the comfortable 100–160 WPM band.
pub fn pace_score(speaking_speed: f64) -> f64 {
    if (100.0..=160.0).contains(&speaking_speed) {
        1.0
    } else {
        0.7
    }
}

/// Filler sub-signal: each percentage point of filler ratio costs 5%.
pub fn filler_score(filler_words: usize, word_count: usize) -> f64 {
    let ratio = if word_count > 0 {
        filler_words as f64 / word_count as f64
    } else {
        0.0
    };
    (1.0 - ratio * 5.0).max(0.0)
}

/// Answer-length sub-signal used when blending confidence sources.
pub fn length_score(word_count: usize) -> f64 {
    if word_count < 20 {
        0.4
    } else if word_count < 40 {
        0.6
    } else if word_count > 200 {
        0.8
    } else {
        0.9
    }
}

pub fn count_filler_words(transcript: &str) -> usize {
    FILLER_PATTERNS
        .iter()
        .map(|p| p.find_iter(transcript).count())
        .sum()
}

/// Pause estimate from transcript texture: runs of whitespace, ellipses, and
/// sentence breaks. Always at least 1 to keep averages defined.
pub fn detect_pauses(transcript: &str) -> usize {
    let count: usize = PAUSE_PATTERNS
        .iter()
        .map(|p| p.find_iter(transcript).count())
        .sum();
    count.max(1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Cross-answer aggregates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaceTrend {
    pub trend: Trend,
    pub avg_speed: u32,
    pub consistency: f64,
}

/// Compares first-half and second-half average WPM across a session's answers.
/// A ±10% shift counts as a trend; consistency falls with variance.
pub fn pace_trend(speeds: &[f64]) -> PaceTrend {
    if speeds.len() < 2 {
        return PaceTrend { trend: Trend::Stable, avg_speed: 0, consistency: 1.0 };
    }

    let avg = speeds.iter().sum::<f64>() / speeds.len() as f64;

    let mid = speeds.len() / 2;
    let first_avg = speeds[..mid].iter().sum::<f64>() / mid as f64;
    let second_avg = speeds[mid..].iter().sum::<f64>() / (speeds.len() - mid) as f64;

    let trend = if second_avg > first_avg * 1.1 {
        Trend::Improving
    } else if second_avg < first_avg * 0.9 {
        Trend::Declining
    } else {
        Trend::Stable
    };

    let variance =
        speeds.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / speeds.len() as f64;
    let consistency = (1.0 - variance / 1000.0).max(0.0);

    PaceTrend {
        trend,
        avg_speed: avg.round() as u32,
        consistency: round2(consistency),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeakestCompetency {
    pub competency: QuestionCategory,
    pub avg_score: f64,
    pub question_ids: Vec<String>,
}

/// Finds the question category with the lowest average score.
/// Items are (category, question id, overall score 0–100).
pub fn weakest_competency(
    items: &[(QuestionCategory, String, u32)],
) -> Option<WeakestCompetency> {
    let mut by_category: Vec<(QuestionCategory, Vec<u32>, Vec<String>)> = Vec::new();

    for (category, question_id, score) in items {
        match by_category.iter_mut().find(|(c, _, _)| c == category) {
            Some((_, scores, ids)) => {
                scores.push(*score);
                ids.push(question_id.clone());
            }
            None => by_category.push((*category, vec![*score], vec![question_id.clone()])),
        }
    }

    by_category
        .into_iter()
        .map(|(category, scores, question_ids)| WeakestCompetency {
            competency: category,
            avg_score: scores.iter().sum::<u32>() as f64 / scores.len() as f64,
            question_ids,
        })
        .min_by(|a, b| {
            a.avg_score
                .partial_cmp(&b.avg_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(speed: f64, fillers: usize, words: usize, avg_pause: f64) -> SpeechCounts {
        SpeechCounts {
            speaking_speed: speed,
            filler_words: fillers,
            word_count: words,
            avg_pause_length: avg_pause,
        }
    }

    #[test]
    fn test_clean_150_word_minute_answer_scores_high() {
        // 25 short sentences, 150 words, 60 seconds, no filler words.
        let transcript = "We shipped the project on schedule. ".repeat(25);
        let metrics = analyze_transcript(transcript.trim(), 0, 60_000, vec![]);
        assert_eq!(metrics.word_count, 150);
        assert_eq!(metrics.speaking_speed, 150);
        assert_eq!(metrics.filler_words, 0);
        assert!(
            metrics.confidence >= 0.8,
            "confidence was {}",
            metrics.confidence
        );
    }

    #[test]
    fn test_ideal_pace_earns_bonus() {
        let ideal = confidence_score(&counts(135.0, 0, 100, 0.5));
        let slow = confidence_score(&counts(60.0, 0, 100, 0.5));
        assert!(ideal > slow);
        assert_eq!(ideal, 0.8);
        assert_eq!(slow, 0.55);
    }

    #[test]
    fn test_filler_heavy_answer_penalized() {
        // 15 fillers in 100 words = 15% ratio → −20
        let heavy = confidence_score(&counts(135.0, 15, 100, 0.5));
        assert_eq!(heavy, 0.6);
        // 7% ratio → −10
        let moderate = confidence_score(&counts(135.0, 7, 100, 0.5));
        assert_eq!(moderate, 0.7);
    }

    #[test]
    fn test_short_answer_penalized() {
        let short = confidence_score(&counts(135.0, 0, 10, 0.5));
        assert_eq!(short, 0.65);
    }

    #[test]
    fn test_long_pauses_penalized() {
        let hesitant = confidence_score(&counts(135.0, 0, 100, 2.5));
        assert_eq!(hesitant, 0.7);
    }

    #[test]
    fn test_confidence_clamped_to_unit_interval() {
        let worst = confidence_score(&counts(40.0, 30, 10, 3.0));
        assert!(worst >= 0.0);
        let best = confidence_score(&counts(135.0, 0, 100, 0.2));
        assert!(best <= 1.0);
    }

    #[test]
    fn test_count_filler_words() {
        let transcript = "Um, I actually think, like, you know, it basically worked";
        assert_eq!(count_filler_words(transcript), 5);
    }

    #[test]
    fn test_filler_matching_is_word_bounded() {
        // "unlike" and "actuality" must not match "like"/"actually"
        assert_eq!(count_filler_words("unlike the actuality of it"), 0);
    }

    #[test]
    fn test_detect_pauses_minimum_one() {
        assert_eq!(detect_pauses("no pauses here"), 1);
    }

    #[test]
    fn test_detect_pauses_counts_breaks() {
        let transcript = "I paused... then continued. And finished! Done";
        // one ellipsis + three punctuation-then-space breaks
        assert_eq!(detect_pauses(transcript), 4);
    }

    #[test]
    fn test_engagement_perfect_inputs() {
        let timeline = vec![EmotionSnapshot {
            timestamp: 0,
            emotion: Emotion::Confident,
            confidence: 0.8,
            eye_contact: 1.0,
            smile_intensity: 0.5,
        }];
        let score = engagement_score(130.0, 0, 100, 1.0, &timeline);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engagement_defaults_without_timeline() {
        // 0.25·0.7 + 0.25·1.0 + 0.25·0.5 + 0.25·0.5
        let score = engagement_score(50.0, 0, 100, 0.5, &[]);
        assert!((score - 0.675).abs() < 1e-9);
    }

    #[test]
    fn test_pace_trend_improving() {
        let report = pace_trend(&[100.0, 105.0, 130.0, 140.0]);
        assert_eq!(report.trend, Trend::Improving);
    }

    #[test]
    fn test_pace_trend_declining() {
        let report = pace_trend(&[140.0, 135.0, 100.0, 95.0]);
        assert_eq!(report.trend, Trend::Declining);
    }

    #[test]
    fn test_pace_trend_single_answer_is_stable() {
        let report = pace_trend(&[120.0]);
        assert_eq!(report.trend, Trend::Stable);
        assert_eq!(report.consistency, 1.0);
    }

    #[test]
    fn test_weakest_competency_picks_lowest_average() {
        let items = vec![
            (QuestionCategory::Behavioral, "q-0".to_string(), 80),
            (QuestionCategory::Technical, "q-1".to_string(), 50),
            (QuestionCategory::Technical, "q-2".to_string(), 60),
            (QuestionCategory::Culture, "q-3".to_string(), 90),
        ];
        let weakest = weakest_competency(&items).unwrap();
        assert_eq!(weakest.competency, QuestionCategory::Technical);
        assert_eq!(weakest.avg_score, 55.0);
        assert_eq!(weakest.question_ids, vec!["q-1", "q-2"]);
    }

    #[test]
    fn test_weakest_competency_empty_is_none() {
        assert!(weakest_competency(&[]).is_none());
    }

    #[test]
    fn test_zero_duration_yields_zero_speed() {
        let metrics = analyze_transcript("some words here", 1000, 1000, vec![]);
        assert_eq!(metrics.speaking_speed, 0);
        assert_eq!(metrics.avg_pause_length, 0.0);
    }
}
