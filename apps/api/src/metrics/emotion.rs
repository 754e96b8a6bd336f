//! Emotion analysis — remote classifier when configured, word-list heuristic
//! otherwise — plus the weighted-random sampler used when the capture client
//! supplies no emotion timeline.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::interview::{Emotion, EmotionSnapshot};

const HF_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";
const HF_API_URL: &str = "https://api-inference.huggingface.co/models";
const HF_INPUT_CAP: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmotionAnalysis {
    pub dominant_emotion: String,
    pub confidence_score: f64,
    pub emotions: Vec<EmotionScore>,
}

/// Text-emotion backend. Carried in `AppState` as `Arc<dyn EmotionAnalyzer>`
/// and selected at startup: the remote classifier when an HF key is present,
/// the heuristic otherwise.
#[async_trait]
pub trait EmotionAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> EmotionAnalysis;
}

/// Word-list heuristic. Never fails, never leaves the process.
pub struct HeuristicAnalyzer;

#[async_trait]
impl EmotionAnalyzer for HeuristicAnalyzer {
    async fn analyze(&self, text: &str) -> EmotionAnalysis {
        analyze_heuristic(text)
    }
}

/// HuggingFace inference API classifier. Any failure falls back to the
/// heuristic — emotion tagging must never block an interview turn.
pub struct HfAnalyzer {
    client: reqwest::Client,
    api_key: String,
}

impl HfAnalyzer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>, reqwest::Error> {
        let input: String = text.chars().take(HF_INPUT_CAP).collect();
        let body = serde_json::json!({
            "inputs": input,
            "options": { "wait_for_model": true }
        });

        let response = self
            .client
            .post(format!("{HF_API_URL}/{HF_MODEL}"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        // The API returns either [[{label, score}, ...]] or [{label, score}, ...]
        let value: serde_json::Value = response.json().await?;
        let scores = value
            .get(0)
            .filter(|v| v.is_array())
            .cloned()
            .unwrap_or(value);
        Ok(serde_json::from_value(scores).unwrap_or_default())
    }
}

#[async_trait]
impl EmotionAnalyzer for HfAnalyzer {
    async fn analyze(&self, text: &str) -> EmotionAnalysis {
        match self.classify(text).await {
            Ok(emotions) => {
                let dominant = emotions.iter().max_by(|a, b| {
                    a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)
                });
                match dominant.cloned() {
                    Some(dominant) => EmotionAnalysis {
                        dominant_emotion: dominant.label,
                        confidence_score: dominant.score,
                        emotions,
                    },
                    None => analyze_heuristic(text),
                }
            }
            Err(e) => {
                warn!("Emotion classifier failed, using heuristic: {e}");
                analyze_heuristic(text)
            }
        }
    }
}

const POSITIVE_WORDS: &[&str] =
    &["success", "achieved", "accomplished", "improved", "great", "excellent", "proud"];
const NEGATIVE_WORDS: &[&str] =
    &["difficult", "challenge", "problem", "failed", "struggle", "hard"];
const CONFIDENT_WORDS: &[&str] = &["definitely", "certainly", "always", "confident", "sure"];
const UNCERTAIN_WORDS: &[&str] = &["maybe", "perhaps", "might", "possibly", "unsure", "think"];

/// Word-list emotion heuristic over answer text.
pub fn analyze_heuristic(text: &str) -> EmotionAnalysis {
    let text_lower = text.to_lowercase();
    let hits = |words: &[&str]| words.iter().filter(|w| text_lower.contains(*w)).count();

    let positive = hits(POSITIVE_WORDS);
    let negative = hits(NEGATIVE_WORDS);
    let confident = hits(CONFIDENT_WORDS);
    let uncertain = hits(UNCERTAIN_WORDS);

    let (dominant_emotion, confidence_score) = if positive > negative && positive > 0 {
        ("joy", 0.7)
    } else if negative > positive && negative > 0 {
        ("sadness", 0.6)
    } else if confident > uncertain {
        ("confidence", 0.75)
    } else if uncertain > confident {
        ("fear", 0.5)
    } else {
        ("neutral", 0.6)
    };

    EmotionAnalysis {
        dominant_emotion: dominant_emotion.to_string(),
        confidence_score,
        emotions: vec![EmotionScore {
            label: dominant_emotion.to_string(),
            score: confidence_score,
        }],
    }
}

/// Maps an emotion label to a base confidence, weighted by how sure the
/// classifier was; an unsure classification drifts toward the 0.7 neutral.
pub fn emotion_to_confidence(emotion: &str, emotion_score: f64) -> f64 {
    let base = match emotion.to_lowercase().as_str() {
        "joy" => 0.85,
        "confidence" => 0.9,
        "neutral" => 0.7,
        "surprise" => 0.65,
        "anger" => 0.5,
        "sadness" => 0.4,
        "fear" => 0.3,
        "disgust" => 0.45,
        _ => 0.7,
    };
    base * emotion_score + (1.0 - emotion_score) * 0.7
}

/// Blends the independent confidence signals into one 0–1 score.
/// Weights: emotion 0.3, pace 0.25, filler 0.25, length 0.2.
pub fn combine_confidence_signals(
    emotion_confidence: f64,
    pace_confidence: f64,
    filler_confidence: f64,
    length_confidence: f64,
) -> f64 {
    (emotion_confidence * 0.3
        + pace_confidence * 0.25
        + filler_confidence * 0.25
        + length_confidence * 0.2)
        .clamp(0.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback sampler
// ────────────────────────────────────────────────────────────────────────────

/// Sampling period matching the capture client's detection interval.
const SAMPLE_PERIOD_MS: i64 = 2500;

const EMOTION_WEIGHTS: &[(Emotion, f64)] = &[
    (Emotion::Confident, 0.3),
    (Emotion::Neutral, 0.3),
    (Emotion::Happy, 0.2),
    (Emotion::Nervous, 0.15),
    (Emotion::Thinking, 0.05),
];

/// Weighted-random emotion sampler standing in for the camera pipeline when
/// an answer arrives with no emotion timeline.
pub struct FallbackSampler;

impl FallbackSampler {
    pub fn sample(rng: &mut impl Rng, timestamp: i64) -> EmotionSnapshot {
        let roll: f64 = rng.gen();
        let mut cumulative = 0.0;
        let mut emotion = Emotion::Neutral;
        for (candidate, weight) in EMOTION_WEIGHTS {
            cumulative += weight;
            if roll <= cumulative {
                emotion = *candidate;
                break;
            }
        }

        let base_confidence: f64 = match emotion {
            Emotion::Confident => 0.7,
            Emotion::Nervous => 0.4,
            Emotion::Happy => 0.75,
            _ => 0.55,
        };
        let confidence =
            (base_confidence + rng.gen_range(-0.1..=0.1)).clamp(0.3, 0.95);

        let smile_intensity = match emotion {
            Emotion::Happy => 0.6,
            Emotion::Confident => 0.4,
            _ => 0.1,
        };

        EmotionSnapshot {
            timestamp,
            emotion,
            confidence,
            eye_contact: (0.5_f64 + rng.gen_range(-0.2..=0.2)).clamp(0.0, 1.0),
            smile_intensity,
        }
    }

    /// One snapshot per sample period across the answer's duration,
    /// always at least one.
    pub fn sample_timeline(started_at: i64, ended_at: i64) -> Vec<EmotionSnapshot> {
        let mut rng = rand::thread_rng();
        let mut timeline = Vec::new();
        let mut at = started_at;
        while at < ended_at {
            timeline.push(Self::sample(&mut rng, at));
            at += SAMPLE_PERIOD_MS;
        }
        if timeline.is_empty() {
            timeline.push(Self::sample(&mut rng, started_at));
        }
        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_heuristic_positive_answer_is_joy() {
        let analysis = analyze_heuristic("We achieved great results and I am proud of it");
        assert_eq!(analysis.dominant_emotion, "joy");
        assert_eq!(analysis.confidence_score, 0.7);
    }

    #[test]
    fn test_heuristic_negative_answer_is_sadness() {
        let analysis = analyze_heuristic("It was a difficult problem and we struggled");
        assert_eq!(analysis.dominant_emotion, "sadness");
    }

    #[test]
    fn test_heuristic_confident_language() {
        let analysis = analyze_heuristic("I am definitely sure this was the right call");
        assert_eq!(analysis.dominant_emotion, "confidence");
        assert_eq!(analysis.confidence_score, 0.75);
    }

    #[test]
    fn test_heuristic_hedged_language_is_fear() {
        let analysis = analyze_heuristic("Maybe it might possibly work, I am unsure");
        assert_eq!(analysis.dominant_emotion, "fear");
    }

    #[test]
    fn test_heuristic_plain_text_is_neutral() {
        let analysis = analyze_heuristic("The service talks to the database over a pool");
        assert_eq!(analysis.dominant_emotion, "neutral");
    }

    #[test]
    fn test_emotion_to_confidence_fully_certain() {
        assert!((emotion_to_confidence("confidence", 1.0) - 0.9).abs() < f64::EPSILON);
        assert!((emotion_to_confidence("fear", 1.0) - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_emotion_to_confidence_uncertain_drifts_neutral() {
        // score 0 → entirely the 0.7 neutral prior
        assert!((emotion_to_confidence("fear", 0.0) - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_emotion_to_confidence_unknown_label() {
        assert!((emotion_to_confidence("bewilderment", 1.0) - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combine_confidence_weights() {
        // 0.3·1 + 0.25·0 + 0.25·1 + 0.2·0.5 = 0.65
        let combined = combine_confidence_signals(1.0, 0.0, 1.0, 0.5);
        assert!((combined - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_combine_confidence_clamped() {
        assert_eq!(combine_confidence_signals(2.0, 2.0, 2.0, 2.0), 1.0);
    }

    #[test]
    fn test_sampler_output_within_bounds() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for i in 0..100 {
            let snapshot = FallbackSampler::sample(&mut rng, i);
            assert!((0.3..=0.95).contains(&snapshot.confidence));
            assert!((0.0..=1.0).contains(&snapshot.eye_contact));
        }
    }

    #[test]
    fn test_sampler_timeline_spans_duration() {
        let timeline = FallbackSampler::sample_timeline(0, 10_000);
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline[0].timestamp, 0);
        assert_eq!(timeline[3].timestamp, 7500);
    }

    #[test]
    fn test_sampler_timeline_never_empty() {
        assert_eq!(FallbackSampler::sample_timeline(5000, 5000).len(), 1);
    }
}
