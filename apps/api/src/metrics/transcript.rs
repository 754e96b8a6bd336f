#![allow(dead_code)]

//! Transcript assembly and cleanup for speech-recognition output.
//!
//! Recognition engines deliver a mix of interim previews and final segments;
//! finals are appended, interims replace each other. A safety-net pass then
//! collapses stuttered phrase repeats the recognizer sometimes emits.

/// Accumulates interim/final recognition segments into one transcript.
#[derive(Debug, Default, Clone)]
pub struct TranscriptBuilder {
    final_text: String,
    interim: String,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A final segment is permanent: append it and drop the pending interim.
    pub fn push_final(&mut self, segment: &str) {
        self.final_text.push_str(segment);
        self.final_text.push(' ');
        self.interim.clear();
    }

    /// An interim segment is a preview only: it replaces the previous one.
    pub fn push_interim(&mut self, segment: &str) {
        self.interim = segment.to_string();
    }

    /// The cleaned final transcript.
    pub fn text(&self) -> String {
        deduplicate_repeats(self.final_text.trim())
    }

    /// Final transcript plus the pending interim preview.
    pub fn preview(&self) -> String {
        let mut out = self.final_text.trim_end().to_string();
        if !self.interim.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(self.interim.trim());
        }
        out
    }

    pub fn reset(&mut self) {
        self.final_text.clear();
        self.interim.clear();
    }
}

/// Collapses a leading 2–4 word phrase that repeats more than twice in a row.
/// "I actually I actually I actually think" → "I actually think".
pub fn deduplicate_repeats(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 6 {
        // Too short to hold a meaningful repeat
        return text.to_string();
    }

    for phrase_len in (2..=4).rev() {
        let phrase = words[..phrase_len].join(" ");
        let mut repeat_count = 0;
        let mut index = 0;

        while index + phrase_len <= words.len() {
            if words[index..index + phrase_len].join(" ") == phrase {
                repeat_count += 1;
                index += phrase_len;
            } else {
                break;
            }
        }

        if repeat_count > 2 {
            let rest = words[index..].join(" ");
            return if rest.is_empty() {
                phrase
            } else {
                format!("{phrase} {rest}")
            };
        }
    }

    text.to_string()
}
