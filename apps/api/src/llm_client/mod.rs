/// LLM Client — the single point of entry for all hosted chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call Groq or Gemini directly.
/// All LLM interactions MUST go through this module.
///
/// Models are hardcoded per provider — do not make configurable to prevent drift.
use futures_util::StreamExt;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fast conversational model used for the interviewer and coach roles.
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
/// Structured-extraction model used for resume analysis.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash-lite";

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// 429 and 5xx responses are worth retrying; everything else is final.
    /// 403 means the key's quota is gone — retrying only burns time.
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    Gemini,
}

impl Provider {
    pub fn model(&self) -> &'static str {
        match self {
            Provider::Groq => GROQ_MODEL,
            Provider::Gemini => GEMINI_MODEL,
        }
    }
}

/// Logical roles mapped to providers: fast conversation goes to Groq,
/// structured extraction to Gemini.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmRole {
    Interviewer,
    ResumeAnalyzer,
    /// Reserved for the practice-coach surface.
    #[allow(dead_code)]
    Coach,
}

impl LlmRole {
    pub fn provider(&self) -> Provider {
        match self {
            LlmRole::Interviewer | LlmRole::Coach => Provider::Groq,
            LlmRole::ResumeAnalyzer => Provider::Gemini,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }

    // Multi-turn history is rebuilt into each prompt rather than threaded as
    // assistant messages; kept for callers that do thread it.
    #[allow(dead_code)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant", content: content.into() }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 512 }
    }
}

#[derive(Debug, Clone)]
pub struct LlmCompletion {
    pub content: String,
    #[allow(dead_code)]
    pub provider: Provider,
    #[allow(dead_code)]
    pub model: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider wire formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct GroqChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContentParts>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContentParts {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by all services. Wraps both providers behind
/// one interface with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    groq_api_key: String,
    gemini_api_key: String,
}

impl LlmClient {
    pub fn new(groq_api_key: String, gemini_api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            groq_api_key,
            gemini_api_key,
        }
    }

    /// Makes a chat-completion call for the given role.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        role: LlmRole,
        messages: &[ChatMessage],
        options: CallOptions,
    ) -> Result<LlmCompletion, LlmError> {
        let provider = role.provider();
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let result = match provider {
                Provider::Groq => self.groq_complete(messages, options).await,
                Provider::Gemini => self.gemini_complete(messages, options).await,
            };

            match result {
                Ok(content) => {
                    debug!(
                        "LLM call succeeded: provider={provider:?}, chars={}",
                        content.len()
                    );
                    return Ok(LlmCompletion { content, provider, model: provider.model() });
                }
                Err(e) if e.is_retryable() => {
                    warn!("LLM API error: {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::RateLimited { retries: MAX_RETRIES }))
    }

    /// Streaming variant. Groq streams SSE chunks through `on_chunk` as they
    /// arrive; Gemini does not stream and falls back to a plain call.
    /// Streams are not retried — a broken stream surfaces as an error.
    pub async fn call_stream(
        &self,
        role: LlmRole,
        messages: &[ChatMessage],
        options: CallOptions,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<LlmCompletion, LlmError> {
        let provider = role.provider();
        if provider != Provider::Groq {
            return self.call(role, messages, options).await;
        }

        let request_body = GroqRequest {
            model: GROQ_MODEL,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(GROQ_API_URL)
            .bearer_auth(&self.groq_api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), body));
        }

        // SSE frames: `data: {json}\n\n`, terminated by `data: [DONE]`.
        // Network chunks can split lines, so carry the partial tail over.
        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut full_content = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim().to_string();
                buffer.drain(..=newline);

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data == "[DONE]" {
                    continue;
                }
                // Skip malformed frames rather than failing the whole stream
                let Ok(parsed) = serde_json::from_str::<Value>(data) else {
                    continue;
                };
                if let Some(delta) = parsed
                    .get("choices")
                    .and_then(|c| c.get(0))
                    .and_then(|c| c.get("delta"))
                    .and_then(|d| d.get("content"))
                    .and_then(|t| t.as_str())
                {
                    full_content.push_str(delta);
                    on_chunk(delta);
                }
            }
        }

        if full_content.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        Ok(LlmCompletion { content: full_content, provider, model: GROQ_MODEL })
    }

    /// Convenience method that calls the LLM and deserializes the reply as JSON.
    /// Tolerates chatter around the object: code fences are stripped and the
    /// first `{...}` span is extracted before parsing.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        role: LlmRole,
        messages: &[ChatMessage],
        options: CallOptions,
    ) -> Result<T, LlmError> {
        let completion = self.call(role, messages, options).await?;
        let text = strip_json_fences(&completion.content);
        let object = extract_json_object(text).ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(object).map_err(LlmError::Parse)
    }

    async fn groq_complete(
        &self,
        messages: &[ChatMessage],
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let request_body = GroqRequest {
            model: GROQ_MODEL,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(GROQ_API_URL)
            .bearer_auth(&self.groq_api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), body));
        }

        let parsed: GroqResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    async fn gemini_complete(
        &self,
        messages: &[ChatMessage],
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let request_body = to_gemini_request(messages, options);

        let url = format!(
            "{GEMINI_API_URL}/{GEMINI_MODEL}:generateContent?key={}",
            self.gemini_api_key
        );

        let response = self.client.post(&url).json(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), body));
        }

        let parsed: GeminiResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Gemini has no system role in `contents`: the system message becomes
/// `systemInstruction` and assistant turns are renamed to `model`.
fn to_gemini_request(messages: &[ChatMessage], options: CallOptions) -> GeminiRequest {
    let system_instruction = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| GeminiContentParts { parts: vec![GeminiPart { text: m.content.clone() }] });

    let contents = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| GeminiContent {
            role: if m.role == "assistant" { "model" } else { "user" },
            parts: vec![GeminiPart { text: m.content.clone() }],
        })
        .collect();

    GeminiRequest {
        contents,
        generation_config: GeminiGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
        },
        system_instruction,
    }
}

fn classify_api_error(status: u16, message: String) -> LlmError {
    if status == 403 {
        LlmError::QuotaExhausted(message)
    } else {
        LlmError::Api { status, message }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Extracts the first-`{` to last-`}` span from free text. Models frequently
/// wrap JSON replies in prose despite instructions, so parsing starts here.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parses a model reply into a JSON value, applying fence stripping and
/// object extraction. Returns an empty object when nothing parses — callers
/// fall back to per-field defaults.
pub fn parse_reply(content: &str) -> Value {
    let text = strip_json_fences(content);
    match extract_json_object(text).map(serde_json::from_str::<Value>) {
        Some(Ok(value)) => value,
        _ => {
            warn!("Could not extract JSON from LLM reply ({} chars)", content.len());
            Value::Object(serde_json::Map::new())
        }
    }
}
