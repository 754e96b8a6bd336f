use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::interview::handlers::ActiveInterview;
use crate::llm_client::LlmClient;
use crate::metrics::emotion::EmotionAnalyzer;
use crate::storage::JsonStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: JsonStore,
    pub llm: LlmClient,
    /// Pluggable text-emotion backend. Heuristic by default; the remote
    /// classifier when an HF key is configured.
    pub emotion: Arc<dyn EmotionAnalyzer>,
    /// Interviews in flight. The lock is held only to move sessions in and
    /// out — never across an LLM call.
    pub interviews: Arc<Mutex<HashMap<Uuid, ActiveInterview>>>,
}
