mod config;
mod errors;
mod interview;
mod llm_client;
mod metrics;
mod models;
mod resume;
mod routes;
mod state;
mod storage;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::metrics::emotion::{EmotionAnalyzer, HeuristicAnalyzer, HfAnalyzer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::JsonStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Greenroom API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the document store
    let store = JsonStore::open(&config.data_dir)?;

    // Initialize the LLM client
    let llm = LlmClient::new(config.groq_api_key.clone(), config.gemini_api_key.clone());
    info!(
        "LLM client initialized (interviewer: {}, analyzer: {})",
        llm_client::GROQ_MODEL,
        llm_client::GEMINI_MODEL
    );

    // Select the emotion backend (remote classifier when a key is present)
    let emotion: Arc<dyn EmotionAnalyzer> = match &config.hf_api_key {
        Some(key) => {
            info!("Emotion analyzer: remote classifier");
            Arc::new(HfAnalyzer::new(key.clone()))
        }
        None => {
            info!("Emotion analyzer: heuristic");
            Arc::new(HeuristicAnalyzer)
        }
    };

    // Build app state
    let state = AppState {
        store,
        llm,
        emotion,
        interviews: Arc::new(Mutex::new(HashMap::new())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
