pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview lifecycle
        .route("/api/v1/interviews", post(interview::handle_start_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/finish",
            post(interview::handle_finish_interview),
        )
        // Interview history
        .route(
            "/api/v1/sessions",
            get(interview::handle_list_sessions).delete(interview::handle_clear_sessions),
        )
        .route(
            "/api/v1/sessions/statistics",
            get(interview::handle_session_statistics),
        )
        .route("/api/v1/sessions/trend", get(interview::handle_score_trend))
        .route(
            "/api/v1/sessions/:id",
            get(interview::handle_get_session).delete(interview::handle_delete_session),
        )
        // Profile extraction
        .route("/api/v1/profile/extract", post(resume::handle_extract_profile))
        // Resume builder
        .route(
            "/api/v1/resumes",
            get(resume::handle_list_resumes).post(resume::handle_create_resume),
        )
        .route("/api/v1/resumes/import", post(resume::handle_import_resume))
        .route(
            "/api/v1/resumes/:id",
            get(resume::handle_get_resume)
                .put(resume::handle_save_resume)
                .delete(resume::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(resume::handle_duplicate_resume),
        )
        .route(
            "/api/v1/resumes/:id/versions",
            post(resume::handle_save_version),
        )
        .route(
            "/api/v1/resumes/:id/versions/:version_id/restore",
            post(resume::handle_restore_version),
        )
        // AI content helpers
        .route("/api/v1/ai/enhance-bullet", post(resume::handle_enhance_bullet))
        .route("/api/v1/ai/enhance-project", post(resume::handle_enhance_project))
        .route("/api/v1/ai/suggest-skills", post(resume::handle_suggest_skills))
        .route("/api/v1/ai/ats-score", post(resume::handle_ats_score))
        .with_state(state)
}
