//! Axum route handlers for the resume builder and its AI helpers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::CandidateProfile;
use crate::models::resume::{Resume, ResumeData};
use crate::resume::ai::{
    ats_score, enhance_bullet, enhance_project, suggest_skills, AtsReport, EnhancementSuggestion,
};
use crate::resume::parser::extract_text;
use crate::resume::profile::{extract_candidate_profile, profile_summary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Profile extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExtractProfileResponse {
    pub profile: CandidateProfile,
    pub summary: String,
}

/// POST /api/v1/profile/extract
///
/// Multipart upload: `file` is the resume document; `job_description` and
/// `target_role` are optional text fields steering the extraction.
pub async fn handle_extract_profile(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractProfileResponse>, AppError> {
    let mut file_bytes: Option<(Option<String>, Vec<u8>)> = None;
    let mut job_description: Option<String> = None;
    let mut target_role: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                file_bytes = Some((content_type, bytes.to_vec()));
            }
            Some("job_description") => {
                job_description = field.text().await.ok().filter(|t| !t.trim().is_empty());
            }
            Some("target_role") => {
                target_role = field.text().await.ok().filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    let (content_type, bytes) = file_bytes
        .ok_or_else(|| AppError::Validation("Missing 'file' field in upload".to_string()))?;

    // PDF extraction is CPU-bound
    let resume_text = tokio::task::spawn_blocking(move || {
        extract_text(content_type.as_deref(), &bytes)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))??;

    let profile = extract_candidate_profile(
        &state.llm,
        &resume_text,
        job_description.as_deref(),
        target_role.as_deref(),
    )
    .await;

    let summary = profile_summary(&profile);
    Ok(Json(ExtractProfileResponse { profile, summary }))
}

// ────────────────────────────────────────────────────────────────────────────
// Resume CRUD and versioning
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub name: String,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.store.list_resumes()))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(request): Json<CreateResumeRequest>,
) -> Result<Json<Resume>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Resume name cannot be empty".to_string()));
    }
    let resume = Resume::new(request.name.trim());
    state
        .store
        .save_resume(resume.clone())
        .map_err(|e| AppError::Storage(format!("Failed to save resume: {e}")))?;
    Ok(Json(resume))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    state
        .store
        .get_resume(resume_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

/// PUT /api/v1/resumes/:id
///
/// Full-document save, as the editor's autosave sends it.
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(mut resume): Json<Resume>,
) -> Result<Json<Resume>, AppError> {
    resume.id = resume_id;
    let saved = state
        .store
        .save_resume(resume)
        .map_err(|e| AppError::Storage(format!("Failed to save resume: {e}")))?;
    Ok(Json(saved))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .delete_resume(resume_id)
        .map_err(|e| AppError::Storage(format!("Failed to delete resume: {e}")))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    state
        .store
        .duplicate_resume(resume_id)
        .map_err(|e| AppError::Storage(format!("Failed to duplicate resume: {e}")))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

/// POST /api/v1/resumes/:id/versions
///
/// Snapshots the submitted document state into the version list.
pub async fn handle_save_version(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(data): Json<ResumeData>,
) -> Result<Json<Resume>, AppError> {
    state
        .store
        .save_version(resume_id, data)
        .map_err(|e| AppError::Storage(format!("Failed to save version: {e}")))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

/// POST /api/v1/resumes/:id/versions/:version_id/restore
pub async fn handle_restore_version(
    State(state): State<AppState>,
    Path((resume_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ResumeData>, AppError> {
    state
        .store
        .restore_version(resume_id, version_id)
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("Version {version_id} of resume {resume_id} not found"))
        })
}

/// POST /api/v1/resumes/import
///
/// Imports a previously exported resume document under a fresh id.
pub async fn handle_import_resume(
    State(state): State<AppState>,
    Json(resume): Json<Resume>,
) -> Result<Json<Resume>, AppError> {
    let imported = state
        .store
        .import_resume(resume)
        .map_err(|e| AppError::Storage(format!("Failed to import resume: {e}")))?;
    Ok(Json(imported))
}

// ────────────────────────────────────────────────────────────────────────────
// AI helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnhanceBulletRequest {
    pub bullet: String,
    pub position: String,
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceProjectRequest {
    pub description: String,
    pub project_name: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestSkillsRequest {
    #[serde(default)]
    pub current_skills: Vec<String>,
    pub position: String,
    #[serde(default)]
    pub experience: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestSkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AtsScoreRequest {
    pub resume_text: String,
    pub target_role: String,
}

/// POST /api/v1/ai/enhance-bullet
pub async fn handle_enhance_bullet(
    State(state): State<AppState>,
    Json(request): Json<EnhanceBulletRequest>,
) -> Result<Json<EnhancementSuggestion>, AppError> {
    if request.bullet.trim().is_empty() {
        return Err(AppError::Validation("bullet cannot be empty".to_string()));
    }
    let suggestion = enhance_bullet(
        &state.llm,
        &request.bullet,
        &request.position,
        &request.company,
    )
    .await?;
    Ok(Json(suggestion))
}

/// POST /api/v1/ai/enhance-project
pub async fn handle_enhance_project(
    State(state): State<AppState>,
    Json(request): Json<EnhanceProjectRequest>,
) -> Result<Json<EnhancementSuggestion>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation("description cannot be empty".to_string()));
    }
    let suggestion = enhance_project(
        &state.llm,
        &request.description,
        &request.project_name,
        &request.tech_stack,
    )
    .await?;
    Ok(Json(suggestion))
}

/// POST /api/v1/ai/suggest-skills
pub async fn handle_suggest_skills(
    State(state): State<AppState>,
    Json(request): Json<SuggestSkillsRequest>,
) -> Result<Json<SuggestSkillsResponse>, AppError> {
    let skills = suggest_skills(
        &state.llm,
        &request.current_skills,
        &request.position,
        &request.experience,
    )
    .await;
    Ok(Json(SuggestSkillsResponse { skills }))
}

/// POST /api/v1/ai/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(request): Json<AtsScoreRequest>,
) -> Result<Json<AtsReport>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    let report = ats_score(&state.llm, &request.resume_text, &request.target_role).await;
    Ok(Json(report))
}
