//! Axum route handlers for resume submission and retrieval.

use axum::{
    extract::{multipart::Field as MultipartField, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::collaborators::{KeyValueStore, UploadFile};
use crate::analysis::record::{record_key, SubmissionRecord};
use crate::analysis::status::{Fanout, StatusEvent, StatusLog, StatusRecorder};
use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::form::{
    SubmissionForm, SubmitError, COMPANY_NAME_FIELD, FILE_FIELD, JOB_DESCRIPTION_FIELD,
    JOB_TITLE_FIELD,
};
use crate::upload::selection::SelectionError;

pub const SESSION_HEADER: &str = "x-session-id";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub redirect: String,
    pub redirect_after_ms: u64,
    pub headline: String,
    pub status: Vec<StatusEvent>,
    pub record: SubmissionRecord,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/analyze
///
/// Multipart form with `company-name`, `job-title`, `job-description` and a
/// single PDF in `file`. Runs the whole analysis before responding.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let guard = state.sessions.begin(session_id).ok_or(AppError::Busy)?;

    let (form, rejected) = read_form(multipart, &state).await?;
    if let Some(rejected) = rejected {
        let failures = form.missing_text_fields();
        if failures.is_empty() {
            return Err(rejected.into());
        }
        return Err(AppError::IncompleteForm {
            failures,
            rejected: Some(rejected),
        });
    }
    debug!(
        "Session {} submitted {}",
        guard.session_id(),
        form.selection.summary().unwrap_or_else(|| "no file".into())
    );

    let recorder = StatusRecorder::new();
    let status = Fanout::new().with(&recorder).with(&StatusLog);
    let outcome = match form
        .submit(&state.analyzer, &status, state.config.redirect_delay)
        .await
    {
        Ok(outcome) => outcome,
        Err(SubmitError::Analyze(error)) => {
            return Err(AppError::Analysis {
                error,
                status: recorder.events(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let headline = recorder.current_phase().headline().to_string();

    Ok(Json(AnalyzeResponse {
        id: outcome.record.id,
        redirect: outcome.redirect,
        redirect_after_ms: outcome.redirect_after.as_millis() as u64,
        headline,
        status: recorder.events(),
        record: outcome.record,
    }))
}

/// GET /api/v1/resumes/:id
///
/// Returns the stored record, with feedback once analysis has finished.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionRecord>, AppError> {
    let raw = state
        .kv
        .get(&record_key(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let record: SubmissionRecord = serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored resume {id} is corrupt: {e}")))?;
    debug!("Serving resume {id} (feedback ready: {})", record.has_feedback());
    Ok(Json(record))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

/// Reads every part of the form. File checks are deferred so a rejected file
/// can be reported alongside blank fields; only the first file part counts.
async fn read_form(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<(SubmissionForm, Option<SelectionError>), AppError> {
    let mut form = SubmissionForm::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            COMPANY_NAME_FIELD => form.company_name = read_text(field).await?,
            JOB_TITLE_FIELD => form.job_title = read_text(field).await?,
            JOB_DESCRIPTION_FIELD => form.job_description = read_text(field).await?,
            FILE_FIELD => files.extend(read_file(field).await?),
            other => debug!("Ignoring unknown form field '{other}'"),
        }
    }

    if files.len() > 1 {
        debug!("Ignoring {} extra file part(s)", files.len() - 1);
    }
    let rejected = match state.selection_policy.accept_many(files) {
        Some(Ok(file)) => {
            form.selection.on_file_select(Some(file));
            None
        }
        Some(Err(e)) => Some(e),
        None => None,
    };

    Ok((form, rejected))
}

async fn read_text(field: MultipartField<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))
}

/// A browser submits an empty, unnamed part when no file was picked.
async fn read_file(field: MultipartField<'_>) -> Result<Option<UploadFile>, AppError> {
    let name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?;

    if name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    info!("Received {name} ({content_type}, {} bytes)", bytes.len());
    Ok(Some(UploadFile::new(name, content_type, bytes)))
}
