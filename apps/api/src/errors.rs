use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::orchestrator::{AnalyzeError, UploadStage};
use crate::analysis::status::{StatusEvent, WorkflowPhase};
use crate::upload::form::{Field, SubmitError, ValidationFailed};
use crate::upload::selection::SelectionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing fields, plus the rejected file when one was dropped as well.
    #[error("Form is incomplete")]
    IncompleteForm {
        failures: Vec<ValidationFailed>,
        rejected: Option<SelectionError>,
    },

    #[error("File rejected: {0}")]
    FileRejected(#[from] SelectionError),

    #[error("A submission is already in progress")]
    Busy,

    /// Analyzer failure with the status events reported up to the abort.
    #[error("Analysis failed: {error}")]
    Analysis {
        error: AnalyzeError,
        status: Vec<StatusEvent>,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(failures) => AppError::IncompleteForm {
                failures,
                rejected: None,
            },
            SubmitError::Analyze(error) => AppError::Analysis {
                error,
                status: Vec::new(),
            },
        }
    }
}

impl AppError {
    fn stage(e: &AnalyzeError) -> &'static str {
        match e {
            AnalyzeError::UploadFailed(UploadStage::Resume) => "upload_resume",
            AnalyzeError::UploadFailed(UploadStage::Image) => "upload_image",
            AnalyzeError::ConversionFailed => "convert",
            AnalyzeError::PersistFailed => "persist",
            AnalyzeError::AnalysisFailed => "analyze",
            AnalyzeError::ParseFailed(_) => "parse_feedback",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match &self {
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
                AppError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                AppError::IncompleteForm { failures, rejected } => {
                    let rejected = rejected
                        .iter()
                        .map(|e| json!({ "field": Field::File.name(), "message": e.to_string() }));
                    let missing = failures
                        .iter()
                        .map(|f| json!({ "field": f.0.name(), "message": f.message() }));
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        "Please fill in all required fields.".to_string(),
                        Some(json!(rejected.chain(missing).collect::<Vec<_>>())),
                    )
                }
                AppError::FileRejected(e) => {
                    (StatusCode::BAD_REQUEST, "FILE_REJECTED", e.to_string(), None)
                }
                AppError::Busy => (
                    StatusCode::CONFLICT,
                    "SUBMISSION_IN_PROGRESS",
                    "Your previous resume is still being analyzed".to_string(),
                    None,
                ),
                AppError::Analysis { error, status } => {
                    tracing::error!("Analysis error: {error}");
                    let headline = status
                        .last()
                        .map(StatusEvent::headline)
                        .unwrap_or_else(|| WorkflowPhase::Failed.headline());
                    (
                        StatusCode::BAD_GATEWAY,
                        "ANALYSIS_FAILED",
                        error.user_message().to_string(),
                        Some(json!({
                            "stage": Self::stage(error),
                            "headline": headline,
                            "status": status,
                        })),
                    )
                }
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
