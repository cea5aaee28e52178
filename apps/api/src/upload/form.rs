//! Submission form: field validation and hand-off to the analyzer.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::analysis::orchestrator::{AnalyzeError, ResumeAnalyzer, Submission};
use crate::analysis::record::SubmissionRecord;
use crate::analysis::status::StatusSink;
use crate::upload::selection::FileSelection;

pub const COMPANY_NAME_FIELD: &str = "company-name";
pub const JOB_TITLE_FIELD: &str = "job-title";
pub const JOB_DESCRIPTION_FIELD: &str = "job-description";
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    File,
    CompanyName,
    JobTitle,
    JobDescription,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::File => FILE_FIELD,
            Field::CompanyName => COMPANY_NAME_FIELD,
            Field::JobTitle => JOB_TITLE_FIELD,
            Field::JobDescription => JOB_DESCRIPTION_FIELD,
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Field::File => "Please upload a resume file.",
            Field::CompanyName => "Please enter the company name.",
            Field::JobTitle => "Please enter the job title.",
            Field::JobDescription => "Please enter the job description.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.missing_message())]
pub struct ValidationFailed(pub Field);

impl ValidationFailed {
    pub fn message(&self) -> &'static str {
        self.0.missing_message()
    }
}

/// Raw form state as entered by the user.
#[derive(Debug, Default, Clone)]
pub struct SubmissionForm {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub selection: FileSelection,
}

/// Result of a successful submission: the stored record and where to go next.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub record: SubmissionRecord,
    pub redirect: String,
    pub redirect_after: Duration,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form is incomplete")]
    Invalid(Vec<ValidationFailed>),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

/// Detail page for a stored record.
pub fn detail_path(id: Uuid) -> String {
    format!("/resume/{id}")
}

impl SubmissionForm {
    /// Checks every field and reports each one that is missing, file first.
    pub fn validate(&self) -> Result<Submission, Vec<ValidationFailed>> {
        let mut failures = Vec::new();
        if self.selection.is_empty() {
            failures.push(ValidationFailed(Field::File));
        }
        failures.extend(self.missing_text_fields());

        match self.selection.selected().cloned() {
            Some(resume) if failures.is_empty() => Ok(Submission {
                company_name: self.company_name.trim().to_string(),
                job_title: self.job_title.trim().to_string(),
                job_description: self.job_description.trim().to_string(),
                resume,
            }),
            _ => Err(failures),
        }
    }

    /// The text fields that are blank. Whitespace-only counts as blank.
    pub fn missing_text_fields(&self) -> Vec<ValidationFailed> {
        [
            (Field::CompanyName, &self.company_name),
            (Field::JobTitle, &self.job_title),
            (Field::JobDescription, &self.job_description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| ValidationFailed(field))
        .collect()
    }

    /// Validates, then runs the analyzer. Validation failures never reach it.
    pub async fn submit(
        &self,
        analyzer: &ResumeAnalyzer,
        status: &dyn StatusSink,
        redirect_after: Duration,
    ) -> Result<SubmitOutcome, SubmitError> {
        let submission = self.validate().map_err(SubmitError::Invalid)?;
        let record = analyzer.analyze(&submission, status).await?;
        let redirect = detail_path(record.id);
        info!("Submission stored; redirecting to {redirect}");
        Ok(SubmitOutcome {
            record,
            redirect,
            redirect_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::collaborators::{
        AiResponse, ConvertedImage, Converter, InferenceService, KeyValueStore, Storage,
        StoredFile, UploadFile,
    };
    use crate::analysis::status::{StatusRecorder, WorkflowPhase};
    use crate::format::UuidGenerator;
    use anyhow::Result;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Succeeds at everything and counts every collaborator call.
    #[derive(Default)]
    struct Everything {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Storage for Everything {
        async fn upload(&self, file: &UploadFile) -> Result<Option<StoredFile>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(StoredFile {
                path: format!("uploads/{}", file.name),
            }))
        }

        async fn read(&self, _path: &str) -> Result<Option<Bytes>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[async_trait]
    impl Converter for Everything {
        async fn convert(&self, _file: &UploadFile) -> Result<ConvertedImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ConvertedImage {
                file: Some(UploadFile::new("cv.png", "image/png", Bytes::from_static(b"png"))),
            })
        }
    }

    #[async_trait]
    impl KeyValueStore for Everything {
        async fn set(&self, _key: &str, _value: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[async_trait]
    impl InferenceService for Everything {
        async fn feedback(&self, _path: &str, _instructions: &str) -> Result<Option<AiResponse>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(AiResponse::text(r#"{"overallScore": 64}"#)))
        }
    }

    fn analyzer(backend: &Arc<Everything>) -> ResumeAnalyzer {
        ResumeAnalyzer::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            Arc::new(UuidGenerator),
        )
    }

    fn filled_form() -> SubmissionForm {
        let mut form = SubmissionForm {
            company_name: "Acme".into(),
            job_title: "Engineer".into(),
            job_description: "Build things".into(),
            ..Default::default()
        };
        form.selection.select(UploadFile::new(
            "cv.pdf",
            "application/pdf",
            Bytes::from_static(b"%PDF-1.7"),
        ));
        form
    }

    #[test]
    fn test_complete_form_validates() {
        let submission = filled_form().validate().unwrap();
        assert_eq!(submission.company_name, "Acme");
        assert_eq!(submission.resume.name, "cv.pdf");
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        let form = SubmissionForm {
            job_title: "Engineer".into(),
            job_description: "   ".into(),
            ..Default::default()
        };
        let failures = form.validate().unwrap_err();
        assert_eq!(
            failures,
            vec![
                ValidationFailed(Field::File),
                ValidationFailed(Field::CompanyName),
                ValidationFailed(Field::JobDescription),
            ]
        );
        assert_eq!(failures[0].message(), "Please upload a resume file.");
        assert_eq!(failures[1].0.name(), "company-name");
    }

    #[test]
    fn test_text_fields_are_trimmed() {
        let mut form = filled_form();
        form.company_name = "  Acme \n".into();
        assert!(form.missing_text_fields().is_empty());
        assert_eq!(form.validate().unwrap().company_name, "Acme");

        form.job_title = "\t".into();
        assert_eq!(
            form.missing_text_fields(),
            vec![ValidationFailed(Field::JobTitle)]
        );
    }

    #[tokio::test]
    async fn test_missing_file_never_reaches_collaborators() {
        let backend = Arc::new(Everything::default());
        let mut form = filled_form();
        form.selection.clear();
        let status = StatusRecorder::new();

        let err = form
            .submit(&analyzer(&backend), &status, Duration::ZERO)
            .await
            .unwrap_err();

        match err {
            SubmitError::Invalid(failures) => {
                assert_eq!(failures, vec![ValidationFailed(Field::File)])
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(status.events().is_empty());
    }

    #[tokio::test]
    async fn test_success_redirects_to_detail_page() {
        let backend = Arc::new(Everything::default());
        let status = StatusRecorder::new();

        let outcome = filled_form()
            .submit(&analyzer(&backend), &status, Duration::from_millis(1500))
            .await
            .unwrap();

        assert_eq!(outcome.redirect, format!("/resume/{}", outcome.record.id));
        assert_eq!(outcome.redirect_after, Duration::from_millis(1500));
        assert_eq!(status.last().unwrap().phase, WorkflowPhase::Complete);
    }
}
