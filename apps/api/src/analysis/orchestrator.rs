//! Resume analysis: drives one submission through its fixed stage sequence.
//!
//! Flow: upload resume → convert to image → upload image → persist record →
//!       request feedback → parse feedback → persist record again.
//!
//! Each stage is a typed function taking the previous stage's output. The
//! first failure aborts the run; nothing is retried.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::collaborators::{
    AiResponse, Converter, InferenceService, KeyValueStore, Storage, UploadFile,
};
use crate::analysis::prompts::prepare_instructions;
use crate::analysis::record::{Feedback, SubmissionRecord};
use crate::analysis::status::{StatusEvent, StatusSink, WorkflowPhase};
use crate::format::IdGenerator;
use crate::llm_client::strip_json_fences;

// ────────────────────────────────────────────────────────────────────────────
// Inputs and failures
// ────────────────────────────────────────────────────────────────────────────

/// A validated submission, ready for analysis.
#[derive(Debug, Clone)]
pub struct Submission {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub resume: UploadFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Resume,
    Image,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStage::Resume => f.write_str("resume"),
            UploadStage::Image => f.write_str("image"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("upload failed: {0}")]
    UploadFailed(UploadStage),

    #[error("conversion to image failed")]
    ConversionFailed,

    #[error("could not store the submission record")]
    PersistFailed,

    #[error("analysis failed")]
    AnalysisFailed,

    #[error("feedback was not valid structured data: {0}")]
    ParseFailed(String),
}

impl AnalyzeError {
    /// Plain-language notification for the failed stage.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalyzeError::UploadFailed(UploadStage::Resume) => "Failed to upload the resume file.",
            AnalyzeError::UploadFailed(UploadStage::Image) => "Failed to upload the resume image.",
            AnalyzeError::ConversionFailed => "Failed to convert the resume to an image.",
            AnalyzeError::PersistFailed => "Failed to save the resume details.",
            AnalyzeError::AnalysisFailed => "Failed to analyze the resume.",
            AnalyzeError::ParseFailed(_) => "The resume analysis could not be read.",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage outputs
// ────────────────────────────────────────────────────────────────────────────

struct ResumeUploaded {
    resume_path: String,
}

struct Converted {
    resume_path: String,
    image: UploadFile,
}

struct ImageUploaded {
    resume_path: String,
    image_path: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

/// Runs submissions against injected collaborators.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    storage: Arc<dyn Storage>,
    converter: Arc<dyn Converter>,
    kv: Arc<dyn KeyValueStore>,
    inference: Arc<dyn InferenceService>,
    ids: Arc<dyn IdGenerator>,
}

impl ResumeAnalyzer {
    pub fn new(
        storage: Arc<dyn Storage>,
        converter: Arc<dyn Converter>,
        kv: Arc<dyn KeyValueStore>,
        inference: Arc<dyn InferenceService>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            storage,
            converter,
            kv,
            inference,
            ids,
        }
    }

    /// Analyzes one submission, reporting a status event before each stage.
    ///
    /// Emits exactly one terminal event: `Complete` on success or `Failed`
    /// carrying the stage's user message.
    pub async fn analyze(
        &self,
        submission: &Submission,
        status: &dyn StatusSink,
    ) -> Result<SubmissionRecord, AnalyzeError> {
        match self.run(submission, status).await {
            Ok(record) => {
                status.report(StatusEvent::new(
                    WorkflowPhase::Complete,
                    "Resume analyzed successfully!",
                ));
                info!("Resume {} analyzed for {}", record.id, record.company_name);
                Ok(record)
            }
            Err(e) => {
                status.report(StatusEvent::new(WorkflowPhase::Failed, e.user_message()));
                warn!("Resume analysis aborted: {e}");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        submission: &Submission,
        status: &dyn StatusSink,
    ) -> Result<SubmissionRecord, AnalyzeError> {
        status.report(StatusEvent::new(
            WorkflowPhase::UploadingFile,
            "Uploading your resume...",
        ));
        let uploaded = self.upload_resume(&submission.resume).await?;

        status.report(StatusEvent::new(
            WorkflowPhase::Converting,
            "Converting to image...",
        ));
        let converted = self.convert(uploaded, &submission.resume).await?;

        status.report(StatusEvent::new(
            WorkflowPhase::UploadingImage,
            "Uploading image...",
        ));
        let images = self.upload_image(converted).await?;

        let mut record = self.persist_initial(images, submission).await?;

        status.report(StatusEvent::new(
            WorkflowPhase::Analyzing,
            "Analyzing resume...",
        ));
        let response = self.request_feedback(&record).await?;
        let feedback = parse_feedback(&response)?;

        record.feedback = Some(feedback);
        self.persist(&record).await?;

        Ok(record)
    }

    async fn upload_resume(&self, resume: &UploadFile) -> Result<ResumeUploaded, AnalyzeError> {
        let stored = self.storage.upload(resume).await.unwrap_or_else(|e| {
            error!("Resume upload raised: {e:#}");
            None
        });
        let stored = stored.ok_or(AnalyzeError::UploadFailed(UploadStage::Resume))?;
        info!("Uploaded resume {} to {}", resume.name, stored.path);
        Ok(ResumeUploaded {
            resume_path: stored.path,
        })
    }

    async fn convert(
        &self,
        uploaded: ResumeUploaded,
        resume: &UploadFile,
    ) -> Result<Converted, AnalyzeError> {
        let converted = self.converter.convert(resume).await.unwrap_or_else(|e| {
            error!("PDF conversion raised: {e:#}");
            Default::default()
        });
        let image = converted.file.ok_or(AnalyzeError::ConversionFailed)?;
        Ok(Converted {
            resume_path: uploaded.resume_path,
            image,
        })
    }

    async fn upload_image(&self, converted: Converted) -> Result<ImageUploaded, AnalyzeError> {
        let stored = self
            .storage
            .upload(&converted.image)
            .await
            .unwrap_or_else(|e| {
                error!("Image upload raised: {e:#}");
                None
            });
        let stored = stored.ok_or(AnalyzeError::UploadFailed(UploadStage::Image))?;
        Ok(ImageUploaded {
            resume_path: converted.resume_path,
            image_path: stored.path,
        })
    }

    async fn persist_initial(
        &self,
        images: ImageUploaded,
        submission: &Submission,
    ) -> Result<SubmissionRecord, AnalyzeError> {
        let record = SubmissionRecord {
            id: self.ids.generate(),
            resume_path: images.resume_path,
            image_path: images.image_path,
            company_name: submission.company_name.clone(),
            job_title: submission.job_title.clone(),
            job_description: submission.job_description.clone(),
            feedback: None,
        };
        self.persist(&record).await?;
        Ok(record)
    }

    async fn persist(&self, record: &SubmissionRecord) -> Result<(), AnalyzeError> {
        let key = record.key();
        let value = serde_json::to_string(record).map_err(|e| {
            error!("Failed to serialize record {}: {e}", record.id);
            AnalyzeError::PersistFailed
        })?;
        match self.kv.set(&key, &value).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!("Key-value store rejected write for {key}");
                Err(AnalyzeError::PersistFailed)
            }
            Err(e) => {
                error!("Key-value write for {key} raised: {e:#}");
                Err(AnalyzeError::PersistFailed)
            }
        }
    }

    async fn request_feedback(&self, record: &SubmissionRecord) -> Result<AiResponse, AnalyzeError> {
        let instructions = prepare_instructions(&record.job_title, &record.job_description);
        let response = self
            .inference
            .feedback(&record.resume_path, &instructions)
            .await
            .unwrap_or_else(|e| {
                error!("Feedback request raised: {e:#}");
                None
            });
        response.ok_or(AnalyzeError::AnalysisFailed)
    }
}

/// Extracts the response text and parses it as a JSON object.
pub fn parse_feedback(response: &AiResponse) -> Result<Feedback, AnalyzeError> {
    let text = response
        .message
        .content
        .first_text()
        .ok_or(AnalyzeError::AnalysisFailed)?;
    let value: serde_json::Value = serde_json::from_str(strip_json_fences(text))
        .map_err(|e| AnalyzeError::ParseFailed(e.to_string()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(AnalyzeError::ParseFailed(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
