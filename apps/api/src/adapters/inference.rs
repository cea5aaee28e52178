use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::analysis::collaborators::{AiResponse, InferenceService, Storage};
use crate::analysis::prompts::feedback_system;
use crate::llm_client::{LlmClient, LlmResponse};

/// Resume feedback from Claude. The stored PDF is read back, reduced to
/// text and sent along with the instructions.
#[derive(Clone)]
pub struct LlmFeedbackService {
    llm: LlmClient,
    storage: Arc<dyn Storage>,
}

impl LlmFeedbackService {
    pub fn new(llm: LlmClient, storage: Arc<dyn Storage>) -> Self {
        Self { llm, storage }
    }
}

fn build_prompt(instructions: &str, resume_text: &str) -> String {
    format!("{instructions}\n\nRESUME:\n{}", resume_text.trim())
}

/// Keeps every text block, in order, so callers see the same content the
/// model returned.
fn to_ai_response(response: &LlmResponse) -> Option<AiResponse> {
    let blocks: Vec<&str> = response.text_blocks().collect();
    if blocks.is_empty() {
        return None;
    }
    Some(AiResponse::blocks(blocks))
}

async fn extract_text(pdf: bytes::Bytes) -> Result<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .context("PDF text extraction task panicked")?
        .context("Failed to extract text from PDF")
}

#[async_trait]
impl InferenceService for LlmFeedbackService {
    async fn feedback(&self, resume_path: &str, instructions: &str) -> Result<Option<AiResponse>> {
        let Some(pdf) = self.storage.read(resume_path).await? else {
            warn!("Resume {resume_path} not found in storage");
            return Ok(None);
        };

        let resume_text = extract_text(pdf).await?;
        if resume_text.trim().is_empty() {
            warn!("Resume {resume_path} has no extractable text");
            return Ok(None);
        }

        let prompt = build_prompt(instructions, &resume_text);
        let response = self
            .llm
            .call(&prompt, &feedback_system())
            .await
            .map_err(|e| anyhow::anyhow!("Feedback LLM call failed: {e}"))?;

        let ai_response = to_ai_response(&response);
        if ai_response.is_none() {
            warn!("Feedback response for {resume_path} had no text content");
        } else {
            info!(
                "Feedback received for {resume_path} (output_tokens={})",
                response.usage.output_tokens
            );
        }
        Ok(ai_response)
    }
}
