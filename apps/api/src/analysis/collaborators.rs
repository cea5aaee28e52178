//! Collaborator contracts consumed by the resume analyzer.
//!
//! Every call may fail two ways: by raising an error, or by returning an
//! empty result. The analyzer treats both as a failure of the calling stage.
//! Concrete implementations live in `crate::adapters`.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An in-memory file handed to storage or conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub path: String,
}

/// Conversion output. `file` is `None` when no image could be produced.
#[derive(Debug, Clone, Default)]
pub struct ConvertedImage {
    pub file: Option<UploadFile>,
}

/// A single text block of an inference response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

/// Inference content arrives either as a bare string or as a list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<TextBlock>),
}

impl MessageContent {
    /// Returns the bare string, or the text of the first block.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Blocks(blocks) => blocks.first().map(|b| b.text.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMessage {
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub message: AiMessage,
}

impl AiResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            message: AiMessage {
                content: MessageContent::Text(text.into()),
            },
        }
    }

    pub fn blocks<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message: AiMessage {
                content: MessageContent::Blocks(
                    texts
                        .into_iter()
                        .map(|t| TextBlock { text: t.into() })
                        .collect(),
                ),
            },
        }
    }
}

/// Object storage for the resume and its rendered image.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<Option<StoredFile>>;

    /// Reads an uploaded object back. Used by inference backends that need
    /// the uploaded PDF.
    async fn read(&self, path: &str) -> Result<Option<Bytes>>;
}

/// Renders a PDF into an image.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, file: &UploadFile) -> Result<ConvertedImage>;
}

/// String key-value persistence. `set` returns whether the write was accepted.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// AI feedback for a stored resume against a set of instructions.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn feedback(&self, resume_path: &str, instructions: &str) -> Result<Option<AiResponse>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_block_content_extract_identically() {
        let payload = r#"{"overallScore": 80}"#;
        let as_text = AiResponse::text(payload);
        let as_blocks = AiResponse::blocks([payload]);

        assert_eq!(
            as_text.message.content.first_text(),
            as_blocks.message.content.first_text()
        );
        assert_eq!(as_blocks.message.content.first_text(), Some(payload));
    }

    #[test]
    fn test_first_block_wins() {
        let response = AiResponse::blocks(["first", "second"]);
        assert_eq!(response.message.content.first_text(), Some("first"));
    }

    #[test]
    fn test_empty_block_list_has_no_text() {
        let content = MessageContent::Blocks(vec![]);
        assert_eq!(content.first_text(), None);
    }

    #[test]
    fn test_content_deserializes_from_both_shapes() {
        let text: AiResponse =
            serde_json::from_str(r#"{"message":{"content":"{\"a\":1}"}}"#).unwrap();
        assert_eq!(text.message.content, MessageContent::Text("{\"a\":1}".into()));

        let blocks: AiResponse =
            serde_json::from_str(r#"{"message":{"content":[{"text":"{\"a\":1}"}]}}"#).unwrap();
        assert_eq!(blocks.message.content.first_text(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_upload_file_size() {
        let file = UploadFile::new("cv.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.7"));
        assert_eq!(file.size(), 8);
    }
}
