use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::analysis::collaborators::{ConvertedImage, Converter, UploadFile};

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Renders the first page of a PDF to PNG with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmConverter {
    binary: PathBuf,
    dpi: u32,
}

impl PdftoppmConverter {
    pub fn new(binary: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            dpi,
        }
    }
}

/// `cv.pdf` → `cv.png`; names without an extension just gain one.
pub fn image_name(pdf_name: &str) -> String {
    let stem = match pdf_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => pdf_name,
    };
    format!("{stem}.png")
}

#[async_trait]
impl Converter for PdftoppmConverter {
    async fn convert(&self, file: &UploadFile) -> Result<ConvertedImage> {
        let workdir = tempfile::tempdir().context("Failed to create conversion directory")?;
        let input = workdir.path().join("input.pdf");
        let output_prefix = workdir.path().join("page");

        tokio::fs::write(&input, &file.bytes)
            .await
            .context("Failed to write PDF for conversion")?;

        let output = Command::new(&self.binary)
            .arg("-png")
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&input)
            .arg(&output_prefix)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;

        if !output.status.success() {
            warn!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(ConvertedImage { file: None });
        }

        let rendered = output_prefix.with_extension("png");
        let bytes = match tokio::fs::read(&rendered).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => {
                warn!("pdftoppm produced no image for {}", file.name);
                return Ok(ConvertedImage { file: None });
            }
        };

        debug!("Rendered {} to {} bytes of PNG", file.name, bytes.len());
        Ok(ConvertedImage {
            file: Some(UploadFile::new(
                image_name(&file.name),
                PNG_CONTENT_TYPE,
                Bytes::from(bytes),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_name_replaces_extension() {
        assert_eq!(image_name("resume.pdf"), "resume.png");
        assert_eq!(image_name("my.cv.v2.pdf"), "my.cv.v2.png");
    }

    #[test]
    fn test_image_name_without_extension() {
        assert_eq!(image_name("resume"), "resume.png");
        assert_eq!(image_name(".pdf"), ".pdf.png");
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let converter = PdftoppmConverter::new("/nonexistent/pdftoppm", 150);
        let file = UploadFile::new("cv.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.7"));
        assert!(converter.convert(&file).await.is_err());
    }
}
