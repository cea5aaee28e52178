use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::collaborators::{Storage, StoredFile, UploadFile};
use crate::config::Config;

/// Object storage on S3 (AWS in production, MinIO locally).
#[derive(Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "resumind-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        let client = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::config::Builder::from(&s3_config)
                .force_path_style(true)
                .build(),
        );
        Self::new(client, config.s3_bucket.clone())
    }
}

/// Object key for an upload: a fresh prefix keeps same-named files apart.
pub fn object_key(file_name: &str) -> String {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let name = if name.is_empty() { "upload" } else { name };
    format!("uploads/{}/{}", Uuid::new_v4(), name)
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(&self, file: &UploadFile) -> Result<Option<StoredFile>> {
        let key = object_key(&file.name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.clone()))
            .content_type(&file.content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded {} to s3://{}/{}", file.name, self.bucket, key);
        Ok(Some(StoredFile { path: key }))
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    warn!("s3://{}/{} does not exist", self.bucket, path);
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("S3 download failed: {e}"));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .context("Failed to read S3 object body")?;
        Ok(Some(body.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_file_name() {
        let key = object_key("resume.pdf");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("/resume.pdf"));
    }

    #[test]
    fn test_object_key_strips_client_directories() {
        assert!(object_key("C:\\Users\\me\\cv.pdf").ends_with("/cv.pdf"));
        assert!(object_key("../../etc/cv.pdf").ends_with("/cv.pdf"));
    }

    #[test]
    fn test_object_key_is_unique_per_upload() {
        assert_ne!(object_key("cv.pdf"), object_key("cv.pdf"));
    }

    #[test]
    fn test_object_key_for_blank_name() {
        assert!(object_key("").ends_with("/upload"));
    }
}
