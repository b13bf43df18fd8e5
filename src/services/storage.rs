//! Blob storage service
//!
//! Uploads documents and event images to the hosted storage API and builds
//! their public URLs.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::settings::{StorageConfig, SupabaseConfig};
use crate::forms::validation::validate_upload;
use crate::utils::errors::{ApiErrorBody, Result, StallBoardError};
use crate::utils::helpers::upload_path;
use crate::utils::logging::log_store_operation;

/// A file picked by the user, held in memory until uploaded
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

/// Storage service for the hosted buckets
#[derive(Clone, Debug)]
pub struct StorageService {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    config: StorageConfig,
}

impl StorageService {
    pub fn new(supabase: &SupabaseConfig, config: StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(supabase.timeout_seconds.max(30)))
            .user_agent("StallBoard/1.0")
            .build()
            .map_err(StallBoardError::Http)?;

        Ok(Self {
            client,
            base_url: supabase.url.trim_end_matches('/').to_string(),
            anon_key: supabase.anon_key.clone(),
            access_token: None,
            config,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn documents_bucket(&self) -> &str {
        &self.config.bucket_documents
    }

    pub fn event_images_bucket(&self) -> &str {
        &self.config.bucket_event_images
    }

    /// Size and type pre-check, before any bytes leave the machine
    pub fn check(&self, upload: &Upload) -> Result<()> {
        validate_upload(
            upload.size(),
            &upload.content_type,
            self.config.max_upload_bytes,
            &self.config.allowed_mime_types,
        )
        .map_err(|message| StallBoardError::Validation {
            field: upload.file_name.clone(),
            message,
        })
    }

    /// Upload bytes to `bucket/path`; returns the stored path
    pub async fn upload(&self, bucket: &str, path: &str, upload: &Upload) -> Result<String> {
        self.check(upload)?;

        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, encode_path(path));
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        debug!(bucket = bucket, path = path, size = upload.size(), "Uploading file");

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header(reqwest::header::CONTENT_TYPE, &upload.content_type)
            .header("x-upsert", "false")
            .body(upload.bytes.clone())
            .send()
            .await
            .map_err(|e| StallBoardError::Storage(e.to_string()))?;

        let status = response.status();
        let elapsed = started.elapsed().as_millis() as u64;
        if !status.is_success() {
            log_store_operation("upload", bucket, elapsed, false);
            let raw = response.text().await.unwrap_or_default();
            return Err(StallBoardError::Storage(ApiErrorBody::parse(status.as_u16(), &raw).best_message()));
        }
        log_store_operation("upload", bucket, elapsed, true);

        let stored = response
            .json::<UploadResponse>()
            .await
            .ok()
            .and_then(|body| body.key)
            .and_then(|key| key.strip_prefix(&format!("{}/", bucket)).map(str::to_string))
            .unwrap_or_else(|| path.to_string());

        info!(bucket = bucket, path = %stored, "File uploaded");
        Ok(stored)
    }

    /// Upload under a generated `owner/kind/<uuid>.<ext>` path and return the public URL
    pub async fn upload_public(&self, bucket: &str, owner_id: &str, kind: &str, upload: &Upload) -> Result<String> {
        let path = upload_path(owner_id, kind, &upload.file_name);
        let stored = self.upload(bucket, &path, upload).await?;
        Ok(self.public_url(bucket, &stored))
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        )
    }
}

/// Percent-encode each path segment, keeping the slashes
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
