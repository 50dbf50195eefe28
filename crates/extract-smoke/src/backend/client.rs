//! HTTP client for the extraction backend.

use std::path::Path;

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::types::{DocumentId, ProcessResponse, UploadResponse};
use crate::config::SmokeConfig;
use crate::error::{BackendError, Stage};
use crate::fixture::{FIXTURE_CONTENT_TYPE, FIXTURE_FILENAME};

/// Maximum length for error bodies written to logs.
const MAX_LOGGED_BODY_LENGTH: usize = 200;

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_LOGGED_BODY_LENGTH) {
        Some((idx, _)) => format!("{}... (truncated)", &body[..idx]),
        None => body.to_string(),
    }
}

#[derive(Serialize)]
struct ProcessRequest {
    patient_id: u64,
}

pub struct BackendClient {
    client: Client,
    config: SmokeConfig,
}

impl BackendClient {
    pub fn new(config: &SmokeConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(BackendError::ClientBuild)?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// `GET /health`, bounded by the configured health timeout. Only 200 counts
    /// as healthy.
    pub async fn health(&self) -> Result<(), BackendError> {
        let url = self.config.endpoint("health");
        debug!("Probing {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.health_timeout())
            .send()
            .await
            .map_err(|e| BackendError::Unreachable {
                url: self.base_url().to_string(),
                source: e,
            })?;

        if response.status() != StatusCode::OK {
            return Err(BackendError::Unhealthy {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    /// Multipart `POST /upload` with the file at `path` and the patient id.
    pub async fn upload(
        &self,
        path: &Path,
        patient_id: u64,
    ) -> Result<UploadResponse, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BackendError::ReadUpload {
                path: path.to_path_buf(),
                source: e,
            })?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FIXTURE_FILENAME)
            .to_string();

        info!("Uploading {} ({} bytes)", filename, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(FIXTURE_CONTENT_TYPE)
            .map_err(|e| BackendError::Transport {
                stage: Stage::Upload,
                source: e,
            })?;
        let form = Form::new()
            .part("file", part)
            .text("patient_id", patient_id.to_string());

        let response = self
            .client
            .post(self.config.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                stage: Stage::Upload,
                source: e,
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            debug!("Upload error body: {}", truncate_body(&body));
            return Err(BackendError::UploadFailed { status, body });
        }

        response.json().await.map_err(|e| BackendError::Decode {
            stage: Stage::Upload,
            source: e,
        })
    }

    /// `POST /process/{document_id}` with a JSON body carrying the patient id.
    pub async fn process(
        &self,
        document_id: &DocumentId,
        patient_id: u64,
    ) -> Result<ProcessResponse, BackendError> {
        let url = self.config.endpoint(&format!("process/{}", document_id));
        info!("Requesting extraction for document {}", document_id);

        let response = self
            .client
            .post(&url)
            .json(&ProcessRequest { patient_id })
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                stage: Stage::Process,
                source: e,
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            debug!("Process error body: {}", truncate_body(&body));
            return Err(BackendError::ProcessFailed { status, body });
        }

        response.json().await.map_err(|e| BackendError::Decode {
            stage: Stage::Process,
            source: e,
        })
    }
}
