//! Upload submitter
//!
//! Posts one artifact to the upload endpoint and decodes the envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::{ClientError, PageImage};
use crate::envelope::ExtractionResult;
use crate::pdf::PDF_MIME;

/// Path of the upload endpoint relative to the server URL
pub const UPLOAD_PATH: &str = "/api/ocr/upload";

/// Multipart field the endpoint reads
const UPLOAD_FIELD: &str = "pdf";

/// One artifact to submit
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn pdf(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            media_type: PDF_MIME.to_string(),
            data,
        }
    }

    /// A rendered page, named `page-<index>.jpg`
    pub fn page(page: PageImage) -> Self {
        Self {
            file_name: format!("page-{}.jpg", page.index),
            media_type: "image/jpeg".to_string(),
            data: page.data,
        }
    }
}

/// Something that accepts uploads and answers with an envelope
///
/// Both 2xx and 4xx/5xx answers carry an envelope, so a non-success status
/// is not an error at this level.
#[async_trait]
pub trait OcrEndpoint: Send + Sync {
    async fn submit(&self, upload: Upload) -> Result<ExtractionResult, ClientError>;
}

/// HTTP client for the upload endpoint
#[derive(Debug, Clone)]
pub struct HttpOcrClient {
    client: reqwest::Client,
    upload_url: String,
}

impl HttpOcrClient {
    pub fn new(server_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            upload_url: format!("{}{}", server_url.trim_end_matches('/'), UPLOAD_PATH),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

#[async_trait]
impl OcrEndpoint for HttpOcrClient {
    async fn submit(&self, upload: Upload) -> Result<ExtractionResult, ClientError> {
        let bytes = upload.data.len();
        let part = Part::bytes(upload.data)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.media_type)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(file_name = %upload.file_name, bytes, url = %self.upload_url, "Submitting");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Connection)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let result: ExtractionResult = serde_json::from_slice(&body).map_err(|e| {
            ClientError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), e))
        })?;

        tracing::debug!(status = status.as_u16(), success = result.success, "Server answered");
        Ok(result)
    }
}
