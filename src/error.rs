//! Error types for the upload endpoint

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::envelope::ExtractionResult;
use crate::ocr::OcrError;

/// Endpoint result type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Endpoint error type
///
/// Every variant renders as a failure envelope; the status tells client input
/// problems (4xx) apart from processing failures (5xx).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Only one file may be uploaded")]
    TooManyFiles,

    #[error("Failed to read upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Error processing PDF: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Error processing PDF: {0}")]
    Ocr(#[from] OcrError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFile | Self::UnexpectedField(_) | Self::TooManyFiles => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart(e) => e.status(),
            Self::Storage(_) | Self::Ocr(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("OCR Error: {}", self);
        } else {
            tracing::warn!("Rejected upload: {}", self);
        }

        (status, Json(ExtractionResult::failure(self.to_string()))).into_response()
    }
}
