//! Upload endpoint
//!
//! `POST /api/ocr/upload` takes one file in the `pdf` field. The same route
//! serves whole PDFs and single page images posted by a client fallback run:
//!
//! - PDF: classified by its text layer. Usable text is returned directly,
//!   otherwise a `400` with `isScanned: true` tells the client to rasterize.
//! - Image: recognized by the OCR engine, no classification.
//!
//! The stored artifact is released before the handler returns on every path.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum::body::Bytes;
use tracing::Instrument;
use uuid::Uuid;

use crate::artifact::{Artifact, ArtifactKind, StoredArtifact};
use crate::envelope::{ExtractionResult, IMAGE_OCR_COMPLETED, PDF_TEXT_EXTRACTED};
use crate::error::{ApiError, Result};
use crate::extract::ClassificationVerdict;
use crate::ocr::OcrProgress;
use crate::state::AppState;

/// Multipart field carrying the artifact
pub const UPLOAD_FIELD: &str = "pdf";

/// Create the OCR router
pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}

/// A file read out of the multipart body
struct Upload {
    artifact: Artifact,
    data: Bytes,
}

/// POST /api/ocr/upload
async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ExtractionResult>)> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!("Request carries no multipart body: {}", rejection);
        ApiError::MissingFile
    })?;
    let upload = read_upload(multipart).await?;

    let span = tracing::info_span!(
        "upload",
        request_id = %Uuid::new_v4(),
        file_name = %upload.artifact.file_name,
        kind = ?upload.artifact.kind,
    );

    async move {
        tracing::info!(bytes = upload.data.len(), "Processing file");
        let artifact = state.artifacts().persist(upload.artifact, upload.data).await?;
        process(&state, &artifact).await
    }
    .instrument(span)
    .await
}

/// Pull the single file out of the form
///
/// Plain form values are ignored; a file under any other field name, or a
/// second file, is rejected.
async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        if name != UPLOAD_FIELD {
            return Err(ApiError::UnexpectedField(name));
        }
        if upload.is_some() {
            return Err(ApiError::TooManyFiles);
        }

        let artifact = Artifact::new(&file_name, field.content_type());
        let data = field.bytes().await?;
        upload = Some(Upload { artifact, data });
    }

    upload.ok_or(ApiError::MissingFile)
}

/// Dispatch a stored artifact by kind
async fn process(
    state: &AppState,
    artifact: &StoredArtifact,
) -> Result<(StatusCode, Json<ExtractionResult>)> {
    let data = artifact.read().await?;

    match artifact.kind() {
        ArtifactKind::Image => {
            tracing::info!("Image detected, running OCR");
            let result = state.ocr().recognize(&data, None, &log_progress).await?;
            tracing::info!(
                provider = ?result.provider,
                confidence = result.confidence,
                chars = result.text.len(),
                "Image OCR complete"
            );

            Ok((
                StatusCode::OK,
                Json(ExtractionResult::success(
                    result.text,
                    artifact.file_name(),
                    IMAGE_OCR_COMPLETED,
                )),
            ))
        }
        ArtifactKind::Pdf => match state.classifier().classify(data).await {
            ClassificationVerdict::TextExtracted(text) => {
                tracing::info!(chars = text.len(), "Text layer extracted");
                Ok((
                    StatusCode::OK,
                    Json(ExtractionResult::success(
                        text,
                        artifact.file_name(),
                        PDF_TEXT_EXTRACTED,
                    )),
                ))
            }
            ClassificationVerdict::ScannedDocument(text) => {
                tracing::info!("Scanned PDF detected, client fallback required");
                Ok((StatusCode::BAD_REQUEST, Json(ExtractionResult::scanned(text))))
            }
        },
    }
}

fn log_progress(progress: OcrProgress) {
    if progress.status == OcrProgress::RECOGNIZING {
        tracing::debug!("OCR progress: {}%", progress.percent());
    }
}
