//! OCR Types
//!
//! Defines types shared by the OCR providers and the service.

use serde::Deserialize;

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local system binary)
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl Default for OcrProvider {
    fn default() -> Self {
        Self::Tesseract
    }
}

/// OCR result for a single image
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text
    pub text: String,
    /// Confidence score (0-100)
    pub confidence: f64,
    /// Provider used
    pub provider: OcrProvider,
}

/// Progress report emitted while an image is being recognized
#[derive(Debug, Clone, PartialEq)]
pub struct OcrProgress {
    /// Stage label, e.g. "recognizing text"
    pub status: &'static str,
    /// Completion of the current stage (0.0 - 1.0)
    pub progress: f32,
}

impl OcrProgress {
    pub const LOADING: &'static str = "loading";
    pub const RECOGNIZING: &'static str = "recognizing text";

    pub fn new(status: &'static str, progress: f32) -> Self {
        Self {
            status,
            progress: progress.clamp(0.0, 1.0),
        }
    }

    /// Progress as a whole percentage
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}

/// Callback receiving progress reports from a provider
pub type ProgressFn = dyn Fn(OcrProgress) + Send + Sync;

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("API error: {0}")]
    ApiError(String),
}
