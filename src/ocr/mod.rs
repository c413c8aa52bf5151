//! OCR Module
//!
//! Recognizes text in uploaded page images. This is the engine behind the
//! image branch of the upload endpoint.
//!
//! Supports multiple backends:
//! - Tesseract (local, requires the `tesseract` binary)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pdf_ocr::ocr::{OcrService, OcrServiceConfig};
//!
//! let service = OcrService::new(OcrServiceConfig::default());
//! let result = service
//!     .recognize(&jpeg_bytes, Some("eng"), &|p| tracing::debug!("{}%", p.percent()))
//!     .await?;
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{OcrError, OcrProgress, OcrProvider, OcrResult, ProgressFn};

#[cfg(test)]
pub(crate) use provider::MockProvider;
