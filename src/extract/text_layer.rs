//! Text layer extractors
//!
//! The extractor is the collaborator that reads embedded text straight out
//! of a PDF byte stream, without any rasterization.

use thiserror::Error;

use crate::pdf::{self, PdfError};

/// Text extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("Task join error: {0}")]
    Task(String),
}

/// Reads the embedded text layer of a PDF
///
/// Implementations are synchronous and CPU-bound; callers are expected to
/// run them on a blocking thread.
pub trait TextLayerExtractor: Send + Sync {
    /// Extractor name, for logging
    fn name(&self) -> &'static str;

    /// Extract all embedded text from the document
    fn extract(&self, data: &[u8]) -> Result<String, ExtractError>;
}

/// MuPDF-backed extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct MuPdfExtractor;

impl TextLayerExtractor for MuPdfExtractor {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        Ok(pdf::extract_text(data)?)
    }
}

/// Extractor returning a fixed outcome, for tests
#[cfg(test)]
pub(crate) struct StaticExtractor(pub Result<String, String>);

#[cfg(test)]
impl StaticExtractor {
    pub fn text(text: &str) -> Self {
        Self(Ok(text.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self(Err(message.to_string()))
    }
}

#[cfg(test)]
impl TextLayerExtractor for StaticExtractor {
    fn name(&self) -> &'static str {
        "static"
    }

    fn extract(&self, _data: &[u8]) -> Result<String, ExtractError> {
        self.0
            .clone()
            .map_err(|message| ExtractError::Pdf(PdfError::LoadError(message)))
    }
}
