//! Document classification
//!
//! Decides whether an uploaded PDF already carries usable text or has to go
//! through page-image OCR.

use std::sync::Arc;

use super::text_layer::{ExtractError, TextLayerExtractor};

/// Minimum number of characters, after trimming, for a text layer to count
/// as usable. Below this a document is treated as scanned.
pub const MIN_USABLE_TEXT_CHARS: usize = 10;

/// Outcome of classifying a PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationVerdict {
    /// The text layer is usable as-is
    TextExtracted(String),
    /// Little or no embedded text; carries whatever was extracted
    ScannedDocument(String),
}

impl ClassificationVerdict {
    pub fn text(&self) -> &str {
        match self {
            Self::TextExtracted(text) | Self::ScannedDocument(text) => text,
        }
    }

    pub fn is_scanned(&self) -> bool {
        matches!(self, Self::ScannedDocument(_))
    }
}

/// Whether `text` holds at least `min_chars` characters once trimmed
pub fn has_usable_text(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() >= min_chars
}

/// Classifies PDFs by attempting direct text extraction
#[derive(Clone)]
pub struct DocumentClassifier {
    extractor: Arc<dyn TextLayerExtractor>,
    min_text_chars: usize,
}

impl DocumentClassifier {
    pub fn new(extractor: Arc<dyn TextLayerExtractor>, min_text_chars: usize) -> Self {
        Self {
            extractor,
            min_text_chars,
        }
    }

    /// Run the extractor on a blocking thread
    ///
    /// Waits for the extractor to finish however long it takes, so no work is
    /// left running once the request is answered.
    pub async fn extract_text(&self, data: Vec<u8>) -> Result<String, ExtractError> {
        let extractor = self.extractor.clone();

        tokio::task::spawn_blocking(move || extractor.extract(&data))
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))?
    }

    /// Classify a PDF
    ///
    /// Extraction failures never surface as errors: a document whose text
    /// layer cannot be read is classified exactly like one with no text.
    pub async fn classify(&self, data: Vec<u8>) -> ClassificationVerdict {
        let text = match self.extract_text(data).await {
            Ok(text) => {
                tracing::debug!(
                    extractor = self.extractor.name(),
                    chars = text.chars().count(),
                    "Direct text extraction succeeded"
                );
                text
            }
            Err(e) => {
                tracing::warn!(extractor = self.extractor.name(), "Direct extraction failed: {}", e);
                String::new()
            }
        };

        if has_usable_text(&text, self.min_text_chars) {
            ClassificationVerdict::TextExtracted(text)
        } else {
            ClassificationVerdict::ScannedDocument(text)
        }
    }
}
