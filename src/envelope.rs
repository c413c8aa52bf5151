//! Uniform result envelope
//!
//! Every response of the upload endpoint, and the final result of a client
//! fallback run, has this shape.

use serde::{Deserialize, Serialize};

pub const PDF_TEXT_EXTRACTED: &str = "OCR processing completed successfully";
pub const IMAGE_OCR_COMPLETED: &str = "Image OCR completed successfully";
pub const SCANNED_PDF_DETECTED: &str = "Scanned PDF detected. Switching to image-based processing...";
pub const SCANNED_PDF_PROCESSED: &str = "Scanned PDF processed successfully";

/// Terminal outcome of processing one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Set when the PDF has no usable text layer and needs page OCR
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_scanned: bool,
    /// 1-based pages a fallback run could not recognize
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_pages: Vec<usize>,
}

impl ExtractionResult {
    pub fn success(text: String, file_name: &str, message: &str) -> Self {
        Self {
            success: true,
            text: Some(text),
            file_name: Some(file_name.to_string()),
            message: message.to_string(),
            is_scanned: false,
            skipped_pages: Vec::new(),
        }
    }

    /// Signal that the client should fall back to page-image OCR
    pub fn scanned(partial_text: String) -> Self {
        Self {
            success: false,
            text: Some(partial_text),
            file_name: None,
            message: SCANNED_PDF_DETECTED.to_string(),
            is_scanned: true,
            skipped_pages: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            file_name: None,
            message: message.into(),
            is_scanned: false,
            skipped_pages: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}
