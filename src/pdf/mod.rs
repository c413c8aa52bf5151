//! PDF access via MuPDF
//!
//! Thin layer over the `mupdf` crate used by both halves of the system:
//! the server reads the embedded text layer, the client renders pages
//! to JPEG for OCR.
//!
//! MuPDF's `fz_context` is not thread-safe, so callers open a fresh
//! document per operation and run it on a blocking thread.

mod render;
mod text;

#[cfg(test)]
pub(crate) mod fixture;

use mupdf::Document;
use thiserror::Error;

pub use render::{render_page_jpeg, RenderedPage};
pub use text::extract_text;

/// MIME type MuPDF uses to pick its PDF handler
pub const PDF_MIME: &str = "application/pdf";

/// PDF access errors
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to load PDF: {0}")]
    LoadError(String),
    #[error("Page {0} not found (document has {1} pages)")]
    PageNotFound(usize, usize),
    #[error("Image encoding error: {0}")]
    ImageError(String),
    #[error("MuPDF error: {0}")]
    MuPdfError(String),
}

impl From<mupdf::Error> for PdfError {
    fn from(e: mupdf::Error) -> Self {
        PdfError::MuPdfError(e.to_string())
    }
}

/// Open PDF bytes as a MuPDF document
pub fn open_document(data: &[u8]) -> Result<Document, PdfError> {
    if data.is_empty() {
        return Err(PdfError::LoadError("empty document".to_string()));
    }
    Document::from_bytes(data, PDF_MIME).map_err(|e| PdfError::LoadError(e.to_string()))
}

/// Number of pages in an open document
pub fn page_count(doc: &Document) -> Result<usize, PdfError> {
    Ok(doc.page_count()?.max(0) as usize)
}
