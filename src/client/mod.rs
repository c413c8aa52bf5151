//! Client side of the extraction flow
//!
//! Submits a PDF to the upload endpoint and, when the server reports a
//! scanned document, rasterizes it locally and submits each page image
//! for OCR, aggregating the per-page text into one result.

mod aggregator;
mod pipeline;
mod rasterizer;
mod submitter;

use std::path::Path;

use thiserror::Error;

pub use aggregator::Aggregator;
pub use pipeline::{FallbackPipeline, PipelineEvent};
pub use rasterizer::{
    MuPdfRasterizer, PageImage, PageRasterizer, RasterError, JPEG_QUALITY, RENDER_SCALE,
};
pub use submitter::{HttpOcrClient, OcrEndpoint, Upload};

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Error connecting to server. Please make sure the backend is running.")]
    Connection(#[source] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to process scanned PDF. Please try a clearer document.")]
    ScannedConversion(#[source] RasterError),

    #[error("{0} is not a PDF file")]
    NotPdf(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bytes at the start of a file searched for the `%PDF` marker
const HEADER_WINDOW: usize = 1024;

const PDF_MAGIC: &[u8] = b"%PDF";

/// A PDF selected for extraction
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl PdfFile {
    /// Read a PDF from disk
    pub async fn open(path: &Path) -> Result<Self, ClientError> {
        let data = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        Self::from_bytes(name, data)
    }

    /// Wrap in-memory bytes, refusing anything without a PDF header
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self, ClientError> {
        let name = name.into();
        if !has_pdf_header(&data) {
            return Err(ClientError::NotPdf(name));
        }
        Ok(Self { name, data })
    }
}

/// Whether the `%PDF` marker starts within the first [`HEADER_WINDOW`] bytes
fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_WINDOW + PDF_MAGIC.len() - 1)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_header_after_preamble() {
        let mut data = b"\xEF\xBB\xBFjunk preamble\r\n".to_vec();
        data.extend_from_slice(b"%PDF-1.5\n");
        assert!(PdfFile::from_bytes("mailed.pdf", data).is_ok());
    }

    #[test]
    fn test_header_must_start_within_window() {
        let mut data = vec![b' '; HEADER_WINDOW - 1];
        data.extend_from_slice(b"%PDF-1.4");
        assert!(has_pdf_header(&data));

        let mut data = vec![b' '; HEADER_WINDOW];
        data.extend_from_slice(b"%PDF-1.4");
        assert!(!has_pdf_header(&data));
        assert!(matches!(
            PdfFile::from_bytes("late.pdf", data),
            Err(ClientError::NotPdf(_))
        ));
    }

    #[test]
    fn test_refuses_non_pdf() {
        let err = PdfFile::from_bytes("notes.txt", b"hello".to_vec()).unwrap_err();
        assert!(matches!(err, ClientError::NotPdf(name) if name == "notes.txt"));
    }

    #[test]
    fn test_accepts_pdf_header() {
        let file = PdfFile::from_bytes("doc.pdf", b"%PDF-1.7\n".to_vec()).unwrap();
        assert_eq!(file.name, "doc.pdf");
    }

    #[tokio::test]
    async fn test_open_uses_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = PdfFile::open(&path).await.unwrap();
        assert_eq!(file.name, "invoice.pdf");
        assert_eq!(file.data, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = PdfFile::open(Path::new("/nonexistent/missing.pdf")).await.unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
