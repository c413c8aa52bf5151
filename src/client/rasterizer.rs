//! Page rasterizer
//!
//! Turns a PDF into one JPEG per page, in page order. Rasterization is
//! all-or-nothing: a page that fails to render fails the document.

use thiserror::Error;

use crate::pdf::{self, PdfError};

/// Render scale relative to the page's natural size
pub const RENDER_SCALE: f32 = 2.0;

/// JPEG encoding quality
pub const JPEG_QUALITY: u8 = 95;

/// Rasterization errors
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Failed to open PDF: {0}")]
    Open(#[source] PdfError),

    #[error("Failed to render page {index}: {source}")]
    Page {
        index: usize,
        #[source]
        source: PdfError,
    },

    #[error("Rasterization task failed: {0}")]
    Task(String),
}

/// One rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page index
    pub index: usize,
    /// JPEG bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Converts PDF bytes into page images
///
/// Synchronous and CPU-bound; run it on a blocking thread.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, data: &[u8]) -> Result<Vec<PageImage>, RasterError>;
}

/// MuPDF-backed rasterizer
#[derive(Debug, Clone, Copy)]
pub struct MuPdfRasterizer {
    pub scale: f32,
    pub quality: u8,
}

impl Default for MuPdfRasterizer {
    fn default() -> Self {
        Self {
            scale: RENDER_SCALE,
            quality: JPEG_QUALITY,
        }
    }
}

impl PageRasterizer for MuPdfRasterizer {
    fn rasterize(&self, data: &[u8]) -> Result<Vec<PageImage>, RasterError> {
        let doc = pdf::open_document(data).map_err(RasterError::Open)?;
        let count = pdf::page_count(&doc).map_err(RasterError::Open)?;

        let mut pages = Vec::with_capacity(count);
        for page_index in 0..count {
            let index = page_index + 1;
            let rendered = pdf::render_page_jpeg(&doc, page_index, self.scale, self.quality)
                .map_err(|source| RasterError::Page { index, source })?;

            tracing::debug!(
                page = index,
                width = rendered.width,
                height = rendered.height,
                bytes = rendered.data.len(),
                "Rendered page"
            );

            pages.push(PageImage {
                index,
                data: rendered.data,
                width: rendered.width,
                height: rendered.height,
            });
        }

        Ok(pages)
    }
}
