//! Page rasterization

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix};

use super::{page_count, PdfError};

/// A rendered page encoded as JPEG
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Render one page (0-indexed) to a JPEG at the given scale and quality
pub fn render_page_jpeg(
    doc: &Document,
    page_index: usize,
    scale: f32,
    quality: u8,
) -> Result<RenderedPage, PdfError> {
    let count = page_count(doc)?;
    if page_index >= count {
        return Err(PdfError::PageNotFound(page_index + 1, count));
    }

    let page = doc.load_page(page_index as i32)?;

    // Clamp scale to prevent runaway allocations (0.1 to 4.0)
    let scale = scale.clamp(0.1, 4.0);
    let matrix = Matrix::new_scale(scale, scale);

    // JPEG has no alpha channel, so render straight onto an opaque RGB pixmap
    let colorspace = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;

    encode_pixmap_jpeg(&pixmap, quality)
}

fn encode_pixmap_jpeg(pixmap: &mupdf::Pixmap, quality: u8) -> Result<RenderedPage, PdfError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize; // components per pixel

    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| PdfError::ImageError("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .map_err(|e| PdfError::ImageError(e.to_string()))?;

    Ok(RenderedPage {
        data: output,
        width,
        height,
    })
}
