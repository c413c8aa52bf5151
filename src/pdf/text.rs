//! Embedded text layer extraction

use super::{open_document, page_count, PdfError};

/// Separator placed between the text of consecutive pages
const PAGE_SEPARATOR: &str = "\n\n";

/// Extract the plain text of every page, in page order
///
/// Pages without a text layer contribute an empty string, so a fully
/// scanned document yields only separators and whitespace.
pub fn extract_text(data: &[u8]) -> Result<String, PdfError> {
    let doc = open_document(data)?;
    let count = page_count(&doc)?;

    let mut pages = Vec::with_capacity(count);
    for index in 0..count {
        let page = doc.load_page(index as i32)?;
        pages.push(page.to_text()?);
    }

    Ok(pages.join(PAGE_SEPARATOR))
}
