//! Direct text extraction and scanned-document classification

mod classifier;
mod text_layer;

pub use classifier::{
    has_usable_text, ClassificationVerdict, DocumentClassifier, MIN_USABLE_TEXT_CHARS,
};
pub use text_layer::{ExtractError, MuPdfExtractor, TextLayerExtractor};

#[cfg(test)]
pub(crate) use text_layer::StaticExtractor;
