//! Per-page text aggregation

use std::collections::{BTreeMap, BTreeSet};

use crate::envelope::{ExtractionResult, SCANNED_PDF_PROCESSED};

/// Collects recognized page text, keyed by page index
///
/// Output is always in ascending page order regardless of the order pages
/// are recorded in.
#[derive(Debug, Default)]
pub struct Aggregator {
    pages: BTreeMap<usize, String>,
    skipped: BTreeSet<usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, index: usize, text: String) {
        self.skipped.remove(&index);
        self.pages.insert(index, text);
    }

    pub fn skip_page(&mut self, index: usize) {
        if !self.pages.contains_key(&index) {
            self.skipped.insert(index);
        }
    }

    pub fn recorded(&self) -> usize {
        self.pages.len()
    }

    /// Concatenated text with a marker before each page
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|(index, text)| format!("\n--- Page {} ---\n{}\n", index, text))
            .collect()
    }

    pub fn finish(self, file_name: &str) -> ExtractionResult {
        let mut result =
            ExtractionResult::success(self.text(), file_name, SCANNED_PDF_PROCESSED);
        result.skipped_pages = self.skipped.into_iter().collect();
        result
    }
}
