//! Application state management

use std::sync::Arc;

use crate::artifact::ArtifactStore;
use crate::config::Config;
use crate::extract::{DocumentClassifier, MuPdfExtractor};
use crate::ocr::OcrService;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to prepare upload directory {path}: {source}")]
    UploadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    artifacts: ArtifactStore,
    classifier: DocumentClassifier,
    ocr: OcrService,
}

impl AppState {
    /// Create the application state from configuration
    ///
    /// Uses MuPDF for the text layer and the configured OCR providers.
    pub async fn new(config: Config) -> Result<Self, StateError> {
        let artifacts = ArtifactStore::open(&config.upload.dir)
            .await
            .map_err(|source| StateError::UploadDir {
                path: config.upload.dir.display().to_string(),
                source,
            })?;

        let classifier =
            DocumentClassifier::new(Arc::new(MuPdfExtractor), config.extract.min_text_chars);
        let ocr = OcrService::new(config.ocr.service_config());

        Ok(Self::from_parts(config, artifacts, classifier, ocr))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        config: Config,
        artifacts: ArtifactStore,
        classifier: DocumentClassifier,
        ocr: OcrService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                artifacts,
                classifier,
                ocr,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the artifact store
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.inner.artifacts
    }

    /// Get the document classifier
    pub fn classifier(&self) -> &DocumentClassifier {
        &self.inner.classifier
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}
