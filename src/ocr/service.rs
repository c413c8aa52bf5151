//! OCR Service
//!
//! Orchestrates OCR providers: the first available provider that succeeds wins.

use std::sync::Arc;

use super::{
    provider::{OcrProviderTrait, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrProvider, OcrResult, ProgressFn},
};

/// OCR service configuration
#[derive(Debug, Clone)]
pub struct OcrServiceConfig {
    /// Preferred provider order
    pub providers: Vec<OcrProvider>,
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
    /// Default OCR language
    pub default_language: String,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            providers: vec![OcrProvider::Tesseract, OcrProvider::Ollama],
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            default_language: "eng".to_string(),
        }
    }
}

/// OCR service for recognizing uploaded images
pub struct OcrService {
    default_language: String,
    providers: Vec<Arc<dyn OcrProviderTrait>>,
}

impl OcrService {
    /// Create a new OCR service
    pub fn new(config: OcrServiceConfig) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|provider| -> Arc<dyn OcrProviderTrait> {
                match provider {
                    OcrProvider::Tesseract => Arc::new(TesseractProvider::new()),
                    OcrProvider::Ollama => Arc::new(OllamaProvider::new(
                        &config.ollama_url,
                        &config.ollama_model,
                    )),
                }
            })
            .collect();

        Self {
            default_language: config.default_language,
            providers,
        }
    }

    /// Create a service over an explicit provider list
    pub fn with_providers(
        providers: Vec<Arc<dyn OcrProviderTrait>>,
        default_language: &str,
    ) -> Self {
        Self {
            default_language: default_language.to_string(),
            providers,
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Get available providers
    pub async fn available_providers(&self) -> Vec<OcrProvider> {
        let mut available = Vec::new();
        for provider in &self.providers {
            if provider.is_available().await {
                available.push(provider.provider_type());
            }
        }
        available
    }

    /// Perform OCR on an image
    ///
    /// Providers are tried in configured order; a failing provider hands over
    /// to the next one. The last failure is returned if none succeeds.
    pub async fn recognize(
        &self,
        image_data: &[u8],
        language: Option<&str>,
        progress: &ProgressFn,
    ) -> Result<OcrResult, OcrError> {
        let lang = language.unwrap_or(&self.default_language);
        let mut last_error = None;

        for provider in &self.providers {
            if !provider.is_available().await {
                tracing::debug!("OCR provider {:?} unavailable, skipping", provider.provider_type());
                continue;
            }

            match provider.recognize(image_data, lang, progress).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        "OCR provider {:?} failed: {}, trying next",
                        provider.provider_type(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            OcrError::ProviderNotAvailable("No OCR providers available".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::provider::MockProvider;
    use std::sync::Mutex;

    #[test]
    fn test_ocr_service_creation() {
        let service = OcrService::new(OcrServiceConfig::default());
        assert_eq!(service.providers.len(), 2);
        assert_eq!(service.default_language(), "eng");
    }

    #[tokio::test]
    async fn test_no_providers_is_unavailable() {
        let service = OcrService::with_providers(Vec::new(), "eng");
        let result = service.recognize(b"img", None, &|_| {}).await;
        assert!(matches!(result, Err(OcrError::ProviderNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_falls_through_to_next_provider() {
        let service = OcrService::with_providers(
            vec![
                Arc::new(MockProvider::failing("engine crashed")),
                Arc::new(MockProvider {
                    response: Ok("second".to_string()),
                    available: true,
                    provider: OcrProvider::Ollama,
                }),
            ],
            "eng",
        );

        let result = service.recognize(b"img", None, &|_| {}).await.unwrap();
        assert_eq!(result.text, "second");
        assert_eq!(result.provider, OcrProvider::Ollama);
    }

    #[tokio::test]
    async fn test_skips_unavailable_and_reports_last_error() {
        let service = OcrService::with_providers(
            vec![
                Arc::new(MockProvider {
                    response: Ok("never".to_string()),
                    available: false,
                    provider: OcrProvider::Ollama,
                }),
                Arc::new(MockProvider::failing("engine crashed")),
            ],
            "eng",
        );

        let err = service.recognize(b"img", None, &|_| {}).await.unwrap_err();
        assert!(err.to_string().contains("engine crashed"));
    }

    #[tokio::test]
    async fn test_progress_is_forwarded() {
        let service =
            OcrService::with_providers(vec![Arc::new(MockProvider::text("hello"))], "eng");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        service
            .recognize(b"img", Some("deu"), &move |p| sink.lock().unwrap().push(p.percent()))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![100]);
    }
}
